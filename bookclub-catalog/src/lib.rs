//! bookclub-catalog library interface
//!
//! Resolves books against the Google Books API and reconciles them into the
//! local SQLite catalog.

pub mod commands;
pub mod config;
pub mod db;
pub mod services;

pub use crate::commands::{BookClub, Command};
pub use crate::services::{
    BookQuery, BooksClient, CatalogReconciler, Outcome, Resolution, ResolvedBook,
};
