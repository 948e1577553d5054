//! # Book Club Common Library
//!
//! Shared code for the book club catalog including:
//! - Error type
//! - Configuration loading and root folder resolution
//! - Database initialization and row models

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
