//! Test Helper Utilities
//!
//! Shared utilities for testing bookclub-catalog

#![allow(dead_code)]

pub mod db_utils;
pub mod stub_books_api;

// Re-export commonly used items
pub use db_utils::{count_rows, create_test_db, row_counts, RowCounts};
pub use stub_books_api::{east_of_eden, volume, StubBooksApi, StubReply};
