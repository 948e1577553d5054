//! Catalog queries
//!
//! Every function takes a plain `SqliteConnection` so the same query runs
//! against a pooled connection or inside a transaction.

pub mod authors;
pub mod books;
pub mod reviews;

pub use books::BookSort;
