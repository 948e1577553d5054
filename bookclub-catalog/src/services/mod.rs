//! Catalog services
//!
//! - `books_client`: resolves a title or ISBN against the book metadata API
//! - `catalog_reconciler`: writes a resolved book into the local catalog

pub mod books_client;
pub mod catalog_reconciler;

pub use books_client::{BookQuery, BooksClient, LookupError, Resolution, ResolvedBook};
pub use catalog_reconciler::{CatalogReconciler, Outcome};
