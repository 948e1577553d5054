//! Catalog reconciliation
//!
//! Makes local storage consistent with a resolved book: creates the book,
//! reuses or creates each author, and links them, all in one transaction.
//! Any failure rolls the whole transaction back and is reported as
//! [`Outcome::Rejected`]; storage faults never escape as errors.

use std::collections::HashSet;

use bookclub_common::Result;
use sqlx::{Pool, Sqlite};
use tokio::sync::Mutex;

use super::books_client::ResolvedBook;
use crate::db::{authors, books};

/// Result of [`CatalogReconciler::ensure_book`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created { isbn: String },
    /// Informational; nothing was written
    AlreadyExists { isbn: String },
    Rejected { reason: String },
}

/// Per-call statistics, logged on success
#[derive(Debug, Clone, Default)]
struct ReconcileStats {
    authors_created: usize,
    authors_reused: usize,
}

/// Catalog Reconciler
///
/// Holds the write lock for the whole transaction: the existence check and
/// the inserts are only atomic with respect to other `ensure_book` calls in
/// this process.
pub struct CatalogReconciler {
    db: Pool<Sqlite>,
    write_lock: Mutex<()>,
}

impl CatalogReconciler {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self {
            db,
            write_lock: Mutex::new(()),
        }
    }

    /// Insert the book if its ISBN is new
    ///
    /// **Algorithm:**
    /// 1. Reject a missing/blank ISBN or blank title
    /// 2. Begin transaction; if the ISBN exists, return `AlreadyExists`
    /// 3. Get or create each distinct author name, in input order
    /// 4. Insert the book, then one bridge row per author
    /// 5. Commit; on any error the transaction is rolled back
    pub async fn ensure_book(&self, resolved: &ResolvedBook) -> Outcome {
        let isbn = match resolved.isbn.as_deref().map(str::trim) {
            Some(isbn) if !isbn.is_empty() => isbn.to_string(),
            _ => {
                tracing::warn!(title = %resolved.title, "Rejected book without ISBN");
                return Outcome::Rejected {
                    reason: "book has no ISBN".to_string(),
                };
            }
        };

        if resolved.title.trim().is_empty() {
            tracing::warn!(isbn = %isbn, "Rejected book without title");
            return Outcome::Rejected {
                reason: format!("book {} has no title", isbn),
            };
        }

        let _guard = self.write_lock.lock().await;

        match self.reconcile(&isbn, resolved).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(isbn = %isbn, error = %e, "Reconciliation rolled back");
                Outcome::Rejected {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn reconcile(&self, isbn: &str, resolved: &ResolvedBook) -> Result<Outcome> {
        // Dropping the transaction on an early `?` return rolls it back
        let mut tx = self.db.begin().await?;

        if books::load_book(&mut tx, isbn).await?.is_some() {
            tx.rollback().await?;
            tracing::debug!(isbn, "Book already in catalog");
            return Ok(Outcome::AlreadyExists {
                isbn: isbn.to_string(),
            });
        }

        let mut stats = ReconcileStats::default();
        let mut author_ids = Vec::new();

        for name in distinct_names(&resolved.authors) {
            let (author, created) = authors::get_or_create_author(&mut tx, name).await?;
            if created {
                stats.authors_created += 1;
            } else {
                stats.authors_reused += 1;
            }
            author_ids.push(author.id);
        }

        books::insert_book(&mut tx, isbn, &resolved.title).await?;

        for (position, author_id) in author_ids.iter().enumerate() {
            authors::link_book_to_author(&mut tx, isbn, author_id, position as i64).await?;
        }

        tx.commit().await?;

        tracing::info!(
            isbn,
            title = %resolved.title,
            authors_created = stats.authors_created,
            authors_reused = stats.authors_reused,
            "Added book to catalog"
        );

        Ok(Outcome::Created {
            isbn: isbn.to_string(),
        })
    }
}

/// Non-blank names with exact duplicates removed, first occurrence kept
fn distinct_names(names: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(String::as_str)
        .filter(|name| !name.trim().is_empty())
        .filter(|name| seen.insert(*name))
        .collect()
}
