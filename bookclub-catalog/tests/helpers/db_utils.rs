//! Database Test Utilities

use anyhow::Result;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Create an on-disk catalog in a temporary directory
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_db() -> Result<(TempDir, SqlitePool)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("bookclub.db");

    let pool = bookclub_common::db::init_database(&db_path).await?;

    Ok((temp_dir, pool))
}

/// Row counts of the catalog tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCounts {
    pub books: i64,
    pub authors: i64,
    pub book_authors: i64,
    pub reviews: i64,
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    let query = format!("SELECT COUNT(*) FROM {}", table);
    sqlx::query_scalar(&query).fetch_one(pool).await.unwrap()
}

pub async fn row_counts(pool: &SqlitePool) -> RowCounts {
    RowCounts {
        books: count_rows(pool, "books").await,
        authors: count_rows(pool, "authors").await,
        book_authors: count_rows(pool, "book_authors").await,
        reviews: count_rows(pool, "reviews").await,
    }
}
