//! Database initialization
//!
//! Opens (or creates) the SQLite catalog and makes sure the five book club
//! tables exist. Every pooled connection is opened with foreign-key
//! enforcement on, so rows violating referential integrity are rejected by
//! the store itself.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with the full schema.
///
/// The pool never recycles its one connection, since dropping it would
/// discard the database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_books_table(pool).await?;
    create_authors_table(pool).await?;

    // Linking tables
    create_book_authors_table(pool).await?;

    // Tables owned by the command layer, declared here so the catalog
    // cannot be corrupted underneath them
    create_reviews_table(pool).await?;
    create_meetings_table(pool).await?;

    Ok(())
}

async fn create_books_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS books (
            isbn TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL CHECK (length(trim(title)) > 0),
            score INTEGER,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_authors_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS authors (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Authors are matched by exact name during reconciliation
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_authors_name ON authors(name)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_book_authors_table(pool: &SqlitePool) -> Result<()> {
    // position keeps the provider's author order for display
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS book_authors (
            isbn TEXT NOT NULL REFERENCES books(isbn),
            author_id TEXT NOT NULL REFERENCES authors(id),
            position INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (isbn, author_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_book_authors_author ON book_authors(author_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_reviews_table(pool: &SqlitePool) -> Result<()> {
    // No ON DELETE action: a book with reviews cannot be deleted
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            isbn TEXT NOT NULL REFERENCES books(isbn),
            user_id TEXT NOT NULL,
            score INTEGER NOT NULL,
            review TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (isbn, user_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_meetings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meetings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            isbn TEXT REFERENCES books(isbn),
            datetime TEXT NOT NULL,
            notes TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_meetings_isbn ON meetings(isbn)")
        .execute(pool)
        .await?;

    Ok(())
}
