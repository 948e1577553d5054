//! Unit tests for database initialization and schema constraints
//!
//! Exercises the tables directly with SQL, the way the command layer and
//! reconciler rely on them.

use bookclub_common::db::{init_database, init_memory_database, BookAuthor, Meeting};
use chrono::{TimeZone, Utc};
use sqlx::SqlitePool;
use tempfile::TempDir;

async fn insert_book(pool: &SqlitePool, isbn: &str, title: &str) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO books (isbn, title) VALUES (?, ?)")
        .bind(isbn)
        .bind(title)
        .execute(pool)
        .await
        .map(|_| ())
}

async fn insert_author(pool: &SqlitePool, id: &str, name: &str) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO authors (id, name) VALUES (?, ?)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await
        .map(|_| ())
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("data").join("bookclub.db");

    let pool = init_database(&db_path).await.unwrap();

    assert!(db_path.exists(), "Database file was not created");
    pool.close().await;
}

#[tokio::test]
async fn test_database_opens_existing_and_keeps_rows() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("bookclub.db");

    let pool = init_database(&db_path).await.unwrap();
    insert_book(&pool, "9780670033041", "East of Eden").await.unwrap();
    pool.close().await;

    let pool = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_books_reject_duplicate_isbn_and_blank_title() {
    let pool = init_memory_database().await.unwrap();

    insert_book(&pool, "9780670033041", "East of Eden").await.unwrap();

    assert!(insert_book(&pool, "9780670033041", "East of Eden").await.is_err());
    assert!(insert_book(&pool, "9780140177398", "   ").await.is_err());
}

#[tokio::test]
async fn test_bridge_requires_existing_book_and_author() {
    let pool = init_memory_database().await.unwrap();
    insert_book(&pool, "9780670033041", "East of Eden").await.unwrap();
    insert_author(&pool, "a-1", "John Steinbeck").await.unwrap();

    let link = |isbn: &'static str, author_id: &'static str| {
        let pool = pool.clone();
        async move {
            sqlx::query("INSERT INTO book_authors (isbn, author_id) VALUES (?, ?)")
                .bind(isbn)
                .bind(author_id)
                .execute(&pool)
                .await
        }
    };

    assert!(link("0000000000", "a-1").await.is_err());
    assert!(link("9780670033041", "missing").await.is_err());
    link("9780670033041", "a-1").await.unwrap();
    assert!(link("9780670033041", "a-1").await.is_err(), "duplicate link");

    let rows: Vec<BookAuthor> = sqlx::query_as("SELECT isbn, author_id FROM book_authors")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(
        rows,
        vec![BookAuthor {
            isbn: "9780670033041".to_string(),
            author_id: "a-1".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_books_with_dependents_cannot_be_deleted() {
    let pool = init_memory_database().await.unwrap();
    insert_book(&pool, "9780670033041", "East of Eden").await.unwrap();
    sqlx::query("INSERT INTO reviews (isbn, user_id, score) VALUES (?, ?, ?)")
        .bind("9780670033041")
        .bind("alice")
        .bind(90_i64)
        .execute(&pool)
        .await
        .unwrap();

    let deleted = sqlx::query("DELETE FROM books WHERE isbn = ?")
        .bind("9780670033041")
        .execute(&pool)
        .await;

    assert!(deleted.is_err());
}

#[tokio::test]
async fn test_reviews_are_unique_per_member() {
    let pool = init_memory_database().await.unwrap();
    insert_book(&pool, "9780670033041", "East of Eden").await.unwrap();

    let review = |user: &'static str| {
        let pool = pool.clone();
        async move {
            sqlx::query("INSERT INTO reviews (isbn, user_id, score) VALUES ('9780670033041', ?, 80)")
                .bind(user)
                .execute(&pool)
                .await
        }
    };

    review("alice").await.unwrap();
    review("bob").await.unwrap();
    assert!(review("alice").await.is_err());
}

#[tokio::test]
async fn test_meetings_autoincrement_and_optional_book() {
    let pool = init_memory_database().await.unwrap();
    insert_book(&pool, "9780670033041", "East of Eden").await.unwrap();

    let first = Utc.with_ymd_and_hms(2024, 3, 1, 19, 0, 0).unwrap();
    let second = Utc.with_ymd_and_hms(2024, 4, 5, 19, 0, 0).unwrap();

    sqlx::query("INSERT INTO meetings (isbn, datetime, notes) VALUES (?, ?, ?)")
        .bind("9780670033041")
        .bind(first)
        .bind("Chapters 1-20")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO meetings (datetime) VALUES (?)")
        .bind(second)
        .execute(&pool)
        .await
        .unwrap();

    let bad = sqlx::query("INSERT INTO meetings (isbn, datetime) VALUES ('0000000000', ?)")
        .bind(second)
        .execute(&pool)
        .await;
    assert!(bad.is_err(), "meeting must reference a catalogued book");

    let meetings: Vec<Meeting> =
        sqlx::query_as("SELECT id, isbn, datetime, notes FROM meetings ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();

    assert_eq!(meetings.len(), 2);
    assert_eq!(meetings[0].id, 1);
    assert_eq!(meetings[1].id, 2);
    assert_eq!(meetings[0].isbn.as_deref(), Some("9780670033041"));
    assert_eq!(meetings[0].datetime, first);
    assert_eq!(meetings[0].notes.as_deref(), Some("Chapters 1-20"));
    assert_eq!(meetings[1].isbn, None);
}
