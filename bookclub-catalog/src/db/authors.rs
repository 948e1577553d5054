//! Author database operations
//!
//! Authors are matched by exact, case-sensitive name. Spelling variants
//! ("J.R.R. Tolkien" vs "J. R. R. Tolkien") therefore produce separate rows;
//! no normalization is attempted.

use bookclub_common::db::Author;
use bookclub_common::Result;
use sqlx::SqliteConnection;
use uuid::Uuid;

/// Find the oldest author with exactly this name
pub async fn find_author_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<Author>> {
    let author = sqlx::query_as::<_, Author>(
        r#"
        SELECT id, name
        FROM authors
        WHERE name = ?
        ORDER BY created_at, rowid
        LIMIT 1
        "#,
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(author)
}

/// Insert a new author with a fresh identifier
pub async fn insert_author(conn: &mut SqliteConnection, name: &str) -> Result<Author> {
    let author = Author {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
    };

    sqlx::query("INSERT INTO authors (id, name, created_at) VALUES (?, ?, CURRENT_TIMESTAMP)")
        .bind(&author.id)
        .bind(&author.name)
        .execute(&mut *conn)
        .await?;

    Ok(author)
}

/// Get existing author or create new one
///
/// Returns (author, created)
pub async fn get_or_create_author(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<(Author, bool)> {
    if let Some(author) = find_author_by_name(conn, name).await? {
        tracing::debug!(author_id = %author.id, name, "Reusing existing author");
        return Ok((author, false));
    }

    let author = insert_author(conn, name).await?;
    tracing::debug!(author_id = %author.id, name, "Created new author");

    Ok((author, true))
}

/// Link book to author
///
/// `position` is the author's index in the provider's author list.
pub async fn link_book_to_author(
    conn: &mut SqliteConnection,
    isbn: &str,
    author_id: &str,
    position: i64,
) -> Result<()> {
    sqlx::query("INSERT INTO book_authors (isbn, author_id, position) VALUES (?, ?, ?)")
        .bind(isbn)
        .bind(author_id)
        .bind(position)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Authors of a book in provider order
pub async fn authors_for_book(conn: &mut SqliteConnection, isbn: &str) -> Result<Vec<Author>> {
    let authors = sqlx::query_as::<_, Author>(
        r#"
        SELECT a.id, a.name
        FROM book_authors ba
        JOIN authors a ON a.id = ba.author_id
        WHERE ba.isbn = ?
        ORDER BY ba.position, a.name
        "#,
    )
    .bind(isbn)
    .fetch_all(&mut *conn)
    .await?;

    Ok(authors)
}

pub async fn count_authors(conn: &mut SqliteConnection) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}
