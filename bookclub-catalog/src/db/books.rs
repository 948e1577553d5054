//! Book database operations

use bookclub_common::db::Book;
use bookclub_common::Result;
use sqlx::SqliteConnection;

/// Ordering for book listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookSort {
    /// Highest score first, unrated last
    Score,
    /// Most recently discussed first, never discussed last
    Time,
    /// Alphabetical by title
    #[default]
    Title,
}

impl BookSort {
    /// Parse a user-supplied sort key; unknown keys sort alphabetically
    pub fn from_arg(arg: &str) -> Self {
        match arg.trim().to_ascii_lowercase().as_str() {
            "score" => Self::Score,
            "time" => Self::Time,
            _ => Self::Title,
        }
    }

    fn order_by(self) -> &'static str {
        match self {
            Self::Score => "b.score IS NULL, b.score DESC, b.title",
            Self::Time => "m.last_met IS NULL, m.last_met DESC, b.title",
            Self::Title => "b.title, b.isbn",
        }
    }
}

/// Load book by ISBN
pub async fn load_book(conn: &mut SqliteConnection, isbn: &str) -> Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>("SELECT isbn, title, score FROM books WHERE isbn = ?")
        .bind(isbn)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(book)
}

/// Find the oldest book with exactly this title
pub async fn find_book_by_title(conn: &mut SqliteConnection, title: &str) -> Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>(
        r#"
        SELECT isbn, title, score
        FROM books
        WHERE title = ?
        ORDER BY created_at, rowid
        LIMIT 1
        "#,
    )
    .bind(title)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(book)
}

/// Insert a new book
///
/// Plain INSERT: fails with a constraint violation if the ISBN exists.
pub async fn insert_book(conn: &mut SqliteConnection, isbn: &str, title: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO books (isbn, title, score, created_at)
        VALUES (?, ?, NULL, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(isbn)
    .bind(title)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Recompute a book's score as the rounded mean of its review scores
///
/// Returns the new score (`None` when the book has no reviews).
pub async fn refresh_book_score(conn: &mut SqliteConnection, isbn: &str) -> Result<Option<i64>> {
    sqlx::query(
        r#"
        UPDATE books
        SET score = (
            SELECT CAST(ROUND(AVG(score)) AS INTEGER) FROM reviews WHERE reviews.isbn = books.isbn
        )
        WHERE isbn = ?
        "#,
    )
    .bind(isbn)
    .execute(&mut *conn)
    .await?;

    let score = sqlx::query_scalar::<_, Option<i64>>("SELECT score FROM books WHERE isbn = ?")
        .bind(isbn)
        .fetch_optional(&mut *conn)
        .await?
        .flatten();

    Ok(score)
}

pub async fn count_books(conn: &mut SqliteConnection) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

/// List all books in the requested order
pub async fn list_books(conn: &mut SqliteConnection, sort: BookSort) -> Result<Vec<Book>> {
    let sql = format!(
        r#"
        SELECT b.isbn, b.title, b.score
        FROM books b
        LEFT JOIN (
            SELECT isbn, MAX(datetime) AS last_met
            FROM meetings
            WHERE isbn IS NOT NULL
            GROUP BY isbn
        ) m ON m.isbn = b.isbn
        ORDER BY {}
        "#,
        sort.order_by()
    );

    let books = sqlx::query_as::<_, Book>(&sql)
        .fetch_all(&mut *conn)
        .await?;

    Ok(books)
}
