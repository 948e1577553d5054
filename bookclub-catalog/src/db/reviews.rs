//! Review database operations

use bookclub_common::db::Review;
use bookclub_common::Result;
use sqlx::SqliteConnection;

/// Save review; a member re-rating a book replaces their previous review
pub async fn save_review(conn: &mut SqliteConnection, review: &Review) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reviews (isbn, user_id, score, review, updated_at)
        VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(isbn, user_id) DO UPDATE SET
            score = excluded.score,
            review = excluded.review,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(&review.isbn)
    .bind(&review.user_id)
    .bind(review.score)
    .bind(&review.review)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Reviews of a book, best first
pub async fn load_reviews_for_book(conn: &mut SqliteConnection, isbn: &str) -> Result<Vec<Review>> {
    let reviews = sqlx::query_as::<_, Review>(
        r#"
        SELECT isbn, user_id, score, review
        FROM reviews
        WHERE isbn = ?
        ORDER BY score DESC, user_id
        "#,
    )
    .bind(isbn)
    .fetch_all(&mut *conn)
    .await?;

    Ok(reviews)
}
