//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Book keyed by ISBN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    /// Aggregate rating (rounded mean of review scores)
    pub score: Option<i64>,
}

/// Author; `id` is a locally assigned UUID string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Author {
    pub id: String,
    pub name: String,
}

/// Book ↔ author bridge row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BookAuthor {
    pub isbn: String,
    pub author_id: String,
}

/// One member's review of a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub isbn: String,
    pub user_id: String,
    pub score: i64,
    pub review: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Meeting {
    pub id: i64,
    pub isbn: Option<String>,
    pub datetime: DateTime<Utc>,
    pub notes: Option<String>,
}
