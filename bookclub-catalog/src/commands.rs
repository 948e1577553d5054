//! Book club commands
//!
//! [`BookClub`] is the process-wide context: it owns the database pool, the
//! metadata client and the reconciler, and turns each [`Command`] into the
//! reply text shown to the member who issued it.

use bookclub_common::db::{Book, Review};
use bookclub_common::{Error, Result};
use sqlx::SqlitePool;

use crate::db::{authors, books, reviews, BookSort};
use crate::services::{BookQuery, BooksClient, CatalogReconciler, Outcome, Resolution};

/// A member's request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Find a book remotely and add it to the catalog; ISBN preferred
    AddBook {
        isbn: Option<String>,
        title: Option<String>,
    },
    /// Find a book remotely without storing it
    Lookup {
        isbn: Option<String>,
        title: Option<String>,
    },
    /// Rate a catalogued book for the issuing member
    RateBook {
        title: String,
        score: i64,
        review: Option<String>,
    },
    ListBooks {
        sort: BookSort,
    },
}

pub struct BookClub {
    db: SqlitePool,
    resolver: BooksClient,
    reconciler: CatalogReconciler,
}

impl BookClub {
    pub fn new(db: SqlitePool, resolver: BooksClient) -> Self {
        let reconciler = CatalogReconciler::new(db.clone());
        Self {
            db,
            resolver,
            reconciler,
        }
    }

    /// Run a command on behalf of `user_id`
    ///
    /// Invalid input becomes a reply; only storage faults outside the
    /// reconciler are returned as errors.
    pub async fn execute(&self, user_id: &str, command: Command) -> Result<String> {
        tracing::debug!(user_id, ?command, "Executing command");

        let reply = match command {
            Command::AddBook { isbn, title } => {
                self.add_book(isbn.as_deref(), title.as_deref()).await
            }
            Command::Lookup { isbn, title } => self.lookup(isbn.as_deref(), title.as_deref()).await,
            Command::RateBook {
                title,
                score,
                review,
            } => self.rate_book(user_id, &title, score, review).await,
            Command::ListBooks { sort } => self.list_books(sort).await,
        };

        match reply {
            Err(Error::InvalidInput(message)) => Ok(message),
            other => other,
        }
    }

    async fn add_book(&self, isbn: Option<&str>, title: Option<&str>) -> Result<String> {
        let query = select_query(isbn, title)?;

        // Skip the remote call when the ISBN is already catalogued
        if let BookQuery::Isbn(isbn) = &query {
            let mut conn = self.db.acquire().await?;
            if let Some(book) = books::load_book(&mut conn, isbn).await? {
                return Ok(already_exists_reply(&book.title));
            }
        }

        let resolved = match self.resolver.resolve(&query).await {
            Resolution::Found(resolved) => resolved,
            Resolution::NotFound => return Ok(not_found_reply(&query)),
            Resolution::TransientError { reason } => return Ok(transient_reply(&reason)),
        };

        let reply = match self.reconciler.ensure_book(&resolved).await {
            Outcome::Created { .. } => format!("Added book {}", resolved.title),
            Outcome::AlreadyExists { .. } => already_exists_reply(&resolved.title),
            Outcome::Rejected { reason } => {
                format!("Could not add book {}: {}", resolved.title, reason)
            }
        };

        Ok(reply)
    }

    async fn lookup(&self, isbn: Option<&str>, title: Option<&str>) -> Result<String> {
        let query = select_query(isbn, title)?;

        let reply = match self.resolver.resolve(&query).await {
            Resolution::Found(resolved) => format!(
                "{} by {} (ISBN {})",
                resolved.title,
                author_list(&resolved.authors),
                resolved.isbn.as_deref().unwrap_or("unknown")
            ),
            Resolution::NotFound => not_found_reply(&query),
            Resolution::TransientError { reason } => transient_reply(&reason),
        };

        Ok(reply)
    }

    async fn rate_book(
        &self,
        user_id: &str,
        title: &str,
        score: i64,
        review: Option<String>,
    ) -> Result<String> {
        let query = BookQuery::title(title)?;

        let local = {
            let mut conn = self.db.acquire().await?;
            books::find_book_by_title(&mut conn, title.trim()).await?
        };

        // Not catalogued under this title: the provider may know it under a
        // catalogued ISBN
        let book = match local {
            Some(book) => book,
            None => match self.resolver.resolve(&query).await {
                Resolution::Found(resolved) => match self.catalogued(resolved.isbn.as_deref()).await? {
                    Some(book) => book,
                    None => return Ok(not_found_reply(&query)),
                },
                Resolution::NotFound => return Ok(not_found_reply(&query)),
                Resolution::TransientError { reason } => return Ok(transient_reply(&reason)),
            },
        };

        let review = Review {
            isbn: book.isbn.clone(),
            user_id: user_id.to_string(),
            score,
            review: review.filter(|text| !text.trim().is_empty()),
        };

        let mut tx = self.db.begin().await?;
        reviews::save_review(&mut tx, &review).await?;
        let book_score = books::refresh_book_score(&mut tx, &book.isbn).await?;
        tx.commit().await?;

        tracing::info!(isbn = %book.isbn, user_id, score, book_score = ?book_score, "Review saved");

        Ok(format!(
            "Review added! {} is now rated {}",
            book.title,
            book_score.map_or_else(|| "unrated".to_string(), |s| s.to_string())
        ))
    }

    async fn catalogued(&self, isbn: Option<&str>) -> Result<Option<Book>> {
        let Some(isbn) = isbn else {
            return Ok(None);
        };
        let mut conn = self.db.acquire().await?;
        books::load_book(&mut conn, isbn).await
    }

    async fn list_books(&self, sort: BookSort) -> Result<String> {
        let mut conn = self.db.acquire().await?;
        let catalog = books::list_books(&mut conn, sort).await?;

        if catalog.is_empty() {
            return Ok("No books in the catalog yet".to_string());
        }

        let mut lines = Vec::with_capacity(catalog.len());
        for (idx, book) in catalog.iter().enumerate() {
            let names: Vec<String> = authors::authors_for_book(&mut conn, &book.isbn)
                .await?
                .into_iter()
                .map(|a| a.name)
                .collect();

            let score = book
                .score
                .map_or_else(|| "unrated".to_string(), |s| format!("score {}", s));

            lines.push(format!(
                "{}. {} by {} [{}]",
                idx + 1,
                book.title,
                author_list(&names),
                score
            ));
        }

        Ok(lines.join("\n"))
    }
}

/// ISBN wins when both are supplied
fn select_query(isbn: Option<&str>, title: Option<&str>) -> Result<BookQuery> {
    match (isbn, title) {
        (Some(isbn), _) => BookQuery::isbn(isbn),
        (None, Some(title)) => BookQuery::title(title),
        (None, None) => Err(Error::InvalidInput("Must supply isbn or title".to_string())),
    }
}

fn author_list(names: &[String]) -> String {
    if names.is_empty() {
        "unknown author".to_string()
    } else {
        names.join(", ")
    }
}

fn already_exists_reply(title: &str) -> String {
    format!("Book {} already exists in database", title)
}

fn not_found_reply(query: &BookQuery) -> String {
    match query {
        BookQuery::Title(title) => format!("Book {} not found!", title),
        BookQuery::Isbn(isbn) => format!("Book with ISBN {} not found!", isbn),
    }
}

fn transient_reply(reason: &str) -> String {
    format!("Book service unavailable, try again later ({})", reason)
}
