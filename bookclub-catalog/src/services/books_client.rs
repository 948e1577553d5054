//! Google Books metadata client
//!
//! Resolves a title or an ISBN into a canonical `(title, authors, isbn)`
//! record. Both lookups go through one query builder ([`BookQuery`]) and one
//! response parser, and every failure is folded into a [`Resolution`] so no
//! network fault escapes to the caller. There are no retries here; retry
//! policy belongs to whoever calls [`BooksClient::resolve`].

use bookclub_common::config::BooksApiConfig;
use bookclub_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("bookclub-catalog/", env!("CARGO_PKG_VERSION"));

/// Identifier types used by the volumes API
const ISBN_13: &str = "ISBN_13";
const ISBN_10: &str = "ISBN_10";

/// Books client errors
///
/// Internal to the client; callers only ever see the reason string inside
/// [`Resolution::TransientError`].
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Validated lookup request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookQuery {
    /// Exact-title search (provider semantics)
    Title(String),
    /// ISBN search; hyphens already stripped
    Isbn(String),
}

impl BookQuery {
    /// Title query; the title must be non-empty
    pub fn title(title: &str) -> Result<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::InvalidInput("title must not be empty".to_string()));
        }
        Ok(Self::Title(title.to_string()))
    }

    /// ISBN query; digits and hyphens, with an optional trailing `X` check digit
    pub fn isbn(isbn: &str) -> Result<Self> {
        let isbn = isbn.trim();
        let invalid = || Error::InvalidInput(format!("'{}' is not a valid ISBN", isbn));

        let (body, check) = match isbn.char_indices().last() {
            Some((idx, 'X' | 'x')) => (&isbn[..idx], Some('X')),
            Some(_) => (isbn, None),
            None => return Err(invalid()),
        };

        if !body.chars().all(|c| c.is_ascii_digit() || c == '-') {
            return Err(invalid());
        }

        let mut normalized: String = body.chars().filter(char::is_ascii_digit).collect();
        if normalized.is_empty() {
            return Err(invalid());
        }
        normalized.extend(check);

        Ok(Self::Isbn(normalized))
    }

    /// Value of the `q` parameter
    fn search_terms(&self) -> String {
        match self {
            Self::Title(title) => format!("intitle:{}", title),
            Self::Isbn(isbn) => format!("isbn:{}", isbn),
        }
    }

    /// ISBN to fall back on when the payload carries no identifiers
    fn fallback_isbn(&self) -> Option<String> {
        match self {
            Self::Title(_) => None,
            Self::Isbn(isbn) => Some(isbn.clone()),
        }
    }
}

/// Canonical record for one book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedBook {
    pub title: String,
    /// Author names in provider order; may be empty
    pub authors: Vec<String>,
    /// `None` when the provider supplied no ISBN; such a record cannot be
    /// stored
    pub isbn: Option<String>,
}

/// Result of a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(ResolvedBook),
    /// The provider returned zero matching items
    NotFound,
    /// The request could not complete; the caller may retry
    TransientError { reason: String },
}

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(rename = "totalItems", default)]
    total_items: u64,
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo", default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
struct VolumeInfo {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    #[serde(rename = "industryIdentifiers", default)]
    industry_identifiers: Vec<IndustryIdentifier>,
}

#[derive(Debug, Deserialize)]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    id_type: String,
    identifier: String,
}

/// Pick the ISBN to key the book by: first ISBN-13, else first ISBN-10
fn pick_isbn(identifiers: &[IndustryIdentifier]) -> Option<String> {
    let first_of = |kind: &str| {
        identifiers
            .iter()
            .find(|id| id.id_type == kind && !id.identifier.trim().is_empty())
            .map(|id| id.identifier.trim().to_string())
    };

    first_of(ISBN_13).or_else(|| first_of(ISBN_10))
}

/// Parse a volumes search payload; `Ok(None)` means no match
fn parse_volumes(
    body: &str,
    query: &BookQuery,
) -> std::result::Result<Option<ResolvedBook>, LookupError> {
    let response: VolumesResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Parse(e.to_string()))?;

    if response.total_items == 0 {
        return Ok(None);
    }

    // First-match policy: the provider's ranking is trusted
    let Some(volume) = response.items.into_iter().next() else {
        return Ok(None);
    };
    let info = volume.volume_info;

    let isbn = pick_isbn(&info.industry_identifiers).or_else(|| query.fallback_isbn());

    Ok(Some(ResolvedBook {
        title: info.title.unwrap_or_default(),
        authors: info.authors,
        isbn,
    }))
}

/// Google Books API client
pub struct BooksClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl BooksClient {
    /// Build a client from bootstrap settings
    pub fn new(settings: &BooksApiConfig) -> std::result::Result<Self, LookupError> {
        Self::with_base_url(
            &settings.base_url,
            Duration::from_secs(settings.timeout_secs),
            settings.api_key.clone(),
        )
    }

    pub fn with_base_url(
        base_url: &str,
        timeout: Duration,
        api_key: Option<String>,
    ) -> std::result::Result<Self, LookupError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.to_string(),
            api_key,
            timeout,
        })
    }

    /// Find a book by title
    pub async fn resolve_by_title(&self, title: &str) -> Result<Resolution> {
        let query = BookQuery::title(title)?;
        Ok(self.resolve(&query).await)
    }

    /// Find a book by ISBN
    pub async fn resolve_by_isbn(&self, isbn: &str) -> Result<Resolution> {
        let query = BookQuery::isbn(isbn)?;
        Ok(self.resolve(&query).await)
    }

    /// Run a validated query; never fails
    pub async fn resolve(&self, query: &BookQuery) -> Resolution {
        match self.fetch(query).await {
            Ok(Some(book)) => {
                tracing::info!(
                    query = %query.search_terms(),
                    title = %book.title,
                    isbn = ?book.isbn,
                    author_count = book.authors.len(),
                    "Resolved book metadata"
                );
                Resolution::Found(book)
            }
            Ok(None) => {
                tracing::debug!(query = %query.search_terms(), "No matching volume");
                Resolution::NotFound
            }
            Err(e) => {
                tracing::warn!(query = %query.search_terms(), error = %e, "Book lookup failed");
                Resolution::TransientError {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn fetch(
        &self,
        query: &BookQuery,
    ) -> std::result::Result<Option<ResolvedBook>, LookupError> {
        let mut params = vec![
            ("q", query.search_terms()),
            ("maxResults", "1".to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }

        tracing::debug!(url = %self.base_url, q = %params[0].1, "Querying volumes API");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LookupError::Api(status.as_u16(), error_text));
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;

        parse_volumes(&body, query)
    }

    fn classify(&self, e: reqwest::Error) -> LookupError {
        if e.is_timeout() {
            LookupError::Timeout(self.timeout)
        } else {
            LookupError::Network(e.to_string())
        }
    }
}
