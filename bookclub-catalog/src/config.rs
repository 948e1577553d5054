//! Configuration resolution for bookclub-catalog
//!
//! Provides two-tier API key resolution with ENV → TOML priority and
//! assembles the metadata client settings.

use bookclub_common::config::{BooksApiConfig, TomlConfig};
use tracing::{info, warn};

/// Environment variable carrying the Google Books API key
pub const BOOKS_API_KEY_ENV: &str = "BOOKCLUB_BOOKS_API_KEY";

/// Resolve the Google Books API key
///
/// **Priority:** ENV → TOML. The key is optional: anonymous requests are
/// accepted by the public endpoint, at a lower quota.
pub fn resolve_books_api_key(toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(BOOKS_API_KEY_ENV)
        .ok()
        .filter(|key| is_valid_key(key));
    let toml_key = toml_config
        .books_api
        .api_key
        .clone()
        .filter(|key| is_valid_key(key));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "Books API key found in both environment and TOML. Using environment (highest priority)."
        );
    }

    if let Some(key) = env_key {
        info!("Books API key loaded from environment variable");
        return Some(key.trim().to_string());
    }

    if let Some(key) = toml_key {
        info!("Books API key loaded from TOML config");
        return Some(key.trim().to_string());
    }

    info!("No books API key configured, using anonymous requests");
    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Metadata client settings with the API key resolved
pub fn books_api_settings(toml_config: &TomlConfig) -> BooksApiConfig {
    BooksApiConfig {
        api_key: resolve_books_api_key(toml_config),
        ..toml_config.books_api.clone()
    }
}
