//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration is deliberately small: where the database lives,
//! how to log, and how to reach the book metadata service. Missing or
//! unreadable TOML files never stop startup; compiled defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Primary environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "BOOKCLUB_ROOT_FOLDER";

/// Alternative environment variable naming the root folder
pub const ROOT_ENV: &str = "BOOKCLUB_ROOT";

/// SQLite database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "bookclub.db";

/// Google Books volumes search endpoint
pub const DEFAULT_BOOKS_API_URL: &str = "https://www.googleapis.com/books/v1/volumes";

/// Upper bound on a single metadata request
pub const DEFAULT_BOOKS_API_TIMEOUT_SECS: u64 = 10;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the database (optional, see [`RootFolderResolver`])
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Book metadata service settings
    #[serde(default)]
    pub books_api: BooksApiConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Book metadata service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooksApiConfig {
    /// Volumes search endpoint
    #[serde(default = "default_books_api_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_books_api_timeout_secs")]
    pub timeout_secs: u64,

    /// API key (optional; the public endpoint accepts anonymous requests)
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for BooksApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_books_api_url(),
            timeout_secs: default_books_api_timeout_secs(),
            api_key: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_books_api_url() -> String {
    DEFAULT_BOOKS_API_URL.to_string()
}

fn default_books_api_timeout_secs() -> u64 {
    DEFAULT_BOOKS_API_TIMEOUT_SECS
}

/// Compiled-in fallbacks used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        // ~/.local/share/bookclub, ~/Library/Application Support/bookclub, %LOCALAPPDATA%\bookclub
        let root_folder = dirs::data_local_dir()
            .map(|d| d.join("bookclub"))
            .unwrap_or_else(|| PathBuf::from("./bookclub_data"));

        Self {
            root_folder,
            log_level: default_log_level(),
        }
    }
}

/// Root folder resolution.
///
/// Priority order:
/// 1. Command-line argument
/// 2. `BOOKCLUB_ROOT_FOLDER`, then `BOOKCLUB_ROOT`
/// 3. `root_folder` in the module's TOML file
/// 4. OS-dependent compiled default
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    config_file: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            config_file: None,
        }
    }

    /// Set the command-line override (highest priority)
    pub fn with_cli_arg(mut self, cli_arg: Option<PathBuf>) -> Self {
        self.cli_arg = cli_arg;
        self
    }

    /// Read `root_folder` from this file instead of the module default
    pub fn with_config_file(mut self, config_file: Option<PathBuf>) -> Self {
        self.config_file = config_file;
        self
    }

    /// Resolve the root folder; never fails
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        for var in [ROOT_FOLDER_ENV, ROOT_ENV] {
            if let Ok(path) = std::env::var(var) {
                if !path.trim().is_empty() {
                    return PathBuf::from(path);
                }
            }
        }

        if let Some(path) = self.config_file_path() {
            if path.exists() {
                match load_toml_config(&path) {
                    Ok(config) => {
                        if let Some(root_folder) = config.root_folder {
                            return root_folder;
                        }
                    }
                    Err(e) => warn!("Ignoring unreadable config {}: {}", path.display(), e),
                }
            }
        }

        CompiledDefaults::for_current_platform().root_folder
    }

    /// Explicit config file, else `~/.config/bookclub/<module>.toml` (or
    /// the platform equivalent)
    pub fn config_file_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_file {
            return Some(path.clone());
        }

        dirs::config_dir().map(|d| {
            d.join("bookclub")
                .join(format!("{}.toml", self.module_name))
        })
    }
}

/// Creates the root folder and locates the database inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the root folder (and parents); idempotent
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(DATABASE_FILE_NAME)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}

/// Load and parse a TOML bootstrap file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load a TOML bootstrap file, falling back to defaults when it is missing
/// or malformed
pub fn load_toml_config_or_default(path: Option<&Path>) -> TomlConfig {
    let Some(path) = path else {
        return TomlConfig::default();
    };

    if !path.exists() {
        debug!("No config file at {}, using defaults", path.display());
        return TomlConfig::default();
    }

    match load_toml_config(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{}; using defaults", e);
            TomlConfig::default()
        }
    }
}
