//! bookclub-catalog - book club catalog command line
//!
//! Constructs the database pool and the metadata client once at startup,
//! runs a single command on behalf of a member and prints the reply.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bookclub_catalog::db::BookSort;
use bookclub_catalog::{BookClub, BooksClient, Command};
use bookclub_common::config::{
    load_toml_config_or_default, LoggingConfig, RootFolderInitializer, RootFolderResolver,
};

const MODULE_NAME: &str = "bookclub-catalog";

/// Command-line arguments for bookclub-catalog
#[derive(Parser, Debug)]
#[command(name = "bookclub-catalog")]
#[command(about = "Book club catalog: add, rate and list books")]
#[command(version)]
struct Args {
    /// Folder holding bookclub.db (else BOOKCLUB_ROOT_FOLDER, TOML, OS default)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// TOML bootstrap file
    #[arg(short, long, env = "BOOKCLUB_CONFIG")]
    config: Option<PathBuf>,

    /// Member issuing the command
    #[arg(short, long, env = "BOOKCLUB_USER", default_value = "local")]
    user: String,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Find a book by ISBN or title and add it to the catalog
    AddBook {
        #[arg(long)]
        isbn: Option<String>,
        #[arg(long)]
        title: Option<String>,
    },
    /// Show what the metadata service returns, without storing it
    Lookup {
        #[arg(long)]
        isbn: Option<String>,
        #[arg(long)]
        title: Option<String>,
    },
    /// Rate a catalogued book
    RateBook {
        title: String,
        #[arg(allow_negative_numbers = true)]
        score: i64,
        review: Option<String>,
    },
    /// List catalogued books
    ListBooks {
        /// score, time, or anything else for alphabetical
        #[arg(long, default_value = "title")]
        sort: String,
    },
}

impl From<CliCommand> for Command {
    fn from(command: CliCommand) -> Self {
        match command {
            CliCommand::AddBook { isbn, title } => Command::AddBook { isbn, title },
            CliCommand::Lookup { isbn, title } => Command::Lookup { isbn, title },
            CliCommand::RateBook {
                title,
                score,
                review,
            } => Command::RateBook {
                title,
                score,
                review,
            },
            CliCommand::ListBooks { sort } => Command::ListBooks {
                sort: BookSort::from_arg(&sort),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = RootFolderResolver::new(MODULE_NAME)
        .with_cli_arg(args.root_folder.clone())
        .with_config_file(args.config.clone());
    let toml_config = load_toml_config_or_default(resolver.config_file_path().as_deref());

    init_tracing(&toml_config.logging)?;

    info!(
        "Starting bookclub-catalog {} ({}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_PROFILE")
    );

    // Step 1: Resolve root folder and make sure it exists
    let initializer = RootFolderInitializer::new(resolver.resolve());
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    // Step 2: Open or create the catalog
    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = bookclub_common::db::init_database(&db_path)
        .await
        .context("Failed to open database")?;

    // Step 3: Metadata client
    let settings = bookclub_catalog::config::books_api_settings(&toml_config);
    let books_client = BooksClient::new(&settings).context("Failed to create books client")?;
    info!("Books API: {}", settings.base_url);

    let club = BookClub::new(db_pool.clone(), books_client);
    let reply = club.execute(&args.user, args.command.into()).await;

    db_pool.close().await;

    println!("{}", reply?);

    Ok(())
}

/// Install the global subscriber: `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let (file_layer, stderr_layer) = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        None => {
            let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            (None, Some(layer))
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}
