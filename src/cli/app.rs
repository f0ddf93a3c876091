use crate::config::ProfileName;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Database used when `--db` is not given
pub const DEFAULT_DATABASE: &str = "isbn-matcher.db";

/// isbn-matcher: fills missing ISBNs on textbook listings
#[derive(Parser)]
#[command(name = "isbn-matcher")]
#[command(version)]
#[command(about = "Fills missing ISBNs on textbook listings from a reference catalog")]
#[command(
    long_about = "isbn-matcher extracts series, grade, subject, term and year from free-text listing titles and resolves them against a book catalog through a cascade of progressively looser queries."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (RUST_LOG takes precedence when set)
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve and write ISBNs for every unresolved listing
    Fill {
        /// Database holding the listings table
        #[arg(long, default_value = DEFAULT_DATABASE)]
        db: PathBuf,

        /// Database holding the books table (defaults to --db)
        #[arg(long)]
        catalog_db: Option<PathBuf>,

        /// Resolve and count without writing
        #[arg(long)]
        dry_run: bool,

        /// Process at most this many listings
        #[arg(long)]
        limit: Option<usize>,

        /// Only process listings of this account
        #[arg(long)]
        account: Option<i64>,

        /// Matcher preset (overrides the configuration file)
        #[arg(long, value_enum)]
        profile: Option<ProfileName>,

        /// Writes per commit (overrides the configuration file)
        #[arg(long)]
        checkpoint: Option<usize>,

        /// Configuration file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Resolve a single title against the catalog
    Resolve {
        /// Listing title
        title: String,

        /// Database holding the books table
        #[arg(long, default_value = DEFAULT_DATABASE)]
        catalog_db: PathBuf,

        #[arg(long, value_enum)]
        profile: Option<ProfileName>,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show extracted attributes and the cascade for a title
    Extract {
        /// Listing title
        title: String,

        #[arg(long, value_enum)]
        profile: Option<ProfileName>,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Write a default configuration file
    Init {
        /// Destination (defaults to ./isbn-matcher.yaml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

impl Commands {
    /// Get the command name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Fill { .. } => "fill",
            Commands::Resolve { .. } => "resolve",
            Commands::Extract { .. } => "extract",
            Commands::Init { .. } => "init",
        }
    }
}
