//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// EduWealth - Turn wasteful spending into learning
#[derive(Parser)]
#[command(name = "eduwealth")]
#[command(about = "Student finance tracker with course recommendations", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "eduwealth.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set EDUWEALTH_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Run the course catalog ingest
    Crawl {
        /// Max courses to ingest
        #[arg(long, default_value = "50")]
        limit: usize,

        /// Polite delay between items, in seconds
        #[arg(long, default_value = "2.0")]
        delay: f64,
    },

    /// Show database status (encryption, counts)
    Status,

    /// Manage the course catalog
    Courses {
        #[command(subcommand)]
        action: Option<CoursesAction>,
    },
}

#[derive(Subcommand)]
pub enum CoursesAction {
    /// List catalog courses
    List {
        /// Max courses to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
}
