//! EduWealth CLI - Student finance tracker with course recommendations
//!
//! Usage:
//!   eduwealth init               Initialize database
//!   eduwealth crawl --limit 50   Populate the course catalog
//!   eduwealth serve --port 3000  Start web server
//!   eduwealth status             Show database status

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            static_dir,
        } => {
            commands::cmd_serve(&cli.db, &host, port, cli.no_encrypt, static_dir.as_deref()).await
        }
        Commands::Crawl { limit, delay } => {
            commands::cmd_crawl(&cli.db, limit, delay, cli.no_encrypt)
        }
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
        Commands::Courses { action } => match action {
            None | Some(CoursesAction::List { limit: 20 }) => {
                commands::cmd_courses_list(&cli.db, 20, cli.no_encrypt)
            }
            Some(CoursesAction::List { limit }) => {
                commands::cmd_courses_list(&cli.db, limit, cli.no_encrypt)
            }
        },
    }
}
