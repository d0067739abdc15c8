//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - `cmd_status` - Show database status

use std::path::Path;

use anyhow::{Context, Result};
use eduwealth_core::db::Database;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path.to_str().unwrap();
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let _db = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Populate the course catalog: eduwealth crawl");
    println!("  2. Start the API server: eduwealth serve");

    Ok(())
}

pub fn cmd_status(db_path: &Path, no_encrypt: bool) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;

    println!("📊 EduWealth Status");
    println!("   ─────────────────────────────");
    println!("   Database: {}", db.path());
    println!(
        "   Encryption: {}",
        if db.is_encrypted()? {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!("   Users: {}", db.count_users()?);
    println!("   Catalog courses: {}", db.count_courses()?);

    let purged = db.purge_expired_tokens()?;
    if purged > 0 {
        println!("   Purged {} expired refresh token(s)", purged);
    }

    Ok(())
}
