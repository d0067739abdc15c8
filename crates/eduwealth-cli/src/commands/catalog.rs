//! Catalog commands: ingest and listing

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use eduwealth_core::run_ingest;

use super::open_db;

pub fn cmd_crawl(db_path: &Path, limit: usize, delay_secs: f64, no_encrypt: bool) -> Result<()> {
    println!("🕷️  Starting catalog ingest (limit: {})...", limit);
    println!("⏱️  Request delay: {}s", delay_secs);

    let db = open_db(db_path, no_encrypt)?;
    let report = run_ingest(&db, limit, Duration::from_secs_f64(delay_secs))?;

    println!();
    println!(
        "✅ Ingest complete! Processed {} course(s): {} new, {} refreshed",
        report.processed(),
        report.inserted,
        report.updated
    );
    println!("   Catalog now holds {} course(s)", db.count_courses()?);

    Ok(())
}

pub fn cmd_courses_list(db_path: &Path, limit: i64, no_encrypt: bool) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;
    let courses = db.list_courses(limit)?;

    if courses.is_empty() {
        println!("No courses in the catalog. Run 'eduwealth crawl' to populate it.");
        return Ok(());
    }

    println!("📚 Catalog courses");
    println!("   ─────────────────────────────");
    for course in courses {
        let price = match (course.price, course.currency.as_deref()) {
            (Some(price), Some(currency)) => format!("{} {:.2}", currency, price),
            (Some(price), None) => format!("{:.2}", price),
            (None, _) => "free".to_string(),
        };
        let rating = course
            .rating
            .map(|r| format!("{:.1}★", r))
            .unwrap_or_else(|| "unrated".to_string());
        println!(
            "   [{}] {} ({}) - {} - {}",
            course.id, course.title, course.provider_name, price, rating
        );
    }

    Ok(())
}
