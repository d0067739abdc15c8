//! Course catalog ingest
//!
//! Feeds the catalog from a fixed sample set (a stand-in for a real crawl
//! engine) with a polite delay between items. Each course is keyed by
//! `source_hash` = sha256(provider_slug + "_" + url), so re-running the
//! ingest refreshes existing rows instead of duplicating them.

use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::db::Database;
use crate::error::Result;
use crate::models::{CourseUpsertResult, NewCourse};

/// Deduplication hash for a course: sha256 over provider + URL
pub fn source_hash(provider_slug: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}_{}", provider_slug, url).as_bytes());
    hex::encode(hasher.finalize())
}

/// Summary of an ingest run
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub inserted: usize,
    pub updated: usize,
}

impl IngestReport {
    pub fn processed(&self) -> usize {
        self.inserted + self.updated
    }
}

fn feed_course(
    title: &str,
    provider_name: &str,
    provider_slug: &str,
    url: &str,
    price: Option<f64>,
    currency: Option<&str>,
    rating: f64,
    duration: &str,
    categories: &[&str],
    description: &str,
) -> NewCourse {
    NewCourse {
        title: title.to_string(),
        provider_name: provider_name.to_string(),
        provider_slug: provider_slug.to_string(),
        url: url.to_string(),
        price,
        currency: currency.map(|c| c.to_string()),
        rating: Some(rating),
        duration: Some(duration.to_string()),
        categories: Some(categories.iter().map(|c| c.to_string()).collect()),
        thumbnail_url: None,
        description: Some(description.to_string()),
        source_hash: source_hash(provider_slug, url),
    }
}

/// The fixed sample feed
///
/// A real crawl engine is out of scope; this returns the same data a crawl
/// of the providers' public listings would.
pub fn sample_feed() -> Vec<NewCourse> {
    vec![
        feed_course(
            "Python for Beginners 2024",
            "Udemy",
            "udemy",
            "https://www.udemy.com/course/python-beginners/",
            Some(499.0),
            Some("INR"),
            4.5,
            "20 hours",
            &["programming", "python", "web-development"],
            "Learn Python programming from scratch",
        ),
        feed_course(
            "Machine Learning A-Z",
            "Coursera",
            "coursera",
            "https://www.coursera.org/learn/machine-learning",
            None,
            None,
            4.8,
            "11 weeks",
            &["machine-learning", "data-science", "ai"],
            "Master machine learning algorithms",
        ),
        feed_course(
            "Web Design Bootcamp",
            "Udemy",
            "udemy",
            "https://www.udemy.com/course/web-design-bootcamp/",
            Some(599.0),
            Some("INR"),
            4.6,
            "30 hours",
            &["web-development", "design", "ui-ux-design"],
            "Complete web design course from scratch",
        ),
    ]
}

/// Run the ingest: upsert up to `limit` feed courses with `delay` between items
pub fn run_ingest(db: &Database, limit: usize, delay: Duration) -> Result<IngestReport> {
    let feed = sample_feed();
    let mut report = IngestReport::default();

    for (i, course) in feed.iter().take(limit).enumerate() {
        if i > 0 && !delay.is_zero() {
            std::thread::sleep(delay);
        }

        match db.upsert_course(course) {
            Ok(CourseUpsertResult::Inserted(id)) => {
                info!(course = %course.title, id, "Catalog course added");
                report.inserted += 1;
            }
            Ok(CourseUpsertResult::Updated(id)) => {
                info!(course = %course.title, id, "Catalog course refreshed");
                report.updated += 1;
            }
            Err(e) => {
                warn!(course = %course.title, error = %e, "Failed to save course");
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_hash_is_deterministic_and_distinct() {
        let a = source_hash("udemy", "https://example.com/a");
        let b = source_hash("udemy", "https://example.com/a");
        let c = source_hash("coursera", "https://example.com/a");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn feed_hashes_are_unique() {
        let feed = sample_feed();
        for (i, a) in feed.iter().enumerate() {
            for b in feed.iter().skip(i + 1) {
                assert_ne!(a.source_hash, b.source_hash);
            }
        }
    }

    #[test]
    fn ingest_twice_is_idempotent() {
        let db = Database::in_memory().unwrap();

        let first = run_ingest(&db, 50, Duration::ZERO).unwrap();
        assert_eq!(first.inserted, 3);
        assert_eq!(first.updated, 0);

        let second = run_ingest(&db, 50, Duration::ZERO).unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.updated, 3);

        assert_eq!(db.count_courses().unwrap(), 3);
    }

    #[test]
    fn ingest_respects_limit() {
        let db = Database::in_memory().unwrap();
        let report = run_ingest(&db, 1, Duration::ZERO).unwrap();
        assert_eq!(report.processed(), 1);
        assert_eq!(db.count_courses().unwrap(), 1);
    }
}
