//! Course recommender
//!
//! Two modes:
//! - price-anchored: after a wasteful expense, suggest catalog courses priced
//!   near the amount just spent, degrading to the built-in sample set when the
//!   catalog has nothing (or is unreachable)
//! - interest-anchored: browse/search the catalog ranked by a score over the
//!   user's interests, rating, and price

use tracing::warn;

use crate::error::Result;
use crate::models::{Course, CourseSummary};
use crate::samples;

/// Maximum number of price-anchored recommendations
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Catalog band around the spent amount: [amount * 0.5, amount * 1.5]
const PRICE_BAND_LOWER: f64 = 0.5;
const PRICE_BAND_UPPER: f64 = 1.5;

/// Points per matched interest when scoring a browse candidate
const INTEREST_MATCH_POINTS: f64 = 10.0;
/// Bonus for free courses
const FREE_COURSE_BONUS: f64 = 5.0;
/// Price penalty cap
const MAX_PRICE_PENALTY: f64 = 5.0;

/// Read-only course catalog operations the recommender depends on
///
/// Implemented by [`crate::db::Database`]; a trait seam so the degradation
/// path can be exercised against a failing catalog in tests.
pub trait CourseCatalog {
    /// Courses with `price` in `[min_price, max_price]` for the currency,
    /// ordered by rating descending then price ascending.
    fn courses_in_price_band(
        &self,
        min_price: f64,
        max_price: f64,
        currency: &str,
        limit: i64,
    ) -> Result<Vec<Course>>;

    /// Browse candidates matching the filter, ordered by rating descending
    /// then scrape time descending. `fetch_limit` bounds the over-fetch.
    fn browse_candidates(&self, filter: &BrowseFilter, fetch_limit: i64) -> Result<Vec<Course>>;
}

/// Catalog-level filters for interest-anchored browsing
#[derive(Debug, Clone, Default)]
pub struct BrowseFilter {
    /// Case-insensitive substring over title/description
    pub search: Option<String>,
    /// Single interest filter, matched like `search`
    pub interest: Option<String>,
    /// Free courses (price NULL) always pass this filter
    pub max_price: Option<f64>,
}

/// Full browse query: catalog filters plus pagination
#[derive(Debug, Clone)]
pub struct BrowseQuery {
    pub filter: BrowseFilter,
    pub limit: i64,
    pub offset: i64,
}

/// Browse result page
///
/// `total` counts the scored candidates before pagination. It is bounded by
/// the `limit * 3` over-fetch, not the true catalog total.
#[derive(Debug, Clone)]
pub struct BrowseResult {
    pub courses: Vec<Course>,
    pub total: i64,
}

/// Recommend up to three courses priced near a spent amount
///
/// Queries the catalog for the `[amount * 0.5, amount * 1.5]` band first.
/// When that yields nothing, or the catalog is unreachable, falls back to
/// the built-in sample set (which applies its own wider `[0.3x, 1.5x]`
/// band). Never fails: a catalog error is logged and degraded, so expense
/// creation is unaffected.
pub fn recommend_for_amount(
    catalog: &dyn CourseCatalog,
    amount: f64,
    currency: &str,
) -> Vec<CourseSummary> {
    let min_price = amount * PRICE_BAND_LOWER;
    let max_price = amount * PRICE_BAND_UPPER;

    match catalog.courses_in_price_band(min_price, max_price, currency, MAX_RECOMMENDATIONS as i64)
    {
        Ok(courses) if !courses.is_empty() => courses.iter().map(CourseSummary::from).collect(),
        Ok(_) => samples::courses_near_price(amount),
        Err(e) => {
            warn!(error = %e, "Course catalog unavailable, using built-in samples");
            samples::courses_near_price(amount)
        }
    }
}

/// Score a browse candidate against the user's interest names
///
/// Interest names must already be lowercased. An interest matches a course
/// category tag when either string contains the other.
fn score_course(course: &Course, interest_names: &[String]) -> f64 {
    let mut score = 0.0;

    if !interest_names.is_empty() {
        if let Some(categories) = &course.categories {
            let match_count = categories
                .iter()
                .map(|cat| cat.to_lowercase())
                .filter(|cat| {
                    interest_names
                        .iter()
                        .any(|ui| cat.contains(ui.as_str()) || ui.contains(cat.as_str()))
                })
                .count();
            score += match_count as f64 * INTEREST_MATCH_POINTS;
        }
    }

    if let Some(rating) = course.rating {
        score += rating * 2.0;
    }

    match course.price {
        None => score += FREE_COURSE_BONUS,
        Some(price) => score -= (price / 1000.0).min(MAX_PRICE_PENALTY),
    }

    score
}

/// Browse the catalog ranked by interest/rating/price score
///
/// Over-fetches `limit * 3` candidates so re-ranking has room to reorder,
/// scores them, stable-sorts by score descending (ties keep the catalog
/// order: rating desc, scrape time desc), then paginates the scored order.
pub fn browse(
    catalog: &dyn CourseCatalog,
    user_interests: &[String],
    query: &BrowseQuery,
) -> Result<BrowseResult> {
    let interest_names: Vec<String> = user_interests.iter().map(|s| s.to_lowercase()).collect();

    let fetch_limit = query.limit * 3;
    let candidates = catalog.browse_candidates(&query.filter, fetch_limit)?;

    let mut scored: Vec<(f64, Course)> = candidates
        .into_iter()
        .map(|course| (score_course(&course, &interest_names), course))
        .collect();

    // Stable sort: equal scores keep their prior relative order
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let total = scored.len() as i64;
    let offset = query.offset.max(0) as usize;
    let limit = query.limit.max(0) as usize;

    let courses = scored
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|(_, course)| course)
        .collect();

    Ok(BrowseResult { courses, total })
}
