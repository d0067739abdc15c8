//! Built-in sample courses
//!
//! Fixed fallback set used by the price-anchored recommender when the
//! catalog has no match (or is unreachable). No network access: the set is
//! assembled from literals and filtered by price.

use crate::models::CourseSummary;
use crate::recommend::MAX_RECOMMENDATIONS;

/// Fallback band around the anchor: [anchor * 0.3, anchor * 1.5]
///
/// The lower bound is intentionally wider than the catalog path's 0.5x so
/// the fallback is non-empty more often.
const FALLBACK_BAND_LOWER: f64 = 0.3;
const FALLBACK_BAND_UPPER: f64 = 1.5;

fn sample(
    title: &str,
    url: &str,
    price: f64,
    rating: f64,
    duration: &str,
    categories: &[&str],
    thumbnail_url: &str,
    description: &str,
) -> CourseSummary {
    CourseSummary {
        id: None,
        title: title.to_string(),
        provider_name: "Udemy".to_string(),
        provider_slug: "udemy".to_string(),
        url: url.to_string(),
        price: Some(price),
        currency: Some("INR".to_string()),
        rating: Some(rating),
        duration: Some(duration.to_string()),
        categories: Some(categories.iter().map(|c| c.to_string()).collect()),
        thumbnail_url: Some(thumbnail_url.to_string()),
        description: Some(description.to_string()),
    }
}

/// Sample courses near a price anchor, capped at three
///
/// Candidates are added by anchor threshold (cheaper anchors get the
/// cheaper candidates), a budget Excel course is always included, then the
/// list is filtered to the fallback band.
pub fn courses_near_price(price_anchor: f64) -> Vec<CourseSummary> {
    let mut candidates = Vec::new();

    if price_anchor <= 100.0 {
        candidates.push(sample(
            "Complete Web Development Bootcamp 2024",
            "https://www.udemy.com/course/the-complete-web-development-bootcamp/",
            85.0,
            4.7,
            "61 hours",
            &["web-development", "programming", "html", "css", "javascript"],
            "https://img-c.udemycdn.com/course/240x135/1565838_e54e_18.jpg",
            "Learn Web Development from scratch with HTML, CSS, JavaScript, Node, React, MongoDB and more!",
        ));
    }

    if price_anchor <= 300.0 {
        candidates.push(sample(
            "Python for Beginners - Learn Programming from scratch",
            "https://www.udemy.com/course/python-for-beginners-learn-programming-from-scratch/",
            299.0_f64.min(price_anchor * 1.2),
            4.5,
            "9 hours",
            &["python", "programming"],
            "https://img-c.udemycdn.com/course/240x135/394676_ce3d_5.jpg",
            "Learn Python programming from basics to advanced. Perfect for beginners!",
        ));
    }

    if price_anchor <= 500.0 {
        candidates.push(sample(
            "The Complete Digital Marketing Course",
            "https://www.udemy.com/course/learn-digital-marketing-course/",
            449.0_f64.min(price_anchor * 1.1),
            4.4,
            "23 hours",
            &["digital-marketing", "business", "seo"],
            "https://img-c.udemycdn.com/course/240x135/1362070_b9a1_2.jpg",
            "Master Digital Marketing: SEO, Social Media, Email Marketing, and more!",
        ));
    }

    // Always offer Excel as a budget-friendly option
    candidates.push(sample(
        "Microsoft Excel - Excel from Beginner to Advanced",
        "https://www.udemy.com/course/microsoft-excel-2013-from-beginner-to-advanced-and-beyond/",
        49.0,
        4.6,
        "16 hours",
        &["excel", "productivity", "microsoft-office"],
        "https://img-c.udemycdn.com/course/240x135/321410_7f8b_5.jpg",
        "Master Microsoft Excel from Beginner to Advanced level.",
    ));

    let min_price = price_anchor * FALLBACK_BAND_LOWER;
    let max_price = price_anchor * FALLBACK_BAND_UPPER;

    candidates
        .into_iter()
        .filter(|c| {
            c.price
                .map(|p| p >= min_price && p <= max_price)
                .unwrap_or(false)
        })
        .take(MAX_RECOMMENDATIONS)
        .collect()
}
