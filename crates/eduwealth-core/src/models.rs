//! Domain models for EduWealth

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A registered user
///
/// The password hash is intentionally not part of this struct; the login
/// path fetches credentials separately via `UserAuth`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    /// Google account subject, set when the user signed in with Google
    pub google_id: Option<String>,
    /// Monthly budget, if the user has set one
    pub budget_amount: Option<f64>,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    /// None for Google-only accounts
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
}

/// Credential row used by the login path
#[derive(Debug, Clone)]
pub struct UserAuth {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: Option<String>,
}

/// A stored refresh token
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub id: i64,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

/// A tracked expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub item_name: String,
    /// Always positive; enforced by a CHECK constraint
    pub amount: f64,
    pub currency: String,
    pub category: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create an expense
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub item_name: String,
    pub amount: f64,
    pub currency: String,
    pub category: String,
    pub description: Option<String>,
    pub date: NaiveDate,
}

/// A course in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub provider_name: String,
    pub provider_slug: String,
    pub url: String,
    /// None = free course
    pub price: Option<f64>,
    pub currency: Option<String>,
    /// 0-5 scale
    pub rating: Option<f64>,
    pub duration: Option<String>,
    /// Category tags, stored as a JSON array
    pub categories: Option<Vec<String>>,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
    /// Deduplication key derived from provider + URL
    pub source_hash: String,
    pub scraped_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to upsert a course into the catalog
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub provider_name: String,
    pub provider_slug: String,
    pub url: String,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub rating: Option<f64>,
    pub duration: Option<String>,
    pub categories: Option<Vec<String>>,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
    pub source_hash: String,
}

/// Result of upserting a course by source_hash
#[derive(Debug, Clone)]
pub enum CourseUpsertResult {
    /// A new catalog row was created, contains its ID
    Inserted(i64),
    /// An existing row was refreshed in place, contains its ID
    Updated(i64),
}

/// A course as returned to API clients
///
/// Catalog courses carry their row ID; built-in sample courses do not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub provider_name: String,
    pub provider_slug: String,
    pub url: String,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub rating: Option<f64>,
    pub duration: Option<String>,
    pub categories: Option<Vec<String>>,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        Self {
            id: Some(course.id),
            title: course.title.clone(),
            provider_name: course.provider_name.clone(),
            provider_slug: course.provider_slug.clone(),
            url: course.url.clone(),
            price: course.price,
            currency: course.currency.clone(),
            rating: course.rating,
            duration: course.duration.clone(),
            categories: course.categories.clone(),
            thumbnail_url: course.thumbnail_url.clone(),
            description: course.description.clone(),
        }
    }
}

/// A selectable interest topic
///
/// Created lazily the first time any user selects a previously-unseen name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interest {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}
