//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod auth;
pub mod courses;
pub mod expenses;
pub mod interests;
pub mod profile;

// Re-export all handlers for use in router
pub use auth::*;
pub use courses::*;
pub use expenses::*;
pub use interests::*;
pub use profile::*;

use axum::Json;

/// GET /api/health - Liveness probe
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
