//! Interest handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::CurrentUser;
use crate::handlers::profile::InterestPayload;
use crate::{AppError, AppState};

/// Interest selections are capped to keep course lookups fast
const MAX_INTERESTS: usize = 10;

/// GET /api/interests - All available interests (public)
pub async fn list_interests(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<InterestPayload>>, AppError> {
    let interests = state.db.list_interests()?;
    Ok(Json(interests.iter().map(InterestPayload::from).collect()))
}

/// GET /api/interests/me - Current user's interests
pub async fn get_my_interests(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<InterestPayload>>, AppError> {
    let interests = state.db.list_user_interests(current.id)?;
    Ok(Json(interests.iter().map(InterestPayload::from).collect()))
}

#[derive(Debug, Deserialize)]
pub struct SetInterestsRequest {
    pub interests: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct SetInterestsResponse {
    pub message: String,
    pub interests: Vec<InterestPayload>,
}

/// POST /api/interests/me - Replace the user's interest selection
pub async fn set_my_interests(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<SetInterestsRequest>,
) -> Result<Json<SetInterestsResponse>, AppError> {
    let names: Vec<String> = req
        .interests
        .ok_or_else(|| AppError::bad_request("interests is required"))?
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    if names.is_empty() {
        return Err(AppError::bad_request("interests cannot be empty"));
    }

    if names.len() > MAX_INTERESTS {
        warn!(
            user = %current.email,
            selected = names.len(),
            "Interest selection over the cap, keeping the first {}",
            MAX_INTERESTS
        );
    }
    let limited: Vec<String> = names.into_iter().take(MAX_INTERESTS).collect();

    let interests = state.db.set_user_interests(current.id, &limited)?;

    Ok(Json(SetInterestsResponse {
        message: "Interests saved successfully!".to_string(),
        interests: interests.iter().map(InterestPayload::from).collect(),
    }))
}
