//! Profile handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use eduwealth_core::models::{Interest, User};

use crate::auth::CurrentUser;
use crate::{AppError, AppState};

#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
    #[serde(rename = "budgetAmount")]
    pub budget_amount: Option<f64>,
    pub currency: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    pub interests: Vec<InterestPayload>,
}

#[derive(Serialize)]
pub struct InterestPayload {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl From<&Interest> for InterestPayload {
    fn from(interest: &Interest) -> Self {
        Self {
            id: interest.id,
            name: interest.name.clone(),
            slug: interest.slug.clone(),
        }
    }
}

fn profile_response(user: &User, interests: &[Interest]) -> ProfileResponse {
    ProfileResponse {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        budget_amount: user.budget_amount,
        currency: user.currency.clone(),
        created_at: user.created_at.to_rfc3339(),
        interests: interests.iter().map(InterestPayload::from).collect(),
    }
}

/// GET /api/me - Current user profile
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = state
        .db
        .get_user(current.id)?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    let interests = state.db.list_user_interests(current.id)?;

    Ok(Json(profile_response(&user, &interests)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    #[serde(rename = "budgetAmount")]
    pub budget_amount: Option<f64>,
    pub currency: Option<String>,
}

/// PUT /api/me - Update profile fields
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    if let Some(name) = req.name.as_deref() {
        if name.trim().is_empty() {
            return Err(AppError::bad_request("name cannot be empty"));
        }
    }
    if let Some(budget) = req.budget_amount {
        if budget < 0.0 {
            return Err(AppError::bad_request("budgetAmount cannot be negative"));
        }
    }

    let user = state.db.update_profile(
        current.id,
        req.name.as_deref().map(str::trim),
        req.budget_amount,
        req.currency.as_deref(),
    )?;
    let interests = state.db.list_user_interests(current.id)?;

    Ok(Json(profile_response(&user, &interests)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBudgetRequest {
    #[serde(rename = "budgetAmount")]
    pub budget_amount: Option<f64>,
    pub currency: Option<String>,
}

/// PUT /api/me/budget - Update the monthly budget
pub async fn update_budget(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<UpdateBudgetRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let budget = req
        .budget_amount
        .ok_or_else(|| AppError::bad_request("budgetAmount is required"))?;
    if budget < 0.0 {
        return Err(AppError::bad_request("budgetAmount cannot be negative"));
    }

    let user = state
        .db
        .update_profile(current.id, None, Some(budget), req.currency.as_deref())?;
    let interests = state.db.list_user_interests(current.id)?;

    Ok(Json(profile_response(&user, &interests)))
}
