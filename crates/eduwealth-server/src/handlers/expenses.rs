//! Expense handlers
//!
//! Expense creation runs the classifier/recommender pipeline: classify the
//! spending, record the expense, and attach course recommendations when the
//! verdict asks for them. Recommendation failures never fail the request.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use eduwealth_core::classify::classify;
use eduwealth_core::models::{CourseSummary, Expense, NewExpense};
use eduwealth_core::recommend::recommend_for_amount;

use crate::auth::CurrentUser;
use crate::{AppError, AppState, MessageResponse};

const DEFAULT_CURRENCY: &str = "INR";

/// Query parameters for listing expenses
#[derive(Debug, Deserialize)]
pub struct ExpenseListQuery {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    pub category: Option<String>,
}

#[derive(Serialize)]
pub struct ExpenseListResponse {
    pub expenses: Vec<Expense>,
    pub total: f64,
    pub count: usize,
}

fn parse_query_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, AppError> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| AppError::bad_request(&format!("{} must be YYYY-MM-DD", field)))
        })
        .transpose()
}

/// GET /api/expenses - List the user's expenses with optional filters
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<ExpenseListQuery>,
) -> Result<Json<ExpenseListResponse>, AppError> {
    let start_date = parse_query_date(params.start_date.as_deref(), "startDate")?;
    let end_date = parse_query_date(params.end_date.as_deref(), "endDate")?;
    let category = params.category.as_deref();

    let expenses = state
        .db
        .list_expenses(current.id, start_date, end_date, category)?;
    let total = state
        .db
        .sum_expenses(current.id, start_date, end_date, category)?;

    Ok(Json(ExpenseListResponse {
        count: expenses.len(),
        total,
        expenses,
    }))
}

/// Request body for creating an expense
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub category: Option<String>,
    #[serde(rename = "itemName")]
    pub item_name: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct AnalysisPayload {
    #[serde(rename = "isEssential")]
    pub is_essential: bool,
    pub category: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct SavingsPayload {
    pub amount: f64,
    pub currency: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct CreateExpenseResponse {
    pub expense: Expense,
    pub analysis: AnalysisPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<CourseSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings: Option<SavingsPayload>,
}

/// POST /api/expenses - Record an expense, classify it, maybe recommend courses
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<CreateExpenseResponse>), AppError> {
    // Validation happens before classification runs
    let (Some(category), Some(item_name), Some(amount)) =
        (req.category.as_deref(), req.item_name.as_deref(), req.amount)
    else {
        return Err(AppError::bad_request(
            "category, itemName, and amount are required",
        ));
    };

    if category.trim().is_empty() || item_name.trim().is_empty() {
        return Err(AppError::bad_request(
            "category, itemName, and amount are required",
        ));
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::bad_request("amount must be a positive number"));
    }

    let currency = req
        .currency
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_CURRENCY)
        .to_string();

    let verdict = classify(category, item_name, req.description.as_deref());

    let expense = state.db.insert_expense(
        current.id,
        &NewExpense {
            item_name: item_name.to_string(),
            amount,
            currency: currency.clone(),
            category: category.to_string(),
            description: req.description.clone(),
            date: req.date.unwrap_or_else(|| Utc::now().date_naive()),
        },
    )?;

    // The recommender degrades internally; an empty list just means no upsell
    let recommendations = if verdict.show_courses {
        recommend_for_amount(&state.db, amount, &currency)
    } else {
        Vec::new()
    };

    let (recommendations, savings) = if verdict.show_courses && !recommendations.is_empty() {
        let savings = SavingsPayload {
            amount,
            currency: currency.clone(),
            message: "You could learn something valuable for the same price!".to_string(),
        };
        (Some(recommendations), Some(savings))
    } else {
        (None, None)
    };

    Ok((
        StatusCode::CREATED,
        Json(CreateExpenseResponse {
            expense,
            analysis: AnalysisPayload {
                is_essential: verdict.is_essential,
                category: verdict.category_label,
                message: verdict.message,
            },
            recommendations,
            savings,
        }),
    ))
}

/// GET /api/expenses/:id - Fetch a single expense
pub async fn get_expense(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<Expense>, AppError> {
    let expense = state
        .db
        .get_expense(current.id, id)?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;

    Ok(Json(expense))
}

/// DELETE /api/expenses/:id - Delete an expense
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.db.delete_expense(current.id, id)? {
        return Err(AppError::not_found("Expense not found"));
    }

    Ok(Json(MessageResponse {
        message: "Expense deleted successfully".to_string(),
    }))
}
