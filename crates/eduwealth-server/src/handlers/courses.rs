//! Course handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use eduwealth_core::models::Course;
use eduwealth_core::recommend::{browse, BrowseFilter, BrowseQuery};

use crate::auth::CurrentUser;
use crate::{AppError, AppState, MessageResponse, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

/// Query parameters for browsing courses
#[derive(Debug, Deserialize)]
pub struct CourseBrowseParams {
    pub interest: Option<String>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

#[derive(Serialize)]
pub struct CourseBrowseResponse {
    pub courses: Vec<Course>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// GET /api/courses - Browse courses ranked against the user's interests
pub async fn browse_courses(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<CourseBrowseParams>,
) -> Result<Json<CourseBrowseResponse>, AppError> {
    // Input validation: clamp pagination parameters
    let limit = params.limit.max(1).min(MAX_PAGE_LIMIT);
    let offset = params.offset.max(0);

    let interest_names = state.db.user_interest_names(current.id)?;

    let query = BrowseQuery {
        filter: BrowseFilter {
            search: params.search.clone(),
            interest: params.interest.clone(),
            max_price: params.max_price,
        },
        limit,
        offset,
    };

    let result = browse(&state.db, &interest_names, &query)?;

    Ok(Json(CourseBrowseResponse {
        courses: result.courses,
        total: result.total,
        limit,
        offset,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SaveCourseRequest {
    #[serde(rename = "courseId")]
    pub course_id: Option<i64>,
}

#[derive(Serialize)]
pub struct SaveCourseResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<Course>,
}

/// POST /api/courses/save - Save a course to the user's list
pub async fn save_course(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<SaveCourseRequest>,
) -> Result<Json<SaveCourseResponse>, AppError> {
    let course_id = req
        .course_id
        .ok_or_else(|| AppError::bad_request("courseId is required"))?;

    let course = state
        .db
        .get_course(course_id)?
        .ok_or_else(|| AppError::not_found("Course not found"))?;

    if !state.db.save_course_for_user(current.id, course_id)? {
        return Ok(Json(SaveCourseResponse {
            message: "Course already saved".to_string(),
            course: None,
        }));
    }

    Ok(Json(SaveCourseResponse {
        message: "Course saved successfully".to_string(),
        course: Some(course),
    }))
}

/// DELETE /api/courses/save/:course_id - Remove a saved course
pub async fn unsave_course(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(course_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.db.unsave_course_for_user(current.id, course_id)? {
        return Err(AppError::not_found("Saved course not found"));
    }

    Ok(Json(MessageResponse {
        message: "Course removed from saved courses".to_string(),
    }))
}

#[derive(Serialize)]
pub struct SavedCoursesResponse {
    pub courses: Vec<Course>,
    pub total: usize,
}

/// GET /api/courses/saved - The user's saved courses
pub async fn get_saved_courses(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<SavedCoursesResponse>, AppError> {
    let courses = state.db.list_saved_courses(current.id)?;

    Ok(Json(SavedCoursesResponse {
        total: courses.len(),
        courses,
    }))
}
