//! Authentication handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use eduwealth_core::auth::{hash_password, verify_password};
use eduwealth_core::models::{NewUser, User};

use crate::auth::issue_token_pair;
use crate::{AppError, AppState, MessageResponse};

/// User fields exposed in auth responses
#[derive(Serialize)]
pub struct UserPayload {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
}

impl From<&User> for UserPayload {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub user: UserPayload,
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/auth/signup - Register a new user
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request("name is required"))?;
    let email = req
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| s.contains('@'))
        .ok_or_else(|| AppError::bad_request("A valid email is required"))?;
    let password = req
        .password
        .as_deref()
        .filter(|s| s.len() >= 6)
        .ok_or_else(|| AppError::bad_request("password must be at least 6 characters"))?;

    if state.db.get_user_by_email(email)?.is_some() {
        return Err(AppError::bad_request("User with this email already exists"));
    }

    let user = state.db.create_user(&NewUser {
        email: email.to_string(),
        name: Some(name.to_string()),
        password_hash: Some(hash_password(password)?),
        google_id: None,
    })?;

    info!(user = %user.email, "User registered");

    let (access_token, refresh_token) = issue_token_pair(&state, &user)?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            user: UserPayload::from(&user),
            access_token,
            refresh_token,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/auth/login - Login with email and password
///
/// Unknown email, passwordless (Google-only) account, and wrong password all
/// return the same message, so the endpoint does not leak which accounts exist.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let email = req
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request("email is required"))?;
    let password = req
        .password
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request("password is required"))?;

    let auth = state
        .db
        .get_auth_by_email(email)?
        .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

    let valid = auth
        .password_hash
        .as_deref()
        .map(|hash| verify_password(password, hash))
        .unwrap_or(false);

    if !valid {
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let user = state
        .db
        .get_user(auth.id)?
        .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

    let (access_token, refresh_token) = issue_token_pair(&state, &user)?;

    Ok(Json(TokenResponse {
        user: UserPayload::from(&user),
        access_token,
        refresh_token,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(rename = "refreshToken")]
    pub refresh_token: Option<String>,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

/// POST /api/auth/refresh - Exchange a refresh token for a new access token
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    let token = req
        .refresh_token
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request("refreshToken is required"))?;

    // The token must still be on record; logout revokes it
    let record = state
        .db
        .get_refresh_token(token)?
        .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

    if record.expires_at < Utc::now() {
        state.db.delete_refresh_token(token)?;
        return Err(AppError::unauthorized("Refresh token expired"));
    }

    // Validate the signature and type tag as well
    let claims = crate::auth::decode_token(&state.jwt, token, "refresh")
        .map_err(|_| AppError::unauthorized("Invalid refresh token"))?;

    let access_token = crate::auth::issue_access_token(&state.jwt, record.user_id, &claims.email)?;

    Ok(Json(RefreshResponse { access_token }))
}

/// POST /api/auth/logout - Invalidate a refresh token
///
/// Always succeeds: logging out with a missing or unknown token is a no-op.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if let Some(token) = req.refresh_token.as_deref().filter(|s| !s.is_empty()) {
        state.db.delete_refresh_token(token)?;
    }

    Ok(Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct GoogleAuthRequest {
    pub token: Option<String>,
}

/// Subset of Google's tokeninfo response we care about
#[derive(Debug, Deserialize)]
struct GoogleTokenInfo {
    sub: String,
    email: Option<String>,
    name: Option<String>,
    aud: Option<String>,
}

/// Verify a Google ID token against the tokeninfo endpoint
async fn verify_google_token(
    http: &reqwest::Client,
    token: &str,
    expected_client_id: Option<&str>,
) -> Result<GoogleTokenInfo, String> {
    let response = http
        .get("https://oauth2.googleapis.com/tokeninfo")
        .query(&[("id_token", token)])
        .timeout(std::time::Duration::from_secs(10))
        .send()
        .await
        .map_err(|e| format!("tokeninfo request failed: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("tokeninfo returned {}", response.status()));
    }

    let info: GoogleTokenInfo = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse tokeninfo response: {}", e))?;

    if let Some(expected) = expected_client_id {
        if info.aud.as_deref() != Some(expected) {
            return Err("Token audience does not match configured client ID".to_string());
        }
    }

    Ok(info)
}

/// POST /api/auth/google - Authenticate with a Google ID token
///
/// Creates the user on first sign-in; links the Google account when a user
/// with the same email already exists.
pub async fn google_auth(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GoogleAuthRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = req
        .token
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request("Token is required"))?;

    let info = match verify_google_token(
        &state.http,
        token,
        state.config.google_client_id.as_deref(),
    )
    .await
    {
        Ok(info) => info,
        Err(e) => {
            warn!(error = %e, "Google authentication failed");
            return Err(AppError::unauthorized("Google authentication failed"));
        }
    };

    let email = info
        .email
        .as_deref()
        .ok_or_else(|| AppError::unauthorized("Google token carries no email"))?;

    let user = match state.db.get_user_by_google_id(&info.sub)? {
        Some(user) => user,
        None => match state.db.get_user_by_email(email)? {
            // Existing password account with the same email: link it
            Some(user) => {
                state.db.link_google_id(user.id, &info.sub)?;
                state
                    .db
                    .get_user(user.id)?
                    .ok_or_else(|| AppError::internal("User vanished during linking"))?
            }
            None => state.db.create_user(&NewUser {
                email: email.to_string(),
                name: info.name.clone(),
                password_hash: None,
                google_id: Some(info.sub.clone()),
            })?,
        },
    };

    info!(user = %user.email, "User authenticated via Google");

    let (access_token, refresh_token) = issue_token_pair(&state, &user)?;

    Ok(Json(TokenResponse {
        user: UserPayload::from(&user),
        access_token,
        refresh_token,
    }))
}
