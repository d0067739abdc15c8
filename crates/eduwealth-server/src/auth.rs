//! JWT issuance and bearer-token authentication middleware
//!
//! Access tokens are short-lived HS256 JWTs. Refresh tokens are long-lived
//! JWTs that are additionally persisted server-side, so logout and expiry
//! purges can revoke them.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use eduwealth_core::models::User;

use crate::AppState;

/// Access token lifetime
const ACCESS_TOKEN_TTL_MINUTES: i64 = 60;

/// Refresh token lifetime
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// HS256 signing keys derived from the configured secret
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Claims carried by both token kinds; `token_type` tells them apart
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated user, injected by the middleware as a request extension
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
}

/// Issue an access token for a user
pub fn issue_access_token(keys: &JwtKeys, user_id: i64, email: &str) -> anyhow::Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        token_type: "access".to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(ACCESS_TOKEN_TTL_MINUTES)).timestamp(),
    };
    Ok(encode(&Header::default(), &claims, &keys.encoding)?)
}

/// Issue a refresh token for a user, returning the token and its expiry
pub fn issue_refresh_token(
    keys: &JwtKeys,
    user_id: i64,
    email: &str,
) -> anyhow::Result<(String, chrono::DateTime<Utc>)> {
    let now = Utc::now();
    let expires_at = now + Duration::days(REFRESH_TOKEN_TTL_DAYS);
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        token_type: "refresh".to_string(),
        // Nanosecond issue time keeps back-to-back tokens for the same user distinct
        iat: now.timestamp_nanos_opt().unwrap_or_else(|| now.timestamp()),
        exp: expires_at.timestamp(),
    };
    let token = encode(&Header::default(), &claims, &keys.encoding)?;
    Ok((token, expires_at))
}

/// Decode and validate a token, checking its type tag
pub fn decode_token(keys: &JwtKeys, token: &str, expected_type: &str) -> Result<Claims, String> {
    let data = decode::<Claims>(token, &keys.decoding, &Validation::default())
        .map_err(|e| format!("Invalid token: {}", e))?;
    if data.claims.token_type != expected_type {
        return Err(format!(
            "Expected {} token, got {}",
            expected_type, data.claims.token_type
        ));
    }
    Ok(data.claims)
}

/// Token pair issued at signup/login, with the refresh token persisted
///
/// A refresh-token persistence failure is logged but does not fail the
/// login; the access token still works for its lifetime.
pub fn issue_token_pair(state: &AppState, user: &User) -> anyhow::Result<(String, String)> {
    let access = issue_access_token(&state.jwt, user.id, &user.email)?;
    let (refresh, expires_at) = issue_refresh_token(&state.jwt, user.id, &user.email)?;

    if let Err(e) = state.db.insert_refresh_token(user.id, &refresh, expires_at) {
        warn!(error = %e, "Failed to persist refresh token");
    }

    Ok((access, refresh))
}

/// Authentication middleware for protected routes
///
/// Validates the bearer access token, resolves the user against the
/// database (a deleted user's tokens stop working immediately), and injects
/// [`CurrentUser`] as a request extension.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "));

    let Some(token) = token else {
        return unauthorized("Authentication required");
    };

    let claims = match decode_token(&state.jwt, token, "access") {
        Ok(claims) => claims,
        Err(e) => {
            warn!(error = %e, path = %request.uri().path(), "Rejected bearer token");
            return unauthorized("Invalid or expired token");
        }
    };

    let user_id: i64 = match claims.sub.parse() {
        Ok(id) => id,
        Err(_) => return unauthorized("Invalid or expired token"),
    };

    match state.db.get_user(user_id) {
        Ok(Some(user)) => {
            request.extensions_mut().insert(CurrentUser {
                id: user.id,
                email: user.email,
            });
            next.run(request).await
        }
        Ok(None) => unauthorized("Invalid or expired token"),
        Err(e) => {
            warn!(error = %e, "Failed to resolve authenticated user");
            unauthorized("Invalid or expired token")
        }
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}
