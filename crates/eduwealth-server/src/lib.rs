//! EduWealth Web Server
//!
//! Axum-based REST API for the EduWealth student finance application.
//!
//! Security features:
//! - JWT bearer authentication (access + persisted refresh tokens)
//! - Restrictive CORS policy
//! - Input validation (pagination limits, positive amounts)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use eduwealth_core::db::Database;

pub mod auth;
mod handlers;

pub use auth::{CurrentUser, JwtKeys};

/// Maximum browse page size
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Default browse page size
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Environment variable for the JWT signing secret
pub const JWT_SECRET_ENV: &str = "EDUWEALTH_JWT_SECRET";

/// Environment variable for the expected Google OAuth client ID (aud claim)
pub const GOOGLE_CLIENT_ID_ENV: &str = "EDUWEALTH_GOOGLE_CLIENT_ID";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Secret used to sign access and refresh tokens
    pub jwt_secret: String,
    /// Allowed CORS origins (empty = same-origin only in production)
    pub allowed_origins: Vec<String>,
    /// Expected `aud` claim for Google sign-in tokens; None skips the check
    pub google_client_id: Option<String>,
}

impl ServerConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            allowed_origins: vec![],
            google_client_id: None,
        }
    }

    /// Read configuration from the environment
    ///
    /// Falls back to a fixed development secret when EDUWEALTH_JWT_SECRET is
    /// unset; tokens signed with it are worthless across restarts of a real
    /// deployment, so a loud warning is logged.
    pub fn from_env() -> Self {
        let jwt_secret = match std::env::var(JWT_SECRET_ENV) {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                warn!(
                    "⚠️  {} not set - using a development-only signing secret. \
                     Do not expose this server to a network!",
                    JWT_SECRET_ENV
                );
                "eduwealth-dev-secret".to_string()
            }
        };

        let allowed_origins = std::env::var("EDUWEALTH_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            jwt_secret,
            allowed_origins,
            google_client_id: std::env::var(GOOGLE_CLIENT_ID_ENV).ok(),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    pub jwt: JwtKeys,
    /// HTTP client for Google ID token verification
    pub http: reqwest::Client,
}

/// Message response (for deletes/logout)
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Create the application router
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let jwt = JwtKeys::new(&config.jwt_secret);

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        jwt,
        http: reqwest::Client::new(),
    });

    // Routes reachable without a bearer token
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/login", post(handlers::login))
        .route("/auth/refresh", post(handlers::refresh_token))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/google", post(handlers::google_auth))
        .route("/interests", get(handlers::list_interests));

    let protected_routes = Router::new()
        // Profile
        .route("/me", get(handlers::get_me).put(handlers::update_me))
        .route("/me/budget", put(handlers::update_budget))
        // Interests
        .route(
            "/interests/me",
            get(handlers::get_my_interests).post(handlers::set_my_interests),
        )
        // Expenses
        .route(
            "/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route(
            "/expenses/:id",
            get(handlers::get_expense).delete(handlers::delete_expense),
        )
        // Courses
        .route("/courses", get(handlers::browse_courses))
        .route("/courses/save", post(handlers::save_course))
        .route("/courses/save/:course_id", delete(handlers::unsave_course))
        .route("/courses/saved", get(handlers::get_saved_courses))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    let api_routes = public_routes.merge(protected_routes);

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        // Allow specified origins
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    // Security headers
    // CSP: restrict scripts to same-origin, allow inline styles, allow https images (course thumbnails)
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' https: data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    // Drop refresh tokens that expired while the server was down
    match db.purge_expired_tokens() {
        Ok(count) if count > 0 => {
            info!("Purged {} expired refresh token(s)", count);
        }
        Ok(_) => {}
        Err(e) => {
            warn!("Failed to purge expired refresh tokens: {}", e);
        }
    }

    let app = create_router(db, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
