//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use eduwealth_core::db::Database;
use eduwealth_core::ingest;
use eduwealth_core::models::NewCourse;
use http_body_util::BodyExt;
use tower::ServiceExt;

fn test_config() -> ServerConfig {
    ServerConfig::new("test-secret")
}

fn setup_test_app() -> (Router, Database) {
    let db = Database::in_memory().unwrap();
    let app = create_router(db.clone(), None, test_config());
    (app, db)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

/// Sign up a fresh user and return (access_token, refresh_token)
async fn signup_user(app: &Router, email: &str) -> (String, String) {
    let response = send(
        app,
        "POST",
        "/api/auth/signup",
        None,
        Some(serde_json::json!({
            "name": "Test Student",
            "email": email,
            "password": "secret123"
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = get_body_json(response).await;
    (
        json["accessToken"].as_str().unwrap().to_string(),
        json["refreshToken"].as_str().unwrap().to_string(),
    )
}

fn seed_course(db: &Database, title: &str, url: &str, price: Option<f64>, rating: f64) {
    db.upsert_course(&NewCourse {
        title: title.to_string(),
        provider_name: "Udemy".to_string(),
        provider_slug: "udemy".to_string(),
        url: url.to_string(),
        price,
        currency: price.map(|_| "INR".to_string()),
        rating: Some(rating),
        duration: Some("10 hours".to_string()),
        categories: Some(vec!["programming".to_string(), "python".to_string()]),
        thumbnail_url: None,
        description: Some("A seeded course".to_string()),
        source_hash: ingest::source_hash("udemy", url),
    })
    .unwrap();
}

// ========== Health and Auth Tests ==========

#[tokio::test]
async fn test_health() {
    let (app, _db) = setup_test_app();

    let response = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_signup_and_login_flow() {
    let (app, _db) = setup_test_app();

    let response = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(serde_json::json!({
            "name": "Asha",
            "email": "asha@example.com",
            "password": "secret123"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = get_body_json(response).await;
    assert_eq!(json["user"]["email"], "asha@example.com");
    assert!(json["accessToken"].as_str().unwrap().len() > 20);

    // Duplicate email is rejected
    let response = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(serde_json::json!({
            "name": "Asha",
            "email": "asha@example.com",
            "password": "secret123"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Login works with the right password
    let response = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({
            "email": "asha@example.com",
            "password": "secret123"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Wrong password is a 401 with the generic message
    let response = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({
            "email": "asha@example.com",
            "password": "wrong"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_protected_routes_require_auth() {
    let (app, _db) = setup_test_app();

    let response = send(&app, "GET", "/api/me", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, "GET", "/api/me", Some("not-a-jwt"), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, "GET", "/api/expenses", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_and_logout_flow() {
    let (app, _db) = setup_test_app();
    let (_access, refresh) = signup_user(&app, "asha@example.com").await;

    // Refresh yields a working access token
    let response = send(
        &app,
        "POST",
        "/api/auth/refresh",
        None,
        Some(serde_json::json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let new_access = json["accessToken"].as_str().unwrap().to_string();

    let response = send(&app, "GET", "/api/me", Some(&new_access), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Logout revokes the refresh token
    let response = send(
        &app,
        "POST",
        "/api/auth/logout",
        None,
        Some(serde_json::json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        "POST",
        "/api/auth/refresh",
        None,
        Some(serde_json::json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_with_expired_token_deletes_it() {
    let (app, db) = setup_test_app();
    let (_access, _refresh) = signup_user(&app, "asha@example.com").await;

    let user = db.get_user_by_email("asha@example.com").unwrap().unwrap();
    db.insert_refresh_token(
        user.id,
        "stale-token",
        chrono::Utc::now() - chrono::Duration::days(1),
    )
    .unwrap();

    let response = send(
        &app,
        "POST",
        "/api/auth/refresh",
        None,
        Some(serde_json::json!({ "refreshToken": "stale-token" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(db.get_refresh_token("stale-token").unwrap().is_none());
}

// ========== Profile Tests ==========

#[tokio::test]
async fn test_profile_round_trip() {
    let (app, _db) = setup_test_app();
    let (token, _) = signup_user(&app, "asha@example.com").await;

    let response = send(&app, "GET", "/api/me", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["email"], "asha@example.com");
    assert_eq!(json["currency"], "INR");
    assert!(json["budgetAmount"].is_null());

    let response = send(
        &app,
        "PUT",
        "/api/me/budget",
        Some(&token),
        Some(serde_json::json!({ "budgetAmount": 8000.0 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["budgetAmount"], 8000.0);

    let response = send(
        &app,
        "PUT",
        "/api/me",
        Some(&token),
        Some(serde_json::json!({ "name": "Asha R" })),
    )
    .await;
    let json = get_body_json(response).await;
    assert_eq!(json["name"], "Asha R");
    // Budget untouched by the partial update
    assert_eq!(json["budgetAmount"], 8000.0);
}

// ========== Expense Tests ==========

#[tokio::test]
async fn test_create_expense_validation() {
    let (app, _db) = setup_test_app();
    let (token, _) = signup_user(&app, "asha@example.com").await;

    // Missing amount
    let response = send(
        &app,
        "POST",
        "/api/expenses",
        Some(&token),
        Some(serde_json::json!({ "category": "Other", "itemName": "thing" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Non-positive amount
    let response = send(
        &app,
        "POST",
        "/api/expenses",
        Some(&token),
        Some(serde_json::json!({
            "category": "Other",
            "itemName": "thing",
            "amount": -10.0
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "amount must be a positive number");
}

#[tokio::test]
async fn test_essential_expense_has_no_recommendations() {
    let (app, db) = setup_test_app();
    let (token, _) = signup_user(&app, "asha@example.com").await;

    // Even with matching catalog courses available
    seed_course(&db, "Rust Basics", "https://e/rust", Some(100.0), 4.5);

    let response = send(
        &app,
        "POST",
        "/api/expenses",
        Some(&token),
        Some(serde_json::json!({
            "category": "Food & Drinks",
            "itemName": "weekly groceries",
            "amount": 100.0
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = get_body_json(response).await;

    assert_eq!(json["analysis"]["isEssential"], true);
    assert_eq!(json["analysis"]["category"], "Essential");
    assert!(json.get("recommendations").is_none());
    assert!(json.get("savings").is_none());
    assert_eq!(json["expense"]["item_name"], "weekly groceries");
}

#[tokio::test]
async fn test_wasteful_expense_recommends_catalog_courses() {
    let (app, db) = setup_test_app();
    let (token, _) = signup_user(&app, "asha@example.com").await;

    // 90 is inside [100 * 0.5, 100 * 1.5]
    seed_course(&db, "Python Crash Course", "https://e/py", Some(90.0), 4.5);

    let response = send(
        &app,
        "POST",
        "/api/expenses",
        Some(&token),
        Some(serde_json::json!({
            "category": "Food & Drinks",
            "itemName": "cheese burger",
            "amount": 100.0
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = get_body_json(response).await;

    assert_eq!(json["analysis"]["isEssential"], false);
    let recommendations = json["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0]["title"], "Python Crash Course");
    // Catalog courses carry their row ID
    assert!(recommendations[0]["id"].as_i64().unwrap() > 0);

    assert_eq!(json["savings"]["amount"], 100.0);
    assert_eq!(json["savings"]["currency"], "INR");
}

#[tokio::test]
async fn test_wasteful_expense_falls_back_to_samples() {
    let (app, _db) = setup_test_app();
    let (token, _) = signup_user(&app, "asha@example.com").await;

    // Empty catalog: the built-in sample set takes over
    let response = send(
        &app,
        "POST",
        "/api/expenses",
        Some(&token),
        Some(serde_json::json!({
            "category": "Entertainment",
            "itemName": "movie ticket",
            "amount": 100.0
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = get_body_json(response).await;

    let recommendations = json["recommendations"].as_array().unwrap();
    assert!(!recommendations.is_empty());
    assert!(recommendations.len() <= 3);
    // Sample courses have no catalog ID
    assert!(recommendations[0].get("id").is_none());
    // And they respect the wider fallback band
    for rec in recommendations {
        let price = rec["price"].as_f64().unwrap();
        assert!((30.0..=150.0).contains(&price));
    }
}

#[tokio::test]
async fn test_expense_list_and_totals() {
    let (app, _db) = setup_test_app();
    let (token, _) = signup_user(&app, "asha@example.com").await;

    for (item, amount, category) in [
        ("bus pass", 100.0, "Transport"),
        ("weekly groceries", 250.0, "Food & Drinks"),
    ] {
        let response = send(
            &app,
            "POST",
            "/api/expenses",
            Some(&token),
            Some(serde_json::json!({
                "category": category,
                "itemName": item,
                "amount": amount
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send(&app, "GET", "/api/expenses", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["count"], 2);
    assert_eq!(json["total"], 350.0);

    let response = send(
        &app,
        "GET",
        "/api/expenses?category=Transport",
        Some(&token),
        None,
    )
    .await;
    let json = get_body_json(response).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["total"], 100.0);
}

#[tokio::test]
async fn test_expenses_are_scoped_to_their_owner() {
    let (app, _db) = setup_test_app();
    let (asha, _) = signup_user(&app, "asha@example.com").await;
    let (dev, _) = signup_user(&app, "dev@example.com").await;

    let response = send(
        &app,
        "POST",
        "/api/expenses",
        Some(&asha),
        Some(serde_json::json!({
            "category": "Other",
            "itemName": "mystery",
            "amount": 42.0
        })),
    )
    .await;
    let json = get_body_json(response).await;
    let id = json["expense"]["id"].as_i64().unwrap();

    // Another user cannot see or delete it
    let response = send(&app, "GET", &format!("/api/expenses/{}", id), Some(&dev), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        "DELETE",
        &format!("/api/expenses/{}", id),
        Some(&dev),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The owner can
    let response = send(
        &app,
        "DELETE",
        &format!("/api/expenses/{}", id),
        Some(&asha),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ========== Interest Tests ==========

#[tokio::test]
async fn test_interests_flow() {
    let (app, _db) = setup_test_app();
    let (token, _) = signup_user(&app, "asha@example.com").await;

    // Public listing starts empty
    let response = send(&app, "GET", "/api/interests", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(get_body_json(response).await.as_array().unwrap().is_empty());

    // Save more than the cap: only the first ten stick
    let names: Vec<String> = (1..=11).map(|i| format!("Interest {}", i)).collect();
    let response = send(
        &app,
        "POST",
        "/api/interests/me",
        Some(&token),
        Some(serde_json::json!({ "interests": names })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["interests"].as_array().unwrap().len(), 10);

    // A second save replaces the selection
    let response = send(
        &app,
        "POST",
        "/api/interests/me",
        Some(&token),
        Some(serde_json::json!({ "interests": ["Python"] })),
    )
    .await;
    let json = get_body_json(response).await;
    assert_eq!(json["interests"].as_array().unwrap().len(), 1);
    assert_eq!(json["interests"][0]["slug"], "python");

    let response = send(&app, "GET", "/api/interests/me", Some(&token), None).await;
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    // Lazily-created interests remain in the public catalog
    let response = send(&app, "GET", "/api/interests", None, None).await;
    assert_eq!(get_body_json(response).await.as_array().unwrap().len(), 11);
}

// ========== Course Tests ==========

#[tokio::test]
async fn test_browse_courses_pagination() {
    let (app, db) = setup_test_app();
    let (token, _) = signup_user(&app, "asha@example.com").await;

    seed_course(&db, "Course A", "https://e/a", Some(100.0), 4.0);
    seed_course(&db, "Course B", "https://e/b", Some(100.0), 4.9);

    let response = send(&app, "GET", "/api/courses?limit=1", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["courses"].as_array().unwrap().len(), 1);
    assert_eq!(json["total"], 2);
    assert_eq!(json["limit"], 1);

    // Higher-rated course ranks first
    assert_eq!(json["courses"][0]["title"], "Course B");

    // Offset beyond the candidate count yields an empty page, total unchanged
    let response = send(&app, "GET", "/api/courses?offset=50", Some(&token), None).await;
    let json = get_body_json(response).await;
    assert!(json["courses"].as_array().unwrap().is_empty());
    assert_eq!(json["total"], 2);
    assert_eq!(json["offset"], 50);
}

#[tokio::test]
async fn test_browse_free_courses_pass_max_price_filter() {
    let (app, db) = setup_test_app();
    let (token, _) = signup_user(&app, "asha@example.com").await;

    seed_course(&db, "Free Course", "https://e/free", None, 4.0);
    seed_course(&db, "Pricey Course", "https://e/pricey", Some(900.0), 4.9);

    let response = send(
        &app,
        "GET",
        "/api/courses?max_price=100",
        Some(&token),
        None,
    )
    .await;
    let json = get_body_json(response).await;
    let courses = json["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["title"], "Free Course");
}

#[tokio::test]
async fn test_browse_ranks_interest_matches_first() {
    let (app, db) = setup_test_app();
    let (token, _) = signup_user(&app, "asha@example.com").await;

    // Higher-rated course without a matching tag vs lower-rated with one
    db.upsert_course(&NewCourse {
        title: "Cooking Masterclass".to_string(),
        provider_name: "Udemy".to_string(),
        provider_slug: "udemy".to_string(),
        url: "https://e/cooking".to_string(),
        price: Some(100.0),
        currency: Some("INR".to_string()),
        rating: Some(4.9),
        duration: None,
        categories: Some(vec!["cooking".to_string()]),
        thumbnail_url: None,
        description: None,
        source_hash: ingest::source_hash("udemy", "https://e/cooking"),
    })
    .unwrap();
    seed_course(&db, "Python Deep Dive", "https://e/py", Some(100.0), 4.0);

    let response = send(
        &app,
        "POST",
        "/api/interests/me",
        Some(&token),
        Some(serde_json::json!({ "interests": ["Python"] })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", "/api/courses", Some(&token), None).await;
    let json = get_body_json(response).await;
    // The +10 interest match outweighs the rating difference
    assert_eq!(json["courses"][0]["title"], "Python Deep Dive");
}

#[tokio::test]
async fn test_save_and_unsave_course() {
    let (app, db) = setup_test_app();
    let (token, _) = signup_user(&app, "asha@example.com").await;

    seed_course(&db, "Course A", "https://e/a", Some(100.0), 4.0);
    let course_id = db
        .get_course_by_hash(&ingest::source_hash("udemy", "https://e/a"))
        .unwrap()
        .unwrap()
        .id;

    // Unknown course is a 404
    let response = send(
        &app,
        "POST",
        "/api/courses/save",
        Some(&token),
        Some(serde_json::json!({ "courseId": 9999 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        "POST",
        "/api/courses/save",
        Some(&token),
        Some(serde_json::json!({ "courseId": course_id })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Course saved successfully");

    // Saving twice is acknowledged, not duplicated
    let response = send(
        &app,
        "POST",
        "/api/courses/save",
        Some(&token),
        Some(serde_json::json!({ "courseId": course_id })),
    )
    .await;
    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Course already saved");

    let response = send(&app, "GET", "/api/courses/saved", Some(&token), None).await;
    let json = get_body_json(response).await;
    assert_eq!(json["total"], 1);

    let response = send(
        &app,
        "DELETE",
        &format!("/api/courses/save/{}", course_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        "DELETE",
        &format!("/api/courses/save/{}", course_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
