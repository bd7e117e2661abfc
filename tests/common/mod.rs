#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot`

use sefer_store::auth::hash_password;
use sefer_store::config::Config;
use sefer_store::db;
use sefer_store::infrastructure::AppState;
use sefer_store::models::category::{self, CategoryInput};
use sefer_store::models::{Book, BookInput, timestamp, user};
use sefer_store::server::build_router;

pub const ADMIN_EMAIL: &str = "admin@sefer.test";
pub const USER_EMAIL: &str = "reader@sefer.test";
pub const PASSWORD: &str = "correct-horse";

pub fn test_config() -> Config {
    Config {
        session_secret: "test-secret".to_string(),
        ..Default::default()
    }
}

// Helper to create a test state on in-memory SQLite
pub async fn setup_with(config: Config) -> (AppState, Router) {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let state = AppState::new(db, config);
    let app = build_router(state.clone());
    (state, app)
}

pub async fn setup() -> (AppState, Router) {
    setup_with(test_config()).await
}

pub async fn create_user(state: &AppState, email: &str, role: &str) -> user::Model {
    let now = timestamp();
    user::ActiveModel {
        email: Set(email.to_string()),
        password_hash: Set(hash_password(PASSWORD).expect("hash")),
        name: Set(Some("Test User".to_string())),
        phone: Set(Some("050-1234567".to_string())),
        role: Set(role.to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(state.db())
    .await
    .expect("Failed to create user")
}

/// Logs in and returns the `session=...` cookie pair.
pub async fn login(app: &Router, email: &str) -> String {
    let request = json_request(
        "POST",
        "/api/auth/login",
        None,
        serde_json::json!({ "email": email, "password": PASSWORD }),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "login failed for {email}");
    session_cookie_pair(&response)
}

pub fn session_cookie_pair(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("Set-Cookie header")
        .to_string()
}

pub async fn admin_cookie(state: &AppState, app: &Router) -> String {
    create_user(state, ADMIN_EMAIL, user::ROLE_ADMIN).await;
    login(app, ADMIN_EMAIL).await
}

pub async fn user_cookie(state: &AppState, app: &Router) -> String {
    create_user(state, USER_EMAIL, user::ROLE_CUSTOMER).await;
    login(app, USER_EMAIL).await
}

pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn multipart_request(
    uri: &str,
    cookie: Option<&str>,
    field: &str,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let boundary = "sefer-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"cover\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

/// Sends a request through the router, returning status and JSON body
/// (`Null` when the body is not JSON).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub async fn create_category(state: &AppState, name: &str) -> category::Model {
    state
        .category_repo
        .create(CategoryInput {
            name: name.to_string(),
            parent_id: None,
        })
        .await
        .expect("Failed to create category")
}

pub async fn create_book(state: &AppState, title: &str, price: f64, category_ids: Vec<i32>) -> Book {
    state
        .book_repo
        .create(BookInput {
            title: title.to_string(),
            price,
            category_ids,
            stock: Some(5),
            ..Default::default()
        })
        .await
        .expect("Failed to create book")
}

pub fn ids(books: &Value) -> Vec<i64> {
    books
        .as_array()
        .expect("array of books")
        .iter()
        .map(|b| b["id"].as_i64().unwrap())
        .collect()
}
