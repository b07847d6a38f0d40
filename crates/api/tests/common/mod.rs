#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use tnc_api::auth::jwt::{issue_session, JwtConfig};
use tnc_api::auth::password::hash_password;
use tnc_api::config::{AiConfig, ServerConfig, StorageBackend, StorageConfig};
use tnc_api::router::build_app_router;
use tnc_api::services::quiz_generator::TemplateQuizGenerator;
use tnc_api::services::storage::LocalStorage;
use tnc_api::state::AppState;
use tnc_db::models::user::CreateUser;
use tnc_core::roles::Role;
use tnc_db::repositories::UserRepo;

pub const TEST_PASSWORD: &str = "test_password_123!";

pub const ROLE_ADMIN: i64 = Role::Admin.seeded_id();
pub const ROLE_INSTRUCTOR: i64 = Role::Instructor.seeded_id();
pub const ROLE_VIEWER: i64 = Role::Viewer.seeded_id();

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-that-is-long-enough".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        storage: StorageConfig {
            backend: StorageBackend::Local,
            local_root: storage_root().to_string_lossy().into_owned(),
            s3_bucket: None,
            presign_expiry_secs: 900,
        },
        ai: AiConfig {
            api_url: "http://127.0.0.1:9/unused".to_string(),
            api_key: None,
            model: "test".to_string(),
        },
    }
}

fn storage_root() -> std::path::PathBuf {
    std::env::temp_dir().join("tnc-api-tests")
}

/// The production router over local storage and the template generator.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        storage: Arc::new(LocalStorage::new(storage_root(), 900)),
        quiz_generator: Arc::new(TemplateQuizGenerator),
    };
    build_app_router(state, &config)
}

/// Insert a user with [`TEST_PASSWORD`] and return its id and an access token.
pub async fn seed_user(pool: &PgPool, username: &str, role_id: i64) -> (i64, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@test.com"),
            password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
            role_id,
        },
    )
    .await
    .expect("user creation should succeed");

    let role = Role::from_seeded_id(role_id).expect("seeded role id");
    let session = issue_session(user.id, role, &test_config().jwt).expect("token");
    (user.id, session.access_token)
}

pub async fn instructor_token(pool: &PgPool) -> String {
    seed_user(pool, "instructor", ROLE_INSTRUCTOR).await.1
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status and return the `data` payload.
pub async fn expect_data(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Customer plus active catalog entry plus course; returns the course JSON.
pub async fn create_course(pool: &PgPool, token: &str) -> Value {
    let customer = expect_data(
        post_json_auth(
            build_test_app(pool.clone()),
            "/api/v1/customers",
            serde_json::json!({ "customer_name": "Acme Corp" }),
            token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let catalog = expect_data(
        post_json_auth(
            build_test_app(pool.clone()),
            "/api/v1/catalogs",
            serde_json::json!({ "title": "Cloud Essentials", "status": "active" }),
            token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    expect_data(
        post_json_auth(
            build_test_app(pool.clone()),
            "/api/v1/courses",
            serde_json::json!({
                "catalog_id": catalog["id"],
                "customer_id": customer["id"],
                "title": "Cloud Essentials for Acme",
                "start_date": "2026-06-01",
                "end_date": "2026-06-03",
                "location": "Seoul",
                "max_seats": 20
            }),
            token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await
}
