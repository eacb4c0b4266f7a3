//! Shared helpers for HTTP-level integration tests.
//!
//! `build_test_app` mirrors the router construction in `main.rs` so tests
//! exercise the same middleware stack (CORS, request ID, timeout, tracing,
//! panic recovery) that production uses. Request helpers drive the router
//! directly through `tower::ServiceExt::oneshot`.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use cityline_api::auth::jwt::JwtConfig;
use cityline_api::auth::password::hash_password;
use cityline_api::config::{ServerConfig, SummaryConfig};
use cityline_api::routes;
use cityline_api::state::AppState;
use cityline_db::models::principal::{
    Admin, CreateAdmin, CreateTechnician, CreateUser, Technician, User,
};
use cityline_db::repositories::{AdminRepo, TechnicianRepo, UserRepo};
use cityline_services::geocode::GeocodeClient;
use cityline_services::storage::FileStore;

/// Plaintext password for every seeded principal.
pub const TEST_PASSWORD: &str = "test_password_123!";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout. The geocoding endpoint points at the
/// discard port, so map centers fall back instantly instead of waiting on
/// the network.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        upload_dir: std::env::temp_dir()
            .join("cityline-test-uploads")
            .to_string_lossy()
            .into_owned(),
        geocode_base_url: "http://127.0.0.1:9".to_string(),
        summary: SummaryConfig {
            api_base_url: "http://127.0.0.1:9".to_string(),
            model: "test-model".to_string(),
            api_key: None,
            refresh_interval_secs: 21600,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let geocoder = Arc::new(GeocodeClient::new(config.geocode_base_url.clone()));
    let file_store = Arc::new(FileStore::new(&config.upload_dir));

    let state = AppState {
        pool,
        config: Arc::new(config),
        geocoder,
        file_store,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request with no auth header.
pub async fn get(app: Router, path: &str) -> Response {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a GET request with a bearer token.
pub async fn get_auth(app: Router, path: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(path)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body and no auth header.
pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body and a bearer token.
pub async fn post_json_auth(
    app: Router,
    path: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a PUT request with a JSON body and a bearer token.
pub async fn put_json_auth(
    app: Router,
    path: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a DELETE request with a bearer token.
pub async fn delete_auth(app: Router, path: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(path)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Read a response body to completion and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read to completion");
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

// ---------------------------------------------------------------------------
// Multipart helpers
// ---------------------------------------------------------------------------

/// Boundary string used by [`multipart_body`].
const BOUNDARY: &str = "cityline-test-boundary";

/// Assemble a `multipart/form-data` body from text fields plus an optional
/// `image` file part.
pub fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some((filename, bytes)) = image {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Send a POST request with a multipart body and a bearer token.
pub async fn post_multipart_auth(app: Router, path: &str, body: Vec<u8>, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a PUT request with a multipart body and a bearer token.
pub async fn put_multipart_auth(app: Router, path: &str, body: Vec<u8>, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(path)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

// ---------------------------------------------------------------------------
// Seed and login helpers
// ---------------------------------------------------------------------------

/// Create a citizen directly in the database with [`TEST_PASSWORD`].
pub async fn seed_citizen(pool: &PgPool, name: &str, email: &str, city: &str) -> User {
    let input = CreateUser {
        name: name.to_string(),
        email: email.to_string(),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        phone: Some("555-0100".to_string()),
        city: city.to_string(),
    };
    UserRepo::create(pool, &input)
        .await
        .expect("citizen creation should succeed")
}

/// Create an admin directly in the database with [`TEST_PASSWORD`].
pub async fn seed_admin(
    pool: &PgPool,
    name: &str,
    email: &str,
    city: &str,
    department: &str,
) -> Admin {
    let input = CreateAdmin {
        name: name.to_string(),
        email: email.to_string(),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        city: city.to_string(),
        department: department.to_string(),
    };
    AdminRepo::create(pool, &input)
        .await
        .expect("admin creation should succeed")
}

/// Create a technician directly in the database with [`TEST_PASSWORD`].
pub async fn seed_technician(
    pool: &PgPool,
    name: &str,
    email: &str,
    city: &str,
    department: &str,
) -> Technician {
    let input = CreateTechnician {
        name: name.to_string(),
        email: email.to_string(),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        phone: Some("555-0101".to_string()),
        city: city.to_string(),
        department: department.to_string(),
    };
    TechnicianRepo::create(pool, &input)
        .await
        .expect("technician creation should succeed")
}

/// Log a principal in via the API and return the JSON auth response.
///
/// `path` is one of the three role login endpoints, e.g.
/// `/api/v1/auth/login/citizen`.
pub async fn login(app: Router, path: &str, email: &str) -> serde_json::Value {
    let body = serde_json::json!({ "email": email, "password": TEST_PASSWORD });
    let response = post_json(app, path, body).await;
    assert_eq!(
        response.status(),
        StatusCode::OK,
        "login at {path} should succeed"
    );
    body_json(response).await
}

/// Log in against a fresh router and return just the access token.
pub async fn login_token(pool: &PgPool, path: &str, email: &str) -> String {
    let json = login(build_test_app(pool.clone()), path, email).await;
    json["access_token"]
        .as_str()
        .expect("access_token should be a string")
        .to_string()
}
