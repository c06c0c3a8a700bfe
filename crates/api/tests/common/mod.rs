#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use dropdeck_api::config::ServerConfig;
use dropdeck_api::router::build_app_router;
use dropdeck_api::state::AppState;
use dropdeck_core::types::DbId;

/// Test `ServerConfig` matching the development defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        db_max_connections: 5,
    }
}

/// The production router and middleware stack over the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

pub async fn new_user(pool: &PgPool, name: &str) -> DbId {
    let row: (DbId,) =
        sqlx::query_as("INSERT INTO users (username, email) VALUES ($1, $2) RETURNING id")
            .bind(name)
            .bind(format!("{name}@example.com"))
            .fetch_one(pool)
            .await
            .unwrap();
    row.0
}

pub async fn new_drop(pool: &PgPool, user_id: DbId) -> DbId {
    let row: (DbId,) = sqlx::query_as(
        "INSERT INTO drops (user_id, url, title) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(user_id)
    .bind("https://example.com/post")
    .bind("A post")
    .fetch_one(pool)
    .await
    .unwrap();
    row.0
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    user_id: Option<DbId>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header("x-user-id", user_id.to_string());
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

pub async fn get(app: Router, uri: &str, user_id: DbId) -> Response<Body> {
    send(app, Method::GET, uri, Some(user_id), None).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    user_id: DbId,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(user_id), Some(body)).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    user_id: DbId,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(user_id), Some(body)).await
}

pub async fn delete(app: Router, uri: &str, user_id: DbId) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(user_id), None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The `data` member of a `{ "data": ... }` envelope.
pub async fn data(response: Response<Body>) -> serde_json::Value {
    let mut json = body_json(response).await;
    json["data"].take()
}
