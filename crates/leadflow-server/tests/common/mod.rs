//! Shared setup for the HTTP tests: an in-memory store, the seeded
//! accounts and a router built from test configuration.

#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use leadflow_db::{DbConfig, DbManager, SeedConfig, run_migrations, seed_default_users};
use leadflow_server::{AppState, ServerConfig, build_router, user_repository};
use serde_json::Value;
use tower::ServiceExt;

pub const HO: &str = "ho_admin";
pub const DA: &str = "da_agent";
pub const PASSWORD: &str = "1234";
pub const DA_EMAIL: &str = "Agent@Dealer.example";

pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig {
        database: DbConfig {
            url: "mem://".into(),
            ..DbConfig::default()
        },
        bootstrap: SeedConfig {
            head_office_email: Some("ho@leadflow.example".into()),
            dealer_agent_email: Some(DA_EMAIL.into()),
            ..SeedConfig::default()
        },
        ..ServerConfig::default()
    };
    config.auth.jwt_secret = "http-test-secret".into();
    config
}

pub async fn app() -> Router {
    app_with(test_config()).await
}

pub async fn app_with(config: ServerConfig) -> Router {
    let manager = DbManager::connect(&config.database).await.unwrap();
    let db = manager.client().clone();
    run_migrations(&db).await.unwrap();
    seed_default_users(&user_repository(db.clone(), &config), &config.bootstrap)
        .await
        .unwrap();
    build_router(AppState::new(db, &config), &config)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn read_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn delete(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = send(
        app,
        json_request(
            "POST",
            "/auth/login",
            None,
            &serde_json::json!({ "username": username, "password": password }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    body["data"]["token"].as_str().unwrap().to_string()
}
