//! Integration tests for admin login and the route guard.

mod common;

use axum::http::{Method, StatusCode};
use catalog_api::auth::{AuthConfig, AuthService};
use common::{response_json, TestApp, ADMIN_PASSWORD};
use rstest::rstest;
use serde_json::{json, Value};
use std::time::Duration;

#[tokio::test]
async fn login_returns_a_usable_token() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({ "username": "admin", "password": ADMIN_PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);

    let token = body["access_token"].as_str().unwrap();
    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "name": "Via login" })),
            Some(token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({ "username": "admin", "password": "guess" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["details"], "AUTH_INVALID_CREDENTIALS");
}

#[rstest]
#[case(Method::POST, "/api/v1/products", Some(json!({ "name": "x" })))]
#[case(Method::POST, "/api/v1/products/with-variants", Some(json!({ "name": "x" })))]
#[case(Method::PUT, "/api/v1/products/reorder/bulk", Some(json!({ "ordered_ids": [] })))]
#[case(Method::PUT, "/api/v1/products/sync-group/g", Some(json!({ "sync_fields": {} })))]
#[case(
    Method::DELETE,
    "/api/v1/products/00000000-0000-0000-0000-000000000000",
    None
)]
#[case(Method::POST, "/api/v1/categories/reset", None)]
#[case(Method::PUT, "/api/v1/colors/reorder/bulk", Some(json!({ "ordered_ids": [] })))]
#[case(Method::POST, "/api/v1/showroom/nodes", Some(json!({ "title": "x" })))]
#[tokio::test]
async fn mutations_without_token_are_unauthorized(
    #[case] method: Method,
    #[case] uri: &str,
    #[case] body: Option<Value>,
) {
    let app = TestApp::new().await;
    let response = app.request(method, uri, body, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case("not-a-jwt")]
#[case("")]
#[tokio::test]
async fn malformed_tokens_are_rejected(#[case] token: &str) {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "name": "x" })),
            Some(token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let app = TestApp::new().await;
    let forger = AuthService::new(AuthConfig {
        jwt_secret: "another_secret_key_that_is_long_enough_123".into(),
        jwt_issuer: app.state.auth.config.jwt_issuer.clone(),
        access_token_expiration: Duration::from_secs(600),
        admin_username: "admin".into(),
        admin_password: "irrelevant".into(),
    });
    let forged = forger
        .issue_token("admin", vec!["admin".into()])
        .unwrap()
        .access_token;

    let response = app
        .request(
            Method::POST,
            "/api/v1/categories/reset",
            None,
            Some(&forged),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_without_admin_role_is_forbidden() {
    let app = TestApp::new().await;
    let token = app
        .state
        .auth
        .issue_token("viewer", Vec::new())
        .unwrap()
        .access_token;

    let response = app
        .request(Method::POST, "/api/v1/colors/reset", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn public_reads_need_no_token() {
    let app = TestApp::new().await;
    for uri in [
        "/api/v1/products",
        "/api/v1/categories",
        "/api/v1/materials",
        "/api/v1/colors",
        "/api/v1/showroom/nodes",
        "/api/v1/health",
        "/api/v1/status",
    ] {
        let (status, _) = app.get_json(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn status_reports_database_and_version() {
    let app = TestApp::new().await;
    let (status, body) = app.get_json("/api/v1/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");
    assert_eq!(body["details"]["database"]["status"], "up");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;
    let (status, doc) = app.get_json("/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/v1/products/sync-group/{group_id}"].is_object());
}
