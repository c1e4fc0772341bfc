#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use catalog_api::{auth::ADMIN_ROLE, build_router, config::AppConfig, db, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

/// Helper harness for spinning up the full application over an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    token: String,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        // A single connection keeps every query on the same in-memory database.
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            "admin".to_string(),
            ADMIN_PASSWORD.to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let token = state
            .auth
            .issue_token("admin", vec![ADMIN_ROLE.to_string()])
            .expect("issue admin token")
            .access_token;
        let router = build_router(state.clone(), CorsLayer::permissive());

        Self {
            router,
            state,
            token,
        }
    }

    /// Access the bearer token for the admin user.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Convenience helper for authenticated JSON requests.
    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response {
        self.request(method, uri, body, Some(self.token())).await
    }

    /// Unauthenticated GET returning status and parsed body.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let response = self.request(Method::GET, uri, None, None).await;
        let status = response.status();
        (status, response_json(response).await)
    }

    /// Authenticated request returning status and parsed body (`Null` for empty bodies).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.request_authenticated(method, uri, body).await;
        let status = response.status();
        (status, response_json(response).await)
    }

    /// Creates a product and returns its JSON representation.
    pub async fn create_product(&self, body: Value) -> Value {
        let (status, product) = self
            .send(Method::POST, "/api/v1/products", Some(body))
            .await;
        assert_eq!(
            status,
            StatusCode::CREATED,
            "create product failed: {product}"
        );
        product
    }

    /// Creates a product expanded into color variants and returns the created group.
    pub async fn create_with_variants(&self, body: Value) -> Vec<Value> {
        let (status, products) = self
            .send(Method::POST, "/api/v1/products/with-variants", Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "expansion failed: {products}");
        products.as_array().cloned().expect("array of products")
    }

    /// All products in catalog order.
    pub async fn list_products(&self) -> Vec<Value> {
        let (status, products) = self.get_json("/api/v1/products").await;
        assert_eq!(status, StatusCode::OK);
        products.as_array().cloned().expect("array of products")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("json response")
}

/// A chair in red, blue and white, the shape most tests start from.
pub fn chair_with_variants() -> Value {
    json!({
        "name": "Garden Chair",
        "name_tr": "Bahçe Sandalyesi",
        "sku": "CHAIR",
        "category": "garden",
        "material": "pp",
        "weight": 2.5,
        "dimensions": { "width": 45, "height": 80, "depth": 50 },
        "color_variants": [
            { "color_id": "red", "color_name": "Red", "hex": "#D32F2F" },
            { "color_id": "blue", "color_name": "Blue", "hex": "#1976d2" },
            { "color_id": "white", "color_name": "White" }
        ]
    })
}

pub fn ids(products: &[Value]) -> Vec<String> {
    products
        .iter()
        .map(|p| p["id"].as_str().expect("id").to_string())
        .collect()
}
