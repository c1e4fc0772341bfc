//! Catalog API Library
//!
//! Bilingual plastics product catalog: products with color-variant groups,
//! reference data, showroom tour and a small back office.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::HeaderValue,
    middleware::Next,
    routing::get,
    Router,
};
use std::{sync::Arc, time::Instant};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};

use crate::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db::DbPool,
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: AppConfig,
    pub auth: Arc<AuthService>,
    pub services: handlers::AppServices,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, config: AppConfig) -> Self {
        let auth = Arc::new(AuthService::new(AuthConfig::from(&config)));
        Self {
            services: handlers::AppServices::new(db.clone()),
            db,
            config,
            auth,
            started_at: Instant::now(),
        }
    }
}

/// Everything served under `/api/v1`. Reads of the public catalog are open;
/// every mutation sits behind the admin role.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::products::product_routes())
        .merge(handlers::reference::reference_routes())
        .merge(handlers::showroom::showroom_routes())
        .merge(handlers::customers::customer_routes())
        .merge(handlers::auth::auth_routes())
        .merge(health::health_routes())
}

/// CORS from configuration: explicit origins first, then the permissive fallback
/// allowed in development or by explicit opt-in.
pub fn build_cors_layer(cfg: &AppConfig) -> Result<CorsLayer, config::AppConfigError> {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        let layer = CorsLayer::new().allow_origin(origins).allow_methods(Any);
        // Credentials cannot be combined with wildcard headers.
        return Ok(if cfg.cors_allow_credentials {
            layer
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                ])
                .allow_credentials(true)
        } else {
            layer.allow_headers(Any)
        });
    }

    if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        return Ok(CorsLayer::permissive());
    }

    ::tracing::error!("Missing CORS configuration detected; set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true");
    let mut errors = validator::ValidationErrors::new();
    errors.add(
        "cors_allowed_origins",
        validator::ValidationError::new("cors_allowed_origins_required"),
    );
    Err(config::AppConfigError::Validation(errors))
}

async fn inject_auth_service(
    State(auth): State<Arc<AuthService>>,
    mut req: Request,
    next: Next,
) -> axum::response::Response {
    req.extensions_mut().insert(auth);
    next.run(req).await
}

/// Full application: `/api/v1`, Swagger UI and the shared middleware stack.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let body_limit = state.config.max_body_size;
    let auth_service = state.auth.clone();

    Router::<AppState>::new()
        .route("/", get(|| async { "catalog-api up" }))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .layer(DefaultBodyLimit::max(body_limit))
        // HTTP tracing layer for consistent request/response telemetry
        .layer(tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        // Inject AuthService into request extensions for auth middleware
        .layer(axum::middleware::from_fn_with_state(
            auth_service,
            inject_auth_service,
        ))
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(environment: &str) -> AppConfig {
        AppConfig::new(
            "sqlite::memory:".into(),
            "0123456789abcdef0123456789abcdef".into(),
            "admin".into(),
            "correct-horse".into(),
            "127.0.0.1".into(),
            8080,
            environment.into(),
        )
    }

    #[test]
    fn production_without_origins_is_rejected() {
        assert!(build_cors_layer(&config("production")).is_err());
    }

    #[test]
    fn explicit_origins_or_development_build_a_layer() {
        assert!(build_cors_layer(&config("development")).is_ok());

        let mut cfg = config("production");
        cfg.cors_allowed_origins = Some("https://catalog.example.com, ".into());
        cfg.cors_allow_credentials = true;
        assert!(build_cors_layer(&cfg).is_ok());
    }
}
