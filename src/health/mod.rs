/*!
 * # Health Check Module
 *
 * - Basic health check (`/health`) - up/down based on a database ping
 * - Status (`/status`) - version, uptime and per-component details
 */

use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error};
use utoipa::ToSchema;

/// Basic health status
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
    Degraded,
}

impl HealthStatus {
    fn status_code(self) -> StatusCode {
        match self {
            HealthStatus::Up | HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Health check detail
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct HealthDetail {
    pub status: HealthStatus,
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Overall health information
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct HealthInfo {
    pub status: HealthStatus,
    pub version: String,
    pub environment: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub details: HashMap<String, HealthDetail>,
}

/// Basic liveness answer
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct HealthSummary {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

async fn database_detail(state: &AppState) -> HealthDetail {
    let (status, message) = match state.db.ping().await {
        Ok(()) => (HealthStatus::Up, None),
        Err(e) => {
            error!("Database health check failed: {}", e);
            (HealthStatus::Down, Some("database unreachable".to_string()))
        }
    };
    HealthDetail {
        status,
        message,
        timestamp: Utc::now(),
    }
}

fn overall(details: &HashMap<String, HealthDetail>) -> HealthStatus {
    if details.values().any(|d| d.status == HealthStatus::Down) {
        HealthStatus::Down
    } else if details.values().any(|d| d.status == HealthStatus::Degraded) {
        HealthStatus::Degraded
    } else {
        HealthStatus::Up
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service is up", body = HealthSummary),
        (status = 503, description = "Database unreachable", body = HealthSummary)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    debug!("Health check endpoint called");
    let status = database_detail(&state).await.status;

    (
        status.status_code(),
        Json(HealthSummary {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
        }),
    )
}

#[utoipa::path(
    get,
    path = "/api/v1/status",
    responses(
        (status = 200, description = "Detailed status", body = HealthInfo),
        (status = 503, description = "A component is down", body = HealthInfo)
    ),
    tag = "health"
)]
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let mut details = HashMap::new();
    details.insert("database".to_string(), database_detail(&state).await);
    let status = overall(&details);

    let info = HealthInfo {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        timestamp: Utc::now(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        details,
    };
    (status.status_code(), Json(info))
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(status))
}
