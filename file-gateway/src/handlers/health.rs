use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub storage: ServiceStatus,
}

/// GET /health
///
/// Always 200; a broken backend shows up as `degraded` in the body.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let storage_ready = state.files.storage_healthy().await;

    Json(HealthResponse {
        status: if storage_ready {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Degraded
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        storage: if storage_ready {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Unhealthy
        },
    })
}
