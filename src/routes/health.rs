//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub entities: usize,
    pub risks: usize,
    pub governance_groups: usize,
    pub sessions: usize,
    pub classifier: String,
}

/// Liveness probe: always returns OK if the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe: reports catalog size and open analysis sessions.
pub async fn ready(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    ApiResponse::success(HealthStatus {
        status: "ok".to_string(),
        entities: state.catalog.entities().len(),
        risks: state.catalog.risks().len(),
        governance_groups: state.catalog.governance_groups().len(),
        sessions: state.sessions.len(),
        classifier: state.classifier.name().to_string(),
    })
}
