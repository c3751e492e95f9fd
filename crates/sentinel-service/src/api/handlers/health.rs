//! Health handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub version: String,
    pub uptime: String,
    #[serde(rename = "aiEnabled")]
    pub ai_enabled: bool,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Server is running",
        version: state.version.clone(),
        uptime: state.uptime(),
        ai_enabled: state.scan.has_ai(),
    })
}
