//! Contract analysis handler

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use sentinel_core::ScanOutcome;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: ScanOutcome,
}

/// Scan contract source with the rule table and, when configured, the AI provider
pub async fn analyze_contract(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let Json(request) = payload?;
    let code = request
        .code
        .ok_or_else(|| ApiError::Validation("Contract code is required".to_string()))?;

    let outcome = state.scan.scan(&code).await?;

    Ok(Json(AnalyzeResponse {
        success: true,
        outcome,
    }))
}
