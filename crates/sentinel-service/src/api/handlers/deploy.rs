//! Contract deployment handler

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use sentinel_core::{DeploymentReceipt, Network};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct DeployRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeployResponse {
    pub success: bool,
    #[serde(flatten)]
    pub receipt: DeploymentReceipt,
}

/// Submit a compiled module to the requested network
pub async fn deploy_contract(
    State(state): State<AppState>,
    payload: Result<Json<DeployRequest>, JsonRejection>,
) -> ApiResult<Json<DeployResponse>> {
    let Json(request) = payload?;
    let code = request
        .code
        .ok_or_else(|| ApiError::Validation("Contract code is required".to_string()))?;

    let network = match request.network.as_deref() {
        Some(name) => name.parse::<Network>()?,
        None => state.default_network,
    };

    let receipt = state.deploy.deploy(code.as_bytes(), network).await?;

    Ok(Json(DeployResponse {
        success: true,
        receipt,
    }))
}
