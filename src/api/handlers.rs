// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::http_server::AppState;
use crate::version;
use crate::vision::ocr::PipelineInfo;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub pipeline: PipelineInfo,
}

/// Welcome payload served at the root path
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WelcomeResponse {
    #[serde(rename = "Welcome to the OCR API!")]
    pub welcome: String,
}

impl WelcomeResponse {
    /// The documentation link follows the configured root path, so the
    /// default `/api` root gives `Check out documentation at /api/docs`.
    pub fn new(root_path: &str) -> Self {
        Self {
            welcome: format!("Check out documentation at {}/docs", root_path),
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    tag = "meta",
    operation_id = "index",
    responses(
        (status = 200, description = "Welcome message", body = WelcomeResponse),
    )
)]
pub async fn index_handler(State(state): State<AppState>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse::new(&state.root_path))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "meta",
    operation_id = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: version::VERSION_NUMBER.to_string(),
        pipeline: state.pipeline_info.clone(),
    })
}
