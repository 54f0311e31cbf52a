// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OpenAPI document and ReDoc UI

use axum::{extract::State, Json, Router};
use utoipa::openapi::server::Server;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::errors::ErrorResponse;
use super::handlers;
use super::http_server::AppState;
use super::ocr;
use crate::vision::ocr::PipelineInfo;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OCR API",
        description = "Extract text from uploaded images with PaddleOCR.",
    ),
    paths(
        handlers::index_handler,
        handlers::health_handler,
        ocr::handler::ocr_handler,
    ),
    components(schemas(
        ErrorResponse,
        handlers::WelcomeResponse,
        handlers::HealthResponse,
        PipelineInfo,
        ocr::OcrResponse,
    )),
    tags(
        (name = "meta", description = "Welcome and health"),
        (name = "ocr", description = "Text extraction"),
    ),
)]
pub struct ApiDoc;

/// OpenAPI document with the root path as its server
pub fn api_doc(root_path: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.version = crate::version::VERSION_NUMBER.to_string();
    if !root_path.is_empty() {
        doc.servers = Some(vec![Server::new(root_path)]);
    }
    doc
}

pub async fn openapi_json(State(state): State<AppState>) -> Json<utoipa::openapi::OpenApi> {
    Json(api_doc(&state.root_path))
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>(path: String, root_path: &str) -> Router<S> {
    Redoc::with_url(path, api_doc(root_path)).into()
}
