// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use super::docs;
use super::handlers::{health_handler, index_handler};
use super::ocr::ocr_handler;
use crate::config::AppConfig;
use crate::extraction::TextExtractor;
use crate::vision::ocr::{OcrPipeline, PipelineInfo};

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared request state
#[derive(Clone)]
pub struct AppState {
    pub extractor: TextExtractor,
    pub pipeline_info: PipelineInfo,
    /// Route prefix, empty or starting with `/`
    pub root_path: String,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(pipeline: Arc<dyn OcrPipeline>, config: &AppConfig) -> Self {
        Self {
            pipeline_info: pipeline.info(),
            extractor: TextExtractor::new(pipeline),
            root_path: config.root_path.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Absolute path of a route under the root path
    pub fn route_path(&self, suffix: &str) -> String {
        format!("{}{}", self.root_path, suffix)
    }
}

/// Build the router with every route mounted under the root path
pub fn create_app(state: AppState) -> Router {
    let mut app = Router::new()
        .route(&state.route_path("/"), get(index_handler))
        .route(&state.route_path("/ocr"), post(ocr_handler))
        .route(&state.route_path("/health"), get(health_handler))
        .route(&state.route_path("/openapi.json"), get(docs::openapi_json));

    // "/api" as well as "/api/"
    if !state.root_path.is_empty() {
        app = app.route(&state.root_path, get(index_handler));
    }

    let body_limit = state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);

    app.merge(docs::redoc_router(
        state.route_path("/docs"),
        &state.root_path,
    ))
    .layer(DefaultBodyLimit::max(body_limit))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state)
}

/// Bind and serve until `shutdown` resolves
pub async fn start_server<F>(config: &AppConfig, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context(format!("Invalid bind address {}:{}", config.host, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind {}", addr))?;

    info!(
        "OCR API listening on http://{} (docs at {}/docs)",
        addr, state.root_path
    );

    let app = create_app(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;

    info!("HTTP server stopped");
    Ok(())
}
