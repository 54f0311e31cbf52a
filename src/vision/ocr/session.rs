// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX Runtime session setup shared by the OCR models

use anyhow::{Context, Result};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Session behind a mutex
///
/// `Session::run` takes `&mut self`, so concurrent requests take turns on
/// each model.
pub type SharedSession = Arc<Mutex<Session>>;

/// Load an ONNX model with CPU-only execution
pub fn load_cpu_session(model_path: &Path, intra_threads: usize) -> Result<Session> {
    Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CPUExecutionProvider::default().build()])
        .context("Failed to set CPU execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(intra_threads)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path)
        .context(format!("Failed to load ONNX model from {}", model_path.display()))
}

/// First input name of a session, or `fallback`
pub fn input_name(session: &Session, fallback: &str) -> String {
    session
        .inputs
        .first()
        .map(|input| input.name.clone())
        .unwrap_or_else(|| fallback.to_string())
}

/// Lock a shared session for one inference call
pub fn lock(session: &SharedSession) -> Result<MutexGuard<'_, Session>> {
    session
        .lock()
        .map_err(|_| anyhow::anyhow!("ONNX session lock poisoned"))
}
