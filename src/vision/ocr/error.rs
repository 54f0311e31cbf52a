// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for the OCR pipeline

use thiserror::Error;

/// Errors raised while loading or running the OCR pipeline
#[derive(Error, Debug)]
pub enum OcrError {
    /// A required model or dictionary file is missing
    #[error("OCR model file not found: {0}")]
    ModelNotFound(String),

    /// ONNX Runtime could not load a model
    #[error("Failed to load OCR model: {0}")]
    ModelLoad(String),

    /// Only English models are shipped
    #[error("Unsupported OCR language '{0}' (supported: en)")]
    UnsupportedLanguage(String),

    /// The models failed while running
    #[error("OCR inference failed: {0}")]
    Inference(String),
}

impl OcrError {
    /// Wrap an `anyhow` chain from the model code
    pub fn inference(err: anyhow::Error) -> Self {
        OcrError::Inference(format!("{:#}", err))
    }
}
