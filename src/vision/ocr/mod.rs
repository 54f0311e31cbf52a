// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR integration for text extraction from images
//!
//! This module provides CPU-based OCR using PaddleOCR ONNX models.
//!
//! Components:
//! - `detection` - Text region detection (DB)
//! - `classification` - Optional 180 degree text angle classifier
//! - `recognition` - Text recognition from detected regions
//! - `preprocessing` - Image preprocessing for models
//! - `model` - Combined OCR pipeline
//! - `pipeline` - The `OcrPipeline` trait the service depends on

pub mod classification;
pub mod config;
pub mod detection;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod preprocessing;
pub mod recognition;
mod session;
pub mod types;

pub use classification::OcrClassificationModel;
pub use config::{DetectionParams, PipelineConfig};
pub use detection::{OcrDetectionModel, TextBox};
pub use error::OcrError;
pub use model::PaddleOcrModel;
pub use pipeline::{OcrPipeline, PipelineInfo};
pub use recognition::{OcrRecognitionModel, RecognizedText};
pub use types::{DetectedLine, Geometry, PerImageResult, PerImageResults, RunOptions};

#[cfg(test)]
pub use pipeline::MockOcrPipeline;
