// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! The OCR capability as seen by the rest of the service

use serde::Serialize;
use utoipa::ToSchema;

use super::error::OcrError;
use super::types::{PerImageResults, RunOptions};
use crate::vision::image_utils::PixelGrid;

/// Static description of a loaded pipeline
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PipelineInfo {
    pub language: String,
    pub angle_classification: bool,
}

/// A configured OCR pipeline
///
/// Implementations are shared across requests through an `Arc`, so `run`
/// takes `&self` and must be safe to call from several threads at once.
#[cfg_attr(test, mockall::automock)]
pub trait OcrPipeline: Send + Sync {
    /// Run the pipeline on one image
    ///
    /// Returns one [`super::PerImageResult`] per input image, lines in
    /// reading order.
    fn run(&self, image: &PixelGrid, options: RunOptions) -> Result<PerImageResults, OcrError>;

    fn info(&self) -> PipelineInfo;
}
