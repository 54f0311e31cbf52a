// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod extraction;
pub mod version;
pub mod vision;

pub use api::{create_app, start_server, ApiError, AppState};
pub use config::AppConfig;
pub use extraction::{ExtractionError, TextExtractor};
pub use vision::ocr::{
    DetectedLine, Geometry, OcrError, OcrPipeline, PaddleOcrModel, PerImageResult,
    PerImageResults, PipelineConfig, PipelineInfo, RunOptions,
};
pub use vision::{ImageError, OcrModelManager, OnnxPipelineLoader, PipelineLoader, PixelGrid};
