// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR model manager
//!
//! Builds the OCR pipeline once at startup and hands out a shared handle.

use async_trait::async_trait;
use std::sync::Arc;

use crate::vision::ocr::{OcrError, OcrPipeline, PaddleOcrModel, PipelineConfig, PipelineInfo};

/// Builds an OCR pipeline from its configuration
#[async_trait]
pub trait PipelineLoader: Send + Sync {
    async fn load(&self, config: &PipelineConfig) -> Result<Arc<dyn OcrPipeline>, OcrError>;
}

/// Production loader backed by ONNX Runtime
#[derive(Debug, Default, Clone, Copy)]
pub struct OnnxPipelineLoader;

#[async_trait]
impl PipelineLoader for OnnxPipelineLoader {
    async fn load(&self, config: &PipelineConfig) -> Result<Arc<dyn OcrPipeline>, OcrError> {
        let model = PaddleOcrModel::load(config).await?;
        Ok(Arc::new(model))
    }
}

/// Information about the loaded OCR model
#[derive(Debug, Clone)]
pub struct OcrModelInfo {
    /// Model name
    pub name: String,
    pub model_dir: String,
    pub pipeline: PipelineInfo,
}

/// Owner of the process-wide OCR pipeline
///
/// Loading failures are fatal: the service does not start without a
/// pipeline.
pub struct OcrModelManager {
    pipeline: Arc<dyn OcrPipeline>,
    model_dir: String,
}

impl OcrModelManager {
    /// Load the pipeline through `loader`, exactly once
    pub async fn initialize(
        loader: &dyn PipelineLoader,
        config: &PipelineConfig,
    ) -> Result<Self, OcrError> {
        let model_dir = config.model_dir.display().to_string();
        match loader.load(config).await {
            Ok(pipeline) => {
                tracing::info!("✅ PaddleOCR pipeline loaded from {}", model_dir);
                Ok(Self {
                    pipeline,
                    model_dir,
                })
            }
            Err(e) => {
                tracing::error!("❌ Failed to load OCR pipeline from {}: {}", model_dir, e);
                Err(e)
            }
        }
    }

    /// Shared handle to the pipeline
    pub fn pipeline(&self) -> Arc<dyn OcrPipeline> {
        Arc::clone(&self.pipeline)
    }

    pub fn model_info(&self) -> OcrModelInfo {
        OcrModelInfo {
            name: "paddleocr".to_string(),
            model_dir: self.model_dir.clone(),
            pipeline: self.pipeline.info(),
        }
    }
}
