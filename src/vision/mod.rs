// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based image analysis
//!
//! This module provides:
//! - Image decoding into pixel grids
//! - OCR (Optical Character Recognition) via PaddleOCR
//! - Lifecycle of the shared OCR pipeline

pub mod image_utils;
pub mod model_manager;
pub mod ocr;

pub use image_utils::{
    decode_image_bytes, decode_pixel_grid, detect_format, ImageError, ImageInfo, PixelGrid,
};
pub use model_manager::{OcrModelInfo, OcrModelManager, OnnxPipelineLoader, PipelineLoader};
