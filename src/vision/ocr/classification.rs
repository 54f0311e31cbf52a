// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text angle classifier
//!
//! Decides whether a cropped line is upside down.

use anyhow::{Context, Result};
use image::RgbImage;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

use super::preprocessing::preprocess_for_classification;
use super::session::{self, SharedSession};

/// Class index for "rotated 180 degrees"
const ROTATED_CLASS: usize = 1;

/// PaddleOCR text direction classifier (labels `0` and `180`)
#[derive(Clone)]
pub struct OcrClassificationModel {
    session: SharedSession,
    input_name: String,
    threshold: f32,
}

impl std::fmt::Debug for OcrClassificationModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrClassificationModel")
            .field("input_name", &self.input_name)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl OcrClassificationModel {
    pub async fn new<P: AsRef<Path>>(
        model_path: P,
        threshold: f32,
        intra_threads: usize,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            anyhow::bail!(
                "OCR angle classifier not found: {}",
                model_path.display()
            );
        }

        info!("Loading OCR angle classifier from {}", model_path.display());
        let session = session::load_cpu_session(model_path, intra_threads)?;
        let input_name = session::input_name(&session, "x");
        info!("✅ OCR angle classifier loaded (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            threshold,
        })
    }

    /// Returns true when the line should be rotated by 180 degrees
    pub fn is_upside_down(&self, line: &RgbImage) -> Result<bool> {
        let input = preprocess_for_classification(line);
        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let mut session = session::lock(&self.session)?;
        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Angle classification failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let probs: Vec<f32> = output_tensor.iter().copied().collect();
        Ok(decide_rotation(&probs, self.threshold))
    }
}

/// Rotate only when the 180 class wins with a score above `threshold`
pub fn decide_rotation(probs: &[f32], threshold: f32) -> bool {
    let best = probs
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    matches!(best, Some((ROTATED_CLASS, score)) if score > threshold)
}
