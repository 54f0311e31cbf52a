// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text extraction: decode an uploaded image, run OCR, join the lines

use bytes::Bytes;
use std::io::{Cursor, Read, Seek};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::vision::image_utils::{decode_pixel_grid, ImageError, PixelGrid};
use crate::vision::ocr::{OcrError, OcrPipeline, RunOptions};

/// Errors from [`TextExtractor`]
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The upload is not a decodable image
    #[error(transparent)]
    Decode(#[from] ImageError),

    /// The OCR pipeline failed
    #[error(transparent)]
    Inference(#[from] OcrError),

    /// The blocking OCR task panicked or was cancelled
    #[error("OCR task failed: {0}")]
    Task(String),
}

/// Adapter between uploaded bytes and the shared OCR pipeline
#[derive(Clone)]
pub struct TextExtractor {
    pipeline: Arc<dyn OcrPipeline>,
}

impl TextExtractor {
    pub fn new(pipeline: Arc<dyn OcrPipeline>) -> Self {
        Self { pipeline }
    }

    /// Decode an image stream into a pixel grid
    ///
    /// The stream is left at the position it was in before the call.
    pub fn decode<R: Read + Seek>(reader: &mut R) -> Result<PixelGrid, ExtractionError> {
        Ok(decode_pixel_grid(reader)?)
    }

    /// Run English detection + recognition and keep the text of each line
    pub fn infer(&self, grid: &PixelGrid) -> Result<Vec<String>, ExtractionError> {
        let results = self.pipeline.run(grid, RunOptions::default())?;

        let lines: Vec<String> = results
            .iter()
            .flat_map(|result| result.recognized())
            .map(|line| line.text.clone())
            .collect();

        debug!("OCR recognized {} lines", lines.len());
        Ok(lines)
    }

    /// Join lines with newlines, keeping their order
    pub fn flatten(lines: &[String]) -> String {
        lines.join("\n")
    }

    /// decode -> infer -> flatten
    pub fn extract<R: Read + Seek>(&self, reader: &mut R) -> Result<String, ExtractionError> {
        let grid = Self::decode(reader)?;
        let lines = self.infer(&grid)?;
        Ok(Self::flatten(&lines))
    }

    /// [`Self::extract`] on the blocking thread pool
    pub async fn extract_bytes(&self, data: Bytes) -> Result<String, ExtractionError> {
        let extractor = self.clone();
        tokio::task::spawn_blocking(move || extractor.extract(&mut Cursor::new(data)))
            .await
            .map_err(|e| ExtractionError::Task(e.to_string()))?
    }
}
