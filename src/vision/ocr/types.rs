// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Result types produced by the OCR pipeline

use serde::{Deserialize, Serialize};

/// Quadrilateral around a detected text line, in original image coordinates
///
/// Points run clockwise from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub points: [[f32; 2]; 4],
}

impl Geometry {
    /// Axis-aligned rectangle as a quadrilateral
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            points: [
                [x, y],
                [x + width, y],
                [x + width, y + height],
                [x, y + height],
            ],
        }
    }
}

/// A recognised line of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLine {
    pub geometry: Geometry,
    pub text: String,
    /// Recognition confidence (0.0-1.0)
    pub confidence: f32,
}

/// Output for one input image
///
/// A `None` entry means a text region was detected but nothing usable was
/// recognised in it. Consumers skip those entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerImageResult {
    pub lines: Vec<Option<DetectedLine>>,
}

impl PerImageResult {
    pub fn new(lines: Vec<Option<DetectedLine>>) -> Self {
        Self { lines }
    }

    /// Iterate over the lines that carry text
    pub fn recognized(&self) -> impl Iterator<Item = &DetectedLine> {
        self.lines.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.recognized().next().is_none()
    }
}

/// One [`PerImageResult`] per submitted image
pub type PerImageResults = Vec<PerImageResult>;

/// Stages to run for a single pipeline call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub detection: bool,
    pub recognition: bool,
    pub angle_classification: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            detection: true,
            recognition: true,
            angle_classification: false,
        }
    }
}
