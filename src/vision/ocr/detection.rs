// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text detection model
//!
//! Runs the DB (differentiable binarization) detector and turns its
//! probability map into text boxes in original image coordinates, sorted
//! top-to-bottom then left-to-right.

use anyhow::{Context, Result};
use image::RgbImage;
use ndarray::{ArrayView2, ArrayViewD, Axis, Ix2};
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::config::DetectionParams;
use super::preprocessing::{preprocess_for_detection, DetResizeInfo};
use super::session::{self, SharedSession};
use super::types::Geometry;

/// Boxes whose shorter side is below this are noise
const MIN_BOX_SIDE: f32 = 3.0;

/// Boxes whose tops differ by less than this are on the same line
const SAME_LINE_TOLERANCE: f32 = 10.0;

/// A detected text box with location and confidence
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    /// X coordinate of top-left corner
    pub x: f32,
    /// Y coordinate of top-left corner
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Mean text probability inside the box (0.0-1.0)
    pub confidence: f32,
}

impl TextBox {
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn to_geometry(&self) -> Geometry {
        Geometry::from_rect(self.x, self.y, self.width, self.height)
    }

    /// Map a box from detection input space back to the original image
    fn to_original(&self, info: &DetResizeInfo) -> TextBox {
        let (x0, y0) = info.map_to_original(self.x, self.y);
        let (x1, y1) = info.map_to_original(self.x + self.width, self.y + self.height);
        TextBox {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
            confidence: self.confidence,
        }
    }
}

/// PaddleOCR text detection model
///
/// Runs on CPU through ONNX Runtime.
#[derive(Clone)]
pub struct OcrDetectionModel {
    session: SharedSession,
    input_name: String,
    params: DetectionParams,
}

impl std::fmt::Debug for OcrDetectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrDetectionModel")
            .field("input_name", &self.input_name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl OcrDetectionModel {
    /// Load the OCR detection model from a file
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    pub async fn new<P: AsRef<Path>>(
        model_path: P,
        params: DetectionParams,
        intra_threads: usize,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("OCR detection model not found: {}", model_path.display());
        }

        info!("Loading OCR detection model from {}", model_path.display());

        let session = session::load_cpu_session(model_path, intra_threads)?;
        let input_name = session::input_name(&session, "x");

        if let Some(input) = session.inputs.first() {
            debug!("Detection model input shape: {:?}", input.input_type);
        }

        info!("✅ OCR detection model loaded (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            params,
        })
    }

    /// Detect text boxes in an image
    ///
    /// Boxes are returned in original image coordinates, in reading order.
    pub fn detect(&self, image: &RgbImage) -> Result<Vec<TextBox>> {
        let (input, resize_info) = preprocess_for_detection(image, self.params.limit_side_len);
        debug!(
            "Detection input {:?} for {}x{} image",
            input.shape(),
            resize_info.original_width,
            resize_info.original_height
        );

        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let boxes = {
            let mut session = session::lock(&self.session)?;
            let outputs = session
                .run(ort::inputs![&self.input_name => input_value])
                .context("Detection inference failed")?;

            let output_tensor = outputs[0]
                .try_extract_array::<f32>()
                .context("Failed to extract output tensor")?;

            let prob_map = probability_map(output_tensor.view())?;
            extract_boxes(prob_map, &self.params)
        };

        let mut boxes: Vec<TextBox> = boxes
            .iter()
            .map(|b| b.to_original(&resize_info))
            .filter(|b| b.width >= 1.0 && b.height >= 1.0)
            .collect();
        sort_boxes(&mut boxes);

        debug!("Detected {} text regions", boxes.len());
        Ok(boxes)
    }
}

/// Reduce the detector output to a 2-D probability map
///
/// Accepts `[1, 1, H, W]`, `[1, H, W]` or `[H, W]`.
pub fn probability_map(output: ArrayViewD<'_, f32>) -> Result<ArrayView2<'_, f32>> {
    let map = match output.ndim() {
        4 => output.index_axis_move(Axis(0), 0).index_axis_move(Axis(0), 0),
        3 => output.index_axis_move(Axis(0), 0),
        2 => output,
        _ => anyhow::bail!("Unexpected detection output shape: {:?}", output.shape()),
    };
    map.into_dimensionality::<Ix2>()
        .context("Detection output is not a probability map")
}

/// DB post-processing: binarize, group into components, score and unclip
///
/// Boxes are in probability map coordinates and are not sorted.
pub fn extract_boxes(prob: ArrayView2<'_, f32>, params: &DetectionParams) -> Vec<TextBox> {
    let (height, width) = prob.dim();
    let mut visited = vec![false; height * width];
    let mut boxes = Vec::new();
    let mut candidates = 0usize;

    for y in 0..height {
        for x in 0..width {
            if visited[y * width + x] || prob[[y, x]] <= params.db_thresh {
                continue;
            }

            let region = flood_fill(&prob, &mut visited, x, y, params.db_thresh);
            candidates += 1;
            if candidates > params.max_candidates {
                return boxes;
            }

            let box_w = (region.max_x - region.min_x + 1) as f32;
            let box_h = (region.max_y - region.min_y + 1) as f32;
            if box_w.min(box_h) < MIN_BOX_SIDE {
                continue;
            }

            let score = box_score(&prob, &region);
            if score < params.box_thresh {
                continue;
            }

            let unclipped = unclip(
                TextBox {
                    x: region.min_x as f32,
                    y: region.min_y as f32,
                    width: box_w,
                    height: box_h,
                    confidence: score,
                },
                params.unclip_ratio,
                width as f32,
                height as f32,
            );

            if unclipped.width.min(unclipped.height) < MIN_BOX_SIDE + 2.0 {
                continue;
            }
            boxes.push(unclipped);
        }
    }

    boxes
}

/// Pixel bounds of a connected text region
#[derive(Debug, Clone, Copy)]
struct Region {
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
}

/// 8-connected flood fill over pixels above the threshold
fn flood_fill(
    prob: &ArrayView2<'_, f32>,
    visited: &mut [bool],
    start_x: usize,
    start_y: usize,
    threshold: f32,
) -> Region {
    let (height, width) = prob.dim();
    let mut region = Region {
        min_x: start_x,
        max_x: start_x,
        min_y: start_y,
        max_y: start_y,
    };

    let mut stack = vec![(start_x, start_y)];
    visited[start_y * width + start_x] = true;

    while let Some((x, y)) = stack.pop() {
        region.min_x = region.min_x.min(x);
        region.max_x = region.max_x.max(x);
        region.min_y = region.min_y.min(y);
        region.max_y = region.max_y.max(y);

        let y_range = y.saturating_sub(1)..=(y + 1).min(height - 1);
        for ny in y_range {
            let x_range = x.saturating_sub(1)..=(x + 1).min(width - 1);
            for nx in x_range {
                let idx = ny * width + nx;
                if !visited[idx] && prob[[ny, nx]] > threshold {
                    visited[idx] = true;
                    stack.push((nx, ny));
                }
            }
        }
    }

    region
}

/// Mean probability over the region's bounding box
fn box_score(prob: &ArrayView2<'_, f32>, region: &Region) -> f32 {
    let window = prob.slice(ndarray::s![
        region.min_y..=region.max_y,
        region.min_x..=region.max_x
    ]);
    window.mean().unwrap_or(0.0)
}

/// Grow a box by `area * ratio / perimeter` on every side, clamped to bounds
pub fn unclip(text_box: TextBox, ratio: f32, max_x: f32, max_y: f32) -> TextBox {
    let perimeter = 2.0 * (text_box.width + text_box.height);
    let distance = if perimeter > 0.0 {
        text_box.area() * ratio / perimeter
    } else {
        0.0
    };

    let x0 = (text_box.x - distance).max(0.0);
    let y0 = (text_box.y - distance).max(0.0);
    let x1 = (text_box.x + text_box.width + distance).min(max_x);
    let y1 = (text_box.y + text_box.height + distance).min(max_y);

    TextBox {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
        confidence: text_box.confidence,
    }
}

/// Sort boxes top-to-bottom, left-to-right
///
/// Boxes whose tops are within a few pixels count as one line and are
/// ordered by x.
pub fn sort_boxes(boxes: &mut [TextBox]) {
    boxes.sort_by(|a, b| {
        a.y.partial_cmp(&b.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    for i in 0..boxes.len().saturating_sub(1) {
        for j in (0..=i).rev() {
            let same_line = (boxes[j + 1].y - boxes[j].y).abs() < SAME_LINE_TOLERANCE;
            if same_line && boxes[j + 1].x < boxes[j].x {
                boxes.swap(j, j + 1);
            } else {
                break;
            }
        }
    }
}
