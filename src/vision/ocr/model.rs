// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR pipeline: detection, optional angle classification, recognition

use anyhow::Result;
use image::{imageops, RgbImage};
use std::time::Instant;
use tracing::{debug, info};

use super::classification::OcrClassificationModel;
use super::config::PipelineConfig;
use super::detection::{OcrDetectionModel, TextBox};
use super::error::OcrError;
use super::pipeline::{OcrPipeline, PipelineInfo};
use super::recognition::{OcrRecognitionModel, RecognizedText};
use super::types::{DetectedLine, PerImageResult, PerImageResults, RunOptions};
use crate::vision::image_utils::PixelGrid;

/// Crops at least this much taller than wide are read as vertical text
const VERTICAL_ASPECT: f32 = 1.5;

/// PaddleOCR model for text extraction
///
/// Combines the detection, recognition and (optionally) angle classification
/// sessions. Runs on CPU.
#[derive(Debug)]
pub struct PaddleOcrModel {
    detector: OcrDetectionModel,
    recognizer: OcrRecognitionModel,
    classifier: Option<OcrClassificationModel>,
    language: String,
    drop_score: f32,
}

impl PaddleOcrModel {
    /// Load PaddleOCR models from the configured directory
    ///
    /// Expected files:
    /// - det_model.onnx (text detection)
    /// - rec_model.onnx (text recognition)
    /// - the character dictionary (en_dict.txt by default)
    /// - cls_model.onnx (only with angle classification)
    pub async fn load(config: &PipelineConfig) -> Result<Self, OcrError> {
        if !config.is_language_supported() {
            return Err(OcrError::UnsupportedLanguage(config.language.clone()));
        }

        let mut required = vec![
            config.det_model_path(),
            config.rec_model_path(),
            config.dict_path(),
        ];
        if config.use_angle_cls {
            required.push(config.cls_model_path());
        }
        if let Some(missing) = required.iter().find(|path| !path.exists()) {
            return Err(OcrError::ModelNotFound(missing.display().to_string()));
        }

        info!(
            "Loading PaddleOCR models from {} (language: {}, angle classification: {})",
            config.model_dir.display(),
            config.language,
            config.use_angle_cls
        );

        let detector = OcrDetectionModel::new(
            config.det_model_path(),
            config.detection.clone(),
            config.intra_threads,
        )
        .await
        .map_err(load_error)?;

        let recognizer = OcrRecognitionModel::new(
            config.rec_model_path(),
            config.dict_path(),
            config.intra_threads,
        )
        .await
        .map_err(load_error)?;

        let classifier = if config.use_angle_cls {
            Some(
                OcrClassificationModel::new(
                    config.cls_model_path(),
                    config.cls_thresh,
                    config.intra_threads,
                )
                .await
                .map_err(load_error)?,
            )
        } else {
            None
        };

        Ok(Self {
            detector,
            recognizer,
            classifier,
            language: config.language.to_lowercase(),
            drop_score: config.drop_score,
        })
    }

    /// Run the stages selected by `options` on one RGB image
    pub fn process(&self, image: &RgbImage, options: RunOptions) -> Result<PerImageResult> {
        let (width, height) = image.dimensions();

        let boxes = if options.detection {
            self.detector.detect(image)?
        } else {
            vec![TextBox {
                x: 0.0,
                y: 0.0,
                width: width as f32,
                height: height as f32,
                confidence: 1.0,
            }]
        };

        if !options.recognition {
            let lines = boxes
                .iter()
                .map(|text_box| {
                    Some(DetectedLine {
                        geometry: text_box.to_geometry(),
                        text: String::new(),
                        confidence: text_box.confidence,
                    })
                })
                .collect();
            return Ok(PerImageResult::new(lines));
        }

        let classifier = match (&self.classifier, options.angle_classification) {
            (Some(classifier), true) => Some(classifier),
            (None, true) => {
                debug!("Angle classification requested but no classifier is loaded");
                None
            }
            _ => None,
        };

        let mut lines = Vec::with_capacity(boxes.len());
        for text_box in &boxes {
            let mut crop = crop_line(image, text_box);
            if let Some(classifier) = classifier {
                if classifier.is_upside_down(&crop)? {
                    crop = imageops::rotate180(&crop);
                }
            }

            let recognized = self.recognizer.recognize(&crop)?;
            lines.push(accept_line(text_box, recognized, self.drop_score));
        }

        Ok(PerImageResult::new(lines))
    }
}

impl OcrPipeline for PaddleOcrModel {
    fn run(&self, image: &PixelGrid, options: RunOptions) -> Result<PerImageResults, OcrError> {
        let start = Instant::now();
        let rgb = image.to_rgb_image();

        let result = self.process(&rgb, options).map_err(OcrError::inference)?;

        debug!(
            "OCR processed {}x{} image: {} regions, {} recognized in {}ms",
            rgb.width(),
            rgb.height(),
            result.lines.len(),
            result.recognized().count(),
            start.elapsed().as_millis()
        );
        if result.is_empty() {
            debug!("No text recognized");
        }

        Ok(vec![result])
    }

    fn info(&self) -> PipelineInfo {
        PipelineInfo {
            language: self.language.clone(),
            angle_classification: self.classifier.is_some(),
        }
    }
}

fn load_error(err: anyhow::Error) -> OcrError {
    OcrError::ModelLoad(format!("{:#}", err))
}

/// Cut a text box out of the image
///
/// The box is clamped to the image. Tall crops are rotated 90 degrees
/// counter-clockwise so the text runs left to right.
pub fn crop_line(image: &RgbImage, text_box: &TextBox) -> RgbImage {
    let (img_w, img_h) = image.dimensions();

    let x = (text_box.x.max(0.0).floor() as u32).min(img_w.saturating_sub(1));
    let y = (text_box.y.max(0.0).floor() as u32).min(img_h.saturating_sub(1));
    let w = (text_box.width.ceil().max(1.0) as u32).min(img_w - x);
    let h = (text_box.height.ceil().max(1.0) as u32).min(img_h - y);

    let crop = imageops::crop_imm(image, x, y, w, h).to_image();
    if h as f32 / w as f32 >= VERTICAL_ASPECT {
        imageops::rotate270(&crop)
    } else {
        crop
    }
}

/// Keep a recognised line only if it has text scoring at least `drop_score`
pub fn accept_line(
    text_box: &TextBox,
    recognized: RecognizedText,
    drop_score: f32,
) -> Option<DetectedLine> {
    if recognized.is_empty() || recognized.confidence < drop_score {
        return None;
    }
    Some(DetectedLine {
        geometry: text_box.to_geometry(),
        text: recognized.text,
        confidence: recognized.confidence,
    })
}
