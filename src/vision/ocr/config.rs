// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the PaddleOCR pipeline

use std::path::PathBuf;

/// Detection model file name inside the model directory
pub const DET_MODEL_FILE: &str = "det_model.onnx";
/// Recognition model file name inside the model directory
pub const REC_MODEL_FILE: &str = "rec_model.onnx";
/// Angle classifier file name inside the model directory
pub const CLS_MODEL_FILE: &str = "cls_model.onnx";
/// Default character dictionary for the English recognition model
pub const DEFAULT_DICT_FILE: &str = "en_dict.txt";

/// Languages with a shipped recognition model
pub const SUPPORTED_LANGUAGES: &[&str] = &["en"];

/// DB post-processing parameters for text detection
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionParams {
    /// Longest side of the detection input, in pixels
    pub limit_side_len: u32,
    /// Probability above which a pixel counts as text
    pub db_thresh: f32,
    /// Minimum mean probability of a kept box
    pub box_thresh: f32,
    /// Box expansion factor
    pub unclip_ratio: f32,
    /// Maximum number of candidate regions per image
    pub max_candidates: usize,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            limit_side_len: 960,
            db_thresh: 0.3,
            box_thresh: 0.6,
            unclip_ratio: 1.5,
            max_candidates: 1000,
        }
    }
}

/// Everything needed to build a [`super::PaddleOcrModel`]
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Directory holding the ONNX models and the dictionary
    pub model_dir: PathBuf,
    /// Dictionary file name inside `model_dir`
    pub dict_file: String,
    /// Recognition language
    pub language: String,
    /// Load the text angle classifier
    pub use_angle_cls: bool,
    /// ONNX Runtime intra-op threads per session
    pub intra_threads: usize,
    pub detection: DetectionParams,
    /// Recognised lines scoring below this are dropped
    pub drop_score: f32,
    /// Classifier score needed to rotate a crop by 180 degrees
    pub cls_thresh: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("./models/paddleocr-onnx"),
            dict_file: DEFAULT_DICT_FILE.to_string(),
            language: "en".to_string(),
            use_angle_cls: false,
            intra_threads: 4,
            detection: DetectionParams::default(),
            drop_score: 0.5,
            cls_thresh: 0.9,
        }
    }
}

impl PipelineConfig {
    pub fn det_model_path(&self) -> PathBuf {
        self.model_dir.join(DET_MODEL_FILE)
    }

    pub fn rec_model_path(&self) -> PathBuf {
        self.model_dir.join(REC_MODEL_FILE)
    }

    pub fn cls_model_path(&self) -> PathBuf {
        self.model_dir.join(CLS_MODEL_FILE)
    }

    pub fn dict_path(&self) -> PathBuf {
        self.model_dir.join(&self.dict_file)
    }

    pub fn is_language_supported(&self) -> bool {
        SUPPORTED_LANGUAGES.contains(&self.language.to_lowercase().as_str())
    }
}
