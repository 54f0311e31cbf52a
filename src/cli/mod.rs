// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// OCR API server
///
/// Every option can also be set through its environment variable or a
/// `.env` file.
#[derive(Parser, Debug, Clone)]
#[command(name = "ocr-api")]
#[command(version)]
#[command(about = "HTTP API that extracts text from images with PaddleOCR", long_about = None)]
pub struct Cli {
    /// Address to bind
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "API_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Prefix for every route (empty for none)
    #[arg(long, env = "API_ROOT_PATH", default_value = "/api")]
    pub root_path: String,

    /// Largest accepted upload, in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// Directory with det_model.onnx, rec_model.onnx and the dictionary
    #[arg(long, env = "OCR_MODEL_PATH", default_value = "./models/paddleocr-onnx")]
    pub model_dir: PathBuf,

    /// Character dictionary file name inside the model directory
    #[arg(long, env = "OCR_DICT_FILE", default_value = "en_dict.txt")]
    pub dict_file: String,

    /// Recognition language
    #[arg(long, env = "OCR_LANGUAGE", default_value = "en")]
    pub language: String,

    /// Load the text angle classifier (cls_model.onnx)
    #[arg(
        long,
        env = "OCR_USE_ANGLE_CLS",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub use_angle_cls: bool,

    /// ONNX Runtime intra-op threads per model
    #[arg(long, env = "OCR_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    /// Text probability threshold for the detection mask
    #[arg(long, env = "OCR_DET_DB_THRESH", default_value_t = 0.3)]
    pub det_db_thresh: f32,

    /// Minimum mean probability of a detected box
    #[arg(long, env = "OCR_DET_DB_BOX_THRESH", default_value_t = 0.6)]
    pub det_db_box_thresh: f32,

    /// Expansion factor for detected boxes
    #[arg(long, env = "OCR_DET_DB_UNCLIP_RATIO", default_value_t = 1.5)]
    pub det_db_unclip_ratio: f32,

    /// Recognised lines scoring below this are dropped
    #[arg(long, env = "OCR_DROP_SCORE", default_value_t = 0.5)]
    pub drop_score: f32,
}
