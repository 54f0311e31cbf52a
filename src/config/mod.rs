// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration

use crate::cli::Cli;
use crate::vision::image_utils::MAX_IMAGE_SIZE;
use crate::vision::ocr::{DetectionParams, PipelineConfig};

/// Configuration for the OCR API service
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Route prefix, empty or `/segment` without a trailing slash
    pub root_path: String,
    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,
    pub pipeline: PipelineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            root_path: "/api".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            pipeline: PipelineConfig::default(),
        }
    }
}

impl From<Cli> for AppConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            root_path: cli.root_path,
            max_upload_bytes: cli.max_upload_bytes,
            pipeline: PipelineConfig {
                model_dir: cli.model_dir,
                dict_file: cli.dict_file,
                language: cli.language,
                use_angle_cls: cli.use_angle_cls,
                intra_threads: cli.intra_threads,
                detection: DetectionParams {
                    db_thresh: cli.det_db_thresh,
                    box_thresh: cli.det_db_box_thresh,
                    unclip_ratio: cli.det_db_unclip_ratio,
                    ..Default::default()
                },
                drop_score: cli.drop_score,
                ..Default::default()
            },
        }
    }
}

impl AppConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("API port must be greater than 0".to_string());
        }
        if !self.root_path.is_empty()
            && (!self.root_path.starts_with('/') || self.root_path.ends_with('/'))
        {
            return Err(format!(
                "Root path '{}' must start with '/' and must not end with '/'",
                self.root_path
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err("Max upload size must be greater than 0".to_string());
        }
        if self.max_upload_bytes > MAX_IMAGE_SIZE {
            return Err(format!(
                "Max upload size {} exceeds the decoder limit of {} bytes",
                self.max_upload_bytes, MAX_IMAGE_SIZE
            ));
        }

        let detection = &self.pipeline.detection;
        for (name, value) in [
            ("det_db_thresh", detection.db_thresh),
            ("det_db_box_thresh", detection.box_thresh),
            ("drop_score", self.pipeline.drop_score),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be within [0, 1], got {}", name, value));
            }
        }
        if detection.unclip_ratio <= 0.0 {
            return Err("det_db_unclip_ratio must be greater than 0".to_string());
        }
        if self.pipeline.intra_threads == 0 {
            return Err("Intra-op thread count must be greater than 0".to_string());
        }
        Ok(())
    }
}
