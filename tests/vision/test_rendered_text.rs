// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Rendered text tests against the real PaddleOCR models
//!
//! These tests verify that the full detect -> sort -> crop -> recognize path:
//! - Reads a single rendered line exactly
//! - Returns stacked lines top to bottom, one per output line
//!
//! Fixtures are black block-letter text on white, under `tests/fixtures/`.

use ocr_api::{OcrPipeline, PaddleOcrModel, PipelineConfig, RunOptions, TextExtractor};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

// Model path (downloaded by download scripts)
const OCR_MODEL_DIR: &str = "/workspace/models/paddleocr-onnx";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

async fn load_model() -> PaddleOcrModel {
    let config = PipelineConfig {
        model_dir: OCR_MODEL_DIR.into(),
        ..Default::default()
    };
    PaddleOcrModel::load(&config)
        .await
        .expect("Models should load")
}

/// Run the model on a fixture and flatten the recognised lines
fn read_fixture(model: &PaddleOcrModel, name: &str) -> String {
    let mut file = File::open(fixture(name)).expect("fixture should exist");
    let grid = TextExtractor::decode(&mut file).expect("fixture should decode");

    let results = model
        .run(&grid, RunOptions::default())
        .expect("Inference should succeed");
    assert_eq!(results.len(), 1);

    let lines: Vec<String> = results[0]
        .recognized()
        .map(|line| line.text.clone())
        .collect();
    TextExtractor::flatten(&lines)
}

#[cfg(test)]
mod rendered_text_tests {
    use super::*;

    /// Test 1: Single line reads back exactly
    #[tokio::test]
    #[ignore] // Only run if model files are downloaded
    async fn test_hello_world_line() {
        let model = load_model().await;

        let text = read_fixture(&model, "hello_world.png");
        assert_eq!(text, "HELLO WORLD");
    }

    /// Test 2: Three stacked lines come back top to bottom
    #[tokio::test]
    #[ignore] // Only run if model files are downloaded
    async fn test_three_lines_top_to_bottom() {
        let model = load_model().await;

        let text = read_fixture(&model, "three_lines.png");
        let lines: Vec<&str> = text.split('\n').collect();

        assert_eq!(lines.len(), 3, "Expected three lines, got {:?}", text);
        assert!(lines[0].to_uppercase().contains("INVOICE"), "line 1: {}", lines[0]);
        assert!(lines[1].to_uppercase().contains("TOTAL"), "line 2: {}", lines[1]);
        assert!(lines[2].to_uppercase().contains("THANK"), "line 3: {}", lines[2]);
    }

    /// Test 3: The extractor gives the same text as the direct pipeline call
    #[tokio::test]
    #[ignore] // Only run if model files are downloaded
    async fn test_extractor_matches_pipeline() {
        let model = Arc::new(load_model().await);
        let expected = read_fixture(&model, "three_lines.png");

        let extractor = TextExtractor::new(model);
        let mut file = File::open(fixture("three_lines.png")).unwrap();
        let text = extractor.extract(&mut file).expect("Extraction should succeed");

        assert_eq!(text, expected);
    }
}
