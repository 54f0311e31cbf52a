// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text recognition model
//!
//! Reads the text of one cropped line with a CRNN model and greedy CTC
//! decoding against a character dictionary.

use anyhow::{Context, Result};
use image::RgbImage;
use ndarray::{ArrayView2, ArrayViewD, Axis, Ix2};
use ort::value::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::preprocessing::preprocess_for_recognition;
use super::session::{self, SharedSession};

/// Recognized text with confidence score
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    /// The recognized text content
    pub text: String,
    /// Mean of the per-character maxima (0.0-1.0), 0.0 when nothing decoded
    pub confidence: f32,
}

impl RecognizedText {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }

    /// Check if the text is empty or whitespace only
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// PaddleOCR text recognition model
#[derive(Clone)]
pub struct OcrRecognitionModel {
    session: SharedSession,
    /// Index 0 is the CTC blank
    dictionary: Arc<Vec<String>>,
    input_name: String,
}

impl std::fmt::Debug for OcrRecognitionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrRecognitionModel")
            .field("dictionary_size", &self.dictionary.len())
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl OcrRecognitionModel {
    /// Load the OCR recognition model and its character dictionary
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - Dictionary file not found or unreadable
    /// - ONNX Runtime initialization fails
    pub async fn new<P: AsRef<Path>, D: AsRef<Path>>(
        model_path: P,
        dict_path: D,
        intra_threads: usize,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        let dict_path = dict_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("OCR recognition model not found: {}", model_path.display());
        }
        if !dict_path.exists() {
            anyhow::bail!(
                "OCR character dictionary not found: {}",
                dict_path.display()
            );
        }

        info!(
            "Loading OCR recognition model from {}",
            model_path.display()
        );

        let dictionary = load_dictionary(dict_path)?;
        info!(
            "Loaded character dictionary with {} entries",
            dictionary.len()
        );

        let session = session::load_cpu_session(model_path, intra_threads)?;
        let input_name = session::input_name(&session, "x");

        info!("✅ OCR recognition model loaded (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            dictionary: Arc::new(dictionary),
            input_name,
        })
    }

    /// Number of classes including the blank and the trailing space
    pub fn dictionary_size(&self) -> usize {
        self.dictionary.len()
    }

    /// Recognize the text of a cropped line
    pub fn recognize(&self, line: &RgbImage) -> Result<RecognizedText> {
        let input = preprocess_for_recognition(line);
        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let mut session = session::lock(&self.session)?;
        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Recognition inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;
        debug!("Recognition output shape: {:?}", output_tensor.shape());

        let probs = sequence_probabilities(output_tensor.view())?;
        Ok(ctc_decode(probs, &self.dictionary))
    }
}

/// Load a character dictionary, one entry per line
///
/// The returned table has the CTC blank at index 0 and a space appended
/// after the file's entries.
pub fn load_dictionary<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file =
        File::open(path).context(format!("Failed to open dictionary: {}", path.display()))?;

    let mut dictionary = vec![String::new()];
    for line in BufReader::new(file).lines() {
        let line = line.context("Failed to read dictionary line")?;
        dictionary.push(line.trim_end_matches('\r').to_string());
    }
    dictionary.push(" ".to_string());

    Ok(dictionary)
}

/// Reduce the recognizer output to `[seq_len, num_classes]`
pub fn sequence_probabilities(output: ArrayViewD<'_, f32>) -> Result<ArrayView2<'_, f32>> {
    let probs = match output.ndim() {
        3 => output.index_axis_move(Axis(0), 0),
        2 => output,
        _ => anyhow::bail!("Unexpected recognition output shape: {:?}", output.shape()),
    };
    probs
        .into_dimensionality::<Ix2>()
        .context("Recognition output is not a sequence")
}

/// CTC greedy (best path) decoding
///
/// Takes the arg-max class per timestep, collapses repeats and removes
/// blanks. Classes outside the dictionary are skipped.
pub fn ctc_decode(probs: ArrayView2<'_, f32>, dictionary: &[String]) -> RecognizedText {
    let mut text = String::new();
    let mut scores = Vec::new();
    let mut prev_index: Option<usize> = None;

    for step in probs.outer_iter() {
        let (max_index, max_prob) = step.iter().copied().enumerate().fold(
            (0usize, f32::NEG_INFINITY),
            |best, (i, p)| if p > best.1 { (i, p) } else { best },
        );

        let repeated = prev_index == Some(max_index);
        prev_index = Some(max_index);

        if max_index == 0 || repeated {
            continue;
        }
        if let Some(token) = dictionary.get(max_index) {
            text.push_str(token);
            scores.push(max_prob);
        }
    }

    let confidence = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f32>() / scores.len() as f32
    };

    RecognizedText { text, confidence }
}
