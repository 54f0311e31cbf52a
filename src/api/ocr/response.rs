// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR response types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response from OCR processing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct OcrResponse {
    /// Recognised lines joined by `\n`, empty when nothing was found
    pub text: String,
}

impl OcrResponse {
    pub fn new(text: String) -> Self {
        Self { text }
    }
}
