// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the OCR API

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-paddleocr-onnx-2025-11-04";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-11-04";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "multipart-upload",
    "paddleocr-detection",
    "paddleocr-recognition",
    "angle-classification",
    "openapi-docs",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("OCR API {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}
