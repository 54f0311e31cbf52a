// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use std::time::Instant;
use tracing::{debug, info};

use super::request::OcrUpload;
use super::response::OcrResponse;
use crate::api::errors::{ApiError, ErrorResponse};
use crate::api::http_server::AppState;

/// POST {root}/ocr - Extract text from an uploaded image
///
/// Accepts a multipart form whose `image` field holds the file. The text of
/// every recognised line is returned, top to bottom, joined by newlines.
///
/// # Errors
/// - 400 Bad Request: the upload is not declared as `image/*`, or the body is
///   not valid multipart
/// - 413 Payload Too Large: the file exceeds the upload limit
/// - 422 Unprocessable Entity: no `image` field, or the bytes are not a
///   decodable image
/// - 500 Internal Server Error: OCR inference failed
#[utoipa::path(
    post,
    path = "/ocr",
    tag = "ocr",
    operation_id = "ocr.extract",
    request_body(content_type = "multipart/form-data", content = String, description = "Image file in the `image` field"),
    responses(
        (status = 200, description = "Extracted text", body = OcrResponse),
        (status = 400, description = "Not an image", body = ErrorResponse),
        (status = 413, description = "Upload too large", body = ErrorResponse),
        (status = 422, description = "Missing field or undecodable image", body = ErrorResponse),
        (status = 500, description = "OCR failed"),
    )
)]
pub async fn ocr_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<OcrResponse>, ApiError> {
    let mut multipart = multipart
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid multipart body: {}", e)))?;

    let upload = OcrUpload::from_multipart(&mut multipart, state.max_upload_bytes).await?;
    upload.validate()?;

    debug!(
        "OCR upload '{}' ({}, {} bytes)",
        upload.filename(),
        upload.content_type.as_deref().unwrap_or("-"),
        upload.data.len()
    );

    let start = Instant::now();
    let filename = upload.filename().to_string();
    let text = state
        .extractor
        .extract_bytes(upload.data)
        .await
        .map_err(|e| ApiError::from_extraction(e, &filename))?;

    info!(
        "OCR complete for '{}': {} lines, {}ms",
        filename,
        text.lines().count(),
        start.elapsed().as_millis()
    );

    Ok(Json(OcrResponse::new(text)))
}
