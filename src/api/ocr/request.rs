// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR upload parsing and validation

use axum::http::StatusCode;
use axum_extra::extract::multipart::{Multipart, MultipartError};
use bytes::Bytes;
use tracing::debug;

use crate::api::errors::ApiError;

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image";

/// An uploaded file, kept for one request
#[derive(Debug, Clone)]
pub struct OcrUpload {
    /// Client-supplied file name
    pub file_name: Option<String>,
    /// Declared content type of the part
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl OcrUpload {
    /// Read the `image` field out of a multipart body
    ///
    /// Other fields are ignored.
    pub async fn from_multipart(
        multipart: &mut Multipart,
        max_bytes: usize,
    ) -> Result<Self, ApiError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?
        {
            if field.name() != Some(IMAGE_FIELD) {
                debug!("Ignoring multipart field {:?}", field.name());
                continue;
            }

            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| multipart_error(e, max_bytes))?;

            if data.len() > max_bytes {
                return Err(ApiError::PayloadTooLarge { limit: max_bytes });
            }

            return Ok(Self {
                file_name,
                content_type,
                data,
            });
        }

        Err(ApiError::MissingField(IMAGE_FIELD.to_string()))
    }

    /// File name for messages, empty when the client sent none
    pub fn filename(&self) -> &str {
        self.file_name.as_deref().unwrap_or("")
    }

    /// The declared content type must be `image/*`
    pub fn validate(&self) -> Result<(), ApiError> {
        let is_image = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"));

        if !is_image {
            return Err(ApiError::not_an_image(self.filename()));
        }
        Ok(())
    }
}

fn multipart_error(err: MultipartError, max_bytes: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::PayloadTooLarge { limit: max_bytes };
    }
    ApiError::InvalidRequest(format!("Invalid multipart body: {}", err.body_text()))
}
