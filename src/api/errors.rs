// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::extraction::ExtractionError;

/// Body of every structured error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The client sent something the endpoint refuses (400)
    ClientValidation(String),
    /// A required multipart field is absent (422)
    MissingField(String),
    /// The upload claims to be an image but cannot be decoded (422)
    UnprocessableImage { filename: String, reason: String },
    /// The upload exceeds the configured limit (413)
    PayloadTooLarge { limit: usize },
    /// Malformed request body (400)
    InvalidRequest(String),
    /// Anything that is the server's fault (500)
    Internal(String),
}

impl ApiError {
    pub fn not_an_image(filename: &str) -> Self {
        ApiError::ClientValidation(format!("File '{}' is not an image.", filename))
    }

    /// Map an extraction failure for the upload named `filename`
    pub fn from_extraction(err: ExtractionError, filename: &str) -> Self {
        match err {
            ExtractionError::Decode(e) => ApiError::UnprocessableImage {
                filename: filename.to_string(),
                reason: e.to_string(),
            },
            ExtractionError::Inference(e) => ApiError::Internal(e.to_string()),
            ExtractionError::Task(msg) => ApiError::Internal(msg),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let detail = match self {
            ApiError::ClientValidation(msg) | ApiError::InvalidRequest(msg) => msg.clone(),
            ApiError::MissingField(field) => format!("Field '{}' is required.", field),
            ApiError::UnprocessableImage { filename, reason } => {
                format!("Could not decode image '{}': {}", filename, reason)
            }
            ApiError::PayloadTooLarge { limit } => {
                format!("Upload exceeds the maximum size of {} bytes.", limit)
            }
            ApiError::Internal(_) => "Internal Server Error".to_string(),
        };
        ErrorResponse { detail }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ClientValidation(_) | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingField(_) | ApiError::UnprocessableImage { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ClientValidation(msg) => write!(f, "Validation error: {}", msg),
            ApiError::MissingField(field) => write!(f, "Missing field: {}", field),
            ApiError::UnprocessableImage { filename, reason } => {
                write!(f, "Undecodable image '{}': {}", filename, reason)
            }
            ApiError::PayloadTooLarge { limit } => {
                write!(f, "Payload larger than {} bytes", limit)
            }
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::Internal(cause) => {
                error!("Request failed: {}", cause);
                (status, "Internal Server Error").into_response()
            }
            _ => {
                debug!("Request rejected ({}): {}", status.as_u16(), self);
                (status, Json(self.to_response())).into_response()
            }
        }
    }
}
