// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! OCR endpoint tests for POST {root}/ocr
//!
//! These tests drive the full router with a stub pipeline and verify that
//! the endpoint:
//! - Rejects uploads not declared as images
//! - Returns recognised lines joined in pipeline order
//! - Maps decode, size and inference failures to the right status codes
//! - Shares one pipeline instance across concurrent requests

use crate::common::*;
use axum::http::StatusCode;
use futures::future::join_all;
use ocr_api::{config::AppConfig, OcrModelManager, PipelineConfig};
use serde_json::json;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

const OCR_URI: &str = "/api/ocr";

#[cfg(test)]
mod ocr_endpoint_tests {
    use super::*;

    // =============================================================================
    // Upload Validation Tests
    // =============================================================================

    /// Test 1: Non-image content type is rejected with the file name
    #[tokio::test]
    async fn test_non_image_rejected() {
        let pipeline = Arc::new(StubPipeline::new(vec![line("SHOULD NOT RUN", 0.0)]));
        let app = app(pipeline.clone());

        let response = app
            .oneshot(upload_request(
                OCR_URI,
                Some("notes.txt"),
                Some("text/plain"),
                b"hello",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "File 'notes.txt' is not an image."})
        );
        assert_eq!(pipeline.calls(), 0, "Pipeline must not run for non-images");
    }

    /// Test 2: Missing content type counts as not an image
    #[tokio::test]
    async fn test_missing_content_type_rejected() {
        let pipeline = Arc::new(StubPipeline::new(vec![]));
        let response = app(pipeline)
            .oneshot(upload_request(OCR_URI, Some("scan.png"), None, &tiny_png()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["detail"],
            "File 'scan.png' is not an image."
        );
    }

    /// Test 3: Missing `image` field gives 422
    #[tokio::test]
    async fn test_missing_image_field() {
        let pipeline = Arc::new(StubPipeline::new(vec![]));
        let body = multipart_body("file", Some("scan.png"), Some("image/png"), &tiny_png());

        let response = app(pipeline)
            .oneshot(multipart_request(OCR_URI, body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "Field 'image' is required."})
        );
    }

    /// Test 4: A body that is not multipart is a bad request
    #[tokio::test]
    async fn test_non_multipart_body_rejected() {
        let pipeline = Arc::new(StubPipeline::new(vec![]));
        let request = axum::http::Request::builder()
            .method("POST")
            .uri(OCR_URI)
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{}"))
            .unwrap();

        let response = app(pipeline).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // =============================================================================
    // Extraction Tests
    // =============================================================================

    /// Test 5: Single line image
    #[tokio::test]
    async fn test_single_line() {
        let pipeline = Arc::new(StubPipeline::new(vec![line("HELLO WORLD", 10.0)]));
        let response = app(pipeline.clone())
            .oneshot(upload_request(
                OCR_URI,
                Some("hello.png"),
                Some("image/png"),
                &tiny_png(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"text": "HELLO WORLD"}));
        assert_eq!(pipeline.calls(), 1);
        assert_eq!(*pipeline.last_dims.lock().unwrap(), Some((1, 1)));
    }

    /// Test 6: Image without text gives an empty string
    #[tokio::test]
    async fn test_blank_image_empty_text() {
        let pipeline = Arc::new(StubPipeline::new(vec![]));
        let response = app(pipeline)
            .oneshot(upload_request(
                OCR_URI,
                Some("blank.png"),
                Some("image/png"),
                &tiny_png(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"text": ""}));
    }

    /// Test 7: Multiple lines keep the pipeline's top-to-bottom order
    #[tokio::test]
    async fn test_three_lines_in_order() {
        let pipeline = Arc::new(StubPipeline::new(vec![
            line("Invoice 42", 10.0),
            line("Total: 12.50", 40.0),
            line("Thank you", 70.0),
        ]));
        let response = app(pipeline)
            .oneshot(upload_request(
                OCR_URI,
                Some("receipt.png"),
                Some("image/png"),
                &tiny_png(),
            ))
            .await
            .unwrap();

        assert_eq!(
            body_json(response).await["text"],
            "Invoice 42\nTotal: 12.50\nThank you"
        );
    }

    /// Test 8: Regions without recognised text are skipped
    #[tokio::test]
    async fn test_absent_lines_skipped() {
        let pipeline = Arc::new(StubPipeline::new(vec![
            None,
            line("first", 10.0),
            None,
            line("second", 40.0),
        ]));
        let response = app(pipeline)
            .oneshot(upload_request(
                OCR_URI,
                Some("sparse.png"),
                Some("image/png"),
                &tiny_png(),
            ))
            .await
            .unwrap();

        assert_eq!(body_json(response).await["text"], "first\nsecond");
    }

    /// Test 9: GIF uploads are decoded too
    #[tokio::test]
    async fn test_gif_upload() {
        let pipeline = Arc::new(StubPipeline::new(vec![line("GIF", 0.0)]));
        let response = app(pipeline)
            .oneshot(upload_request(
                OCR_URI,
                Some("tiny.gif"),
                Some("image/gif"),
                &tiny_gif(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["text"], "GIF");
    }

    /// Test 10: The same upload twice gives the same answer
    #[tokio::test]
    async fn test_repeated_requests_identical() {
        let pipeline = Arc::new(StubPipeline::new(vec![line("STABLE", 0.0)]));
        let app = app(pipeline.clone());

        let mut bodies = Vec::new();
        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(upload_request(
                    OCR_URI,
                    Some("same.png"),
                    Some("image/png"),
                    &tiny_png(),
                ))
                .await
                .unwrap();
            bodies.push(body_json(response).await);
        }

        assert_eq!(bodies[0], bodies[1]);
        assert_eq!(pipeline.calls(), 2);
    }

    // =============================================================================
    // Error Mapping Tests
    // =============================================================================

    /// Test 11: Undecodable bytes declared as an image give 422
    #[tokio::test]
    async fn test_undecodable_image() {
        let pipeline = Arc::new(StubPipeline::new(vec![]));
        let response = app(pipeline.clone())
            .oneshot(upload_request(
                OCR_URI,
                Some("broken.png"),
                Some("image/png"),
                b"definitely not a png",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Could not decode image 'broken.png': "));
        assert_eq!(pipeline.calls(), 0);
    }

    /// Test 12: Uploads over the limit give 413
    #[tokio::test]
    async fn test_oversize_upload() {
        let pipeline = Arc::new(StubPipeline::new(vec![]));
        let config = AppConfig {
            max_upload_bytes: 1024,
            ..Default::default()
        };

        let response = app_with(pipeline.clone(), &config)
            .oneshot(upload_request(
                OCR_URI,
                Some("huge.png"),
                Some("image/png"),
                &vec![0u8; 4096],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(pipeline.calls(), 0);
    }

    /// Test 13: Pipeline failure gives an unstructured 500
    #[tokio::test]
    async fn test_inference_failure() {
        let response = app(Arc::new(FailingPipeline))
            .oneshot(upload_request(
                OCR_URI,
                Some("scan.png"),
                Some("image/png"),
                &tiny_png(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_bytes(response).await;
        assert_eq!(String::from_utf8(body).unwrap(), "Internal Server Error");
    }

    // =============================================================================
    // Concurrency Tests
    // =============================================================================

    /// Test 14: Concurrent requests share one pipeline built exactly once
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pipeline_built_once_under_concurrency() {
        const REQUESTS: usize = 16;

        let stub = Arc::new(StubPipeline::new(vec![line("SHARED", 0.0)]));
        let loader = CountingLoader::new(stub.clone());
        let manager = OcrModelManager::initialize(&loader, &PipelineConfig::default())
            .await
            .expect("stub loader never fails");

        let app = app(manager.pipeline());
        let requests = (0..REQUESTS).map(|i| {
            let app = app.clone();
            let name = format!("scan-{}.png", i);
            async move {
                let response = app
                    .oneshot(upload_request(
                        OCR_URI,
                        Some(name.as_str()),
                        Some("image/png"),
                        &tiny_png(),
                    ))
                    .await
                    .unwrap();
                (response.status(), body_json(response).await)
            }
        });

        let results = join_all(requests).await;

        for (status, body) in results {
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["text"], "SHARED");
        }
        assert_eq!(loader.loads(), 1, "Pipeline must be constructed once");
        assert_eq!(stub.calls(), REQUESTS);
    }
}
