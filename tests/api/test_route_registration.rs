// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Route registration tests
//!
//! These tests verify that:
//! - Every route is mounted under the configured root path
//! - The root path answers with and without a trailing slash
//! - Health, OpenAPI and ReDoc routes are served
//! - Wrong methods and paths outside the root are rejected

use crate::common::*;
use axum::http::{header, StatusCode};
use ocr_api::config::AppConfig;
use serde_json::json;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

fn stub() -> Arc<StubPipeline> {
    Arc::new(StubPipeline::new(vec![line("ROUTED", 0.0)]))
}

#[cfg(test)]
mod route_registration_tests {
    use super::*;

    /// Test 1: Welcome payload at the root path with trailing slash
    #[tokio::test]
    async fn test_welcome_with_trailing_slash() {
        let response = app(stub()).oneshot(get_request("/api/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"Welcome to the OCR API!": "Check out documentation at /api/docs"})
        );
    }

    /// Test 2: Welcome payload at the bare root path
    #[tokio::test]
    async fn test_welcome_without_trailing_slash() {
        let response = app(stub()).oneshot(get_request("/api")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await["Welcome to the OCR API!"],
            "Check out documentation at /api/docs"
        );
    }

    /// Test 3: Health reports the loaded pipeline
    #[tokio::test]
    async fn test_health() {
        let response = app(stub())
            .oneshot(get_request("/api/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], ocr_api::version::VERSION_NUMBER);
        assert_eq!(body["pipeline"]["language"], "en");
        assert_eq!(body["pipeline"]["angle_classification"], false);
    }

    /// Test 4: OpenAPI document lists the OCR route under the root server
    #[tokio::test]
    async fn test_openapi_json() {
        let response = app(stub())
            .oneshot(get_request("/api/openapi.json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let doc = body_json(response).await;
        assert!(doc["paths"]["/ocr"]["post"].is_object());
        assert_eq!(doc["servers"][0]["url"], "/api");
    }

    /// Test 5: ReDoc UI is served as HTML
    #[tokio::test]
    async fn test_docs_page() {
        let response = app(stub()).oneshot(get_request("/api/docs")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("text/html"));
    }

    /// Test 6: GET on the OCR route is not allowed
    #[tokio::test]
    async fn test_ocr_rejects_get() {
        let response = app(stub()).oneshot(get_request("/api/ocr")).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    /// Test 7: Routes outside the root path do not exist
    #[tokio::test]
    async fn test_routes_outside_root_not_found() {
        let response = app(stub())
            .oneshot(upload_request(
                "/ocr",
                Some("scan.png"),
                Some("image/png"),
                &tiny_png(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    /// Test 8: An empty root path mounts everything at `/`
    #[tokio::test]
    async fn test_empty_root_path() {
        let config = AppConfig {
            root_path: String::new(),
            ..Default::default()
        };

        let welcome = app_with(stub(), &config)
            .oneshot(get_request("/"))
            .await
            .unwrap();
        assert_eq!(
            body_json(welcome).await["Welcome to the OCR API!"],
            "Check out documentation at /docs"
        );

        let ocr = app_with(stub(), &config)
            .oneshot(upload_request(
                "/ocr",
                Some("scan.png"),
                Some("image/png"),
                &tiny_png(),
            ))
            .await
            .unwrap();
        assert_eq!(ocr.status(), StatusCode::OK);
        assert_eq!(body_json(ocr).await["text"], "ROUTED");
    }

    /// Test 9: A custom root path moves every route
    #[tokio::test]
    async fn test_custom_root_path() {
        let config = AppConfig {
            root_path: "/v2/text".to_string(),
            ..Default::default()
        };

        let response = app_with(stub(), &config)
            .oneshot(get_request("/v2/text/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app_with(stub(), &config)
            .oneshot(get_request("/api/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
