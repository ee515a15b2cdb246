// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Index page, health, version and unknown routes

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use text_extraction_toolkit::api::{create_router, AppState};
use text_extraction_toolkit::{TextExtractor, ToolkitConfig};
use tower::ServiceExt;

use crate::common::{FixedDetector, StubOcr};

fn router(ocr: StubOcr) -> Router {
    let config = ToolkitConfig::default();
    let extractor = TextExtractor::new(Arc::new(FixedDetector { boxes: vec![] }), Arc::new(ocr), config.clone());
    create_router(AppState::new(extractor, config))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_index_serves_upload_page() {
    let response = router(StubOcr::text("")).oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let html = String::from_utf8(to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();
    assert!(html.contains("/v1/extract/upload"));
    assert!(html.contains("minConfidence"));
}

#[tokio::test]
async fn test_health_reports_ocr_status() {
    let response = router(StubOcr::text("")).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["ocrAvailable"], true);

    let response = router(StubOcr::unavailable()).oneshot(get("/health")).await.unwrap();
    let body: Value = serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["ocrAvailable"], false);
}

#[tokio::test]
async fn test_version_endpoint() {
    let response = router(StubOcr::text("")).oneshot(get("/v1/version")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["features"]
        .as_array()
        .unwrap()
        .iter()
        .any(|f| f == "east-text-detection"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = router(StubOcr::text("")).oneshot(get("/v1/describe-image")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: Value = serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["errorType"], "not_found");
}
