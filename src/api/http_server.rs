// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::errors::ApiError;
use super::extract::{extract_handler, extract_upload_handler};
use super::ui::INDEX_HTML;
use crate::config::ToolkitConfig;
use crate::errors::Result;
use crate::pipeline::TextExtractor;
use crate::version;

/// Shared state for every request
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<TextExtractor>,
    pub config: Arc<ToolkitConfig>,
}

impl AppState {
    pub fn new(extractor: TextExtractor, config: ToolkitConfig) -> Self {
        Self {
            extractor: Arc::new(extractor),
            config: Arc::new(config),
        }
    }
}

/// Load the model and OCR engine once for the lifetime of the server
pub fn build_state(config: &ToolkitConfig) -> Result<AppState> {
    let extractor = TextExtractor::from_config(config)?;
    Ok(AppState::new(extractor, config.clone()))
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        // Single page UI
        .route("/", get(index_handler))
        // Health check
        .route("/health", get(health_handler))
        .route("/v1/version", get(version_handler))
        // Extraction endpoints
        .route("/v1/extract", post(extract_handler))
        .route("/v1/extract/upload", post(extract_upload_handler))
        .fallback(not_found_handler)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", state.config.server.host, state.config.server.port).parse()?;
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("🌐 Text extraction UI listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model_path: String,
    pub ocr_engine: String,
    pub ocr_available: bool,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let extractor = state.extractor.clone();
    let ocr_available = tokio::task::spawn_blocking(move || extractor.ocr_available())
        .await
        .unwrap_or(false);

    Json(HealthResponse {
        status: if ocr_available { "ok" } else { "degraded" }.to_string(),
        version: version::VERSION.to_string(),
        model_path: state.config.detection.model_path.display().to_string(),
        ocr_engine: state.config.ocr.program.clone(),
        ocr_available,
    })
}

async fn version_handler() -> Json<serde_json::Value> {
    Json(version::get_version_info())
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn not_found_handler(uri: Uri) -> ApiErrorResponse {
    ApiErrorResponse(ApiError::NotFound(format!("no route for {}", uri.path())))
}

// Error response wrapper
pub struct ApiErrorResponse(pub ApiError);

impl From<ApiError> for ApiErrorResponse {
    fn from(err: ApiError) -> Self {
        ApiErrorResponse(err)
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let error_response = self.0.to_response();

        (status, Json(error_response)).into_response()
    }
}
