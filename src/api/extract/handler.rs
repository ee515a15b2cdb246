// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Extraction endpoint handlers

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::Multipart;
use image::DynamicImage;
use tracing::{debug, info, warn};

use super::request::{validate_options, ExtractRequest};
use super::response::ExtractResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::{ApiErrorResponse, AppState};
use crate::errors::ToolkitError;
use crate::pipeline::ExtractOptions;
use crate::vision::image_utils::{encode_png_base64, ImageError};
use crate::vision::{decode_base64_image, decode_image_bytes, ImageInfo};

/// POST /v1/extract - Extract text from a base64 encoded image
///
/// # Request
/// - `image`: Base64-encoded image data (required)
/// - `minConfidence`: Detection threshold override (0.0-1.0)
/// - `mode`: "detect" (default) or "simple"
/// - `annotate`: Return the image with detected regions outlined
///
/// # Errors
/// - 400 Bad Request: missing or undecodable image, invalid options
/// - 413 Payload Too Large: image larger than 25MB
/// - 503 Service Unavailable: OCR engine not installed
/// - 500 Internal Server Error: detection failed
pub async fn extract_handler(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, ApiErrorResponse> {
    debug!("Extract request received");

    if let Err(e) = request.validate() {
        warn!("Extract validation failed: {}", e);
        return Err(e.into());
    }
    let options = request.options()?;

    let image_data = request.image.as_deref().unwrap_or_default();
    let (image, image_info) = decode_base64_image(image_data).map_err(|e| {
        warn!("Failed to decode image: {}", e);
        image_error(e)
    })?;

    run_extraction(&state, image, image_info, options, request.annotate)
        .await
        .map(Json)
        .map_err(ApiErrorResponse)
}

/// POST /v1/extract/upload - Extract text from a multipart upload
///
/// Fields: `image` (file, required), `minConfidence`, `mode`, `annotate`.
pub async fn extract_upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, ApiErrorResponse> {
    let mut image_bytes = None;
    let mut min_confidence = None;
    let mut mode = None;
    let mut annotate = false;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" | "file" => {
                let bytes = field.bytes().await.map_err(multipart_error)?;
                image_bytes = Some(bytes);
            }
            "minConfidence" | "min_confidence" => {
                let raw = field.text().await.map_err(multipart_error)?;
                let value = raw.trim().parse::<f32>().map_err(|_| {
                    ApiError::validation("minConfidence", format!("'{}' is not a number", raw.trim()))
                })?;
                min_confidence = Some(value);
            }
            "mode" => mode = Some(field.text().await.map_err(multipart_error)?),
            "annotate" => {
                let raw = field.text().await.map_err(multipart_error)?;
                annotate = matches!(raw.trim(), "true" | "1" | "on" | "yes");
            }
            other => debug!("Ignoring multipart field '{}'", other),
        }
    }

    let image_bytes = image_bytes
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ApiError::validation("image", "image file is required"))?;
    let options = validate_options(min_confidence, mode.as_deref())?;

    let (image, image_info) = decode_image_bytes(&image_bytes).map_err(|e| {
        warn!("Failed to decode upload: {}", e);
        image_error(e)
    })?;

    run_extraction(&state, image, image_info, options, annotate)
        .await
        .map(Json)
        .map_err(ApiErrorResponse)
}

fn image_error(err: ImageError) -> ApiError {
    match err {
        ImageError::TooLarge(..) => ApiError::PayloadTooLarge(err.to_string()),
        other => ApiError::InvalidImage(other.to_string()),
    }
}

fn multipart_error(err: axum_extra::extract::multipart::MultipartError) -> ApiErrorResponse {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiErrorResponse(ApiError::PayloadTooLarge(err.body_text()))
    } else {
        ApiErrorResponse(ApiError::InvalidRequest(err.body_text()))
    }
}

/// Run the blocking pipeline off the async runtime
async fn run_extraction(
    state: &AppState,
    image: DynamicImage,
    image_info: ImageInfo,
    options: ExtractOptions,
    annotate: bool,
) -> Result<ExtractResponse, ApiError> {
    debug!(
        "Decoded image: {}x{}, {} bytes",
        image_info.width, image_info.height, image_info.size_bytes
    );

    let extractor = state.extractor.clone();
    let (result, annotated) = tokio::task::spawn_blocking(move || {
        let result = extractor.extract(&image, &options)?;
        let annotated = if annotate {
            Some(encode_png_base64(&extractor.annotate(&image, &result))?)
        } else {
            None
        };
        Ok::<_, ToolkitError>((result, annotated))
    })
    .await
    .map_err(|e| ApiError::InternalError(format!("extraction task failed: {}", e)))?
    .map_err(|e| {
        warn!("Extraction failed: {}", e);
        ApiError::from(e)
    })?;

    info!(
        "Extraction complete: {} regions, {} chars, {}ms",
        result.regions.len(),
        result.text.len(),
        result.processing_time_ms
    );

    Ok(ExtractResponse::new(result, &image_info, annotated))
}
