// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Extraction request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::pipeline::{ExtractOptions, ExtractionMode};

/// Request for text extraction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    /// Base64-encoded image data (a `data:` URL is accepted)
    #[serde(default)]
    pub image: Option<String>,

    /// Detection threshold override (0.0-1.0)
    #[serde(default)]
    pub min_confidence: Option<f32>,

    /// "detect" (default) or "simple"
    #[serde(default)]
    pub mode: Option<String>,

    /// Include a PNG with the detected regions outlined
    #[serde(default)]
    pub annotate: bool,
}

impl ExtractRequest {
    /// Validate the extraction request
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.image.as_ref().map(|s| s.trim().is_empty()).unwrap_or(true) {
            return Err(ApiError::validation("image", "image is required"));
        }
        validate_options(self.min_confidence, self.mode.as_deref()).map(|_| ())
    }

    /// Pipeline options for this request
    pub fn options(&self) -> Result<ExtractOptions, ApiError> {
        validate_options(self.min_confidence, self.mode.as_deref())
    }
}

/// Check the optional tuning fields shared by the JSON and multipart endpoints
pub fn validate_options(min_confidence: Option<f32>, mode: Option<&str>) -> Result<ExtractOptions, ApiError> {
    let mut options = ExtractOptions::default();

    if let Some(value) = min_confidence {
        if !(0.0..=1.0).contains(&value) {
            return Err(ApiError::validation(
                "minConfidence",
                format!("minConfidence must be between 0 and 1, got {}", value),
            ));
        }
        options = options.with_min_confidence(value);
    }

    if let Some(mode) = mode.filter(|m| !m.trim().is_empty()) {
        options.mode = mode
            .parse::<ExtractionMode>()
            .map_err(|e| ApiError::validation("mode", e.to_string()))?;
    }

    Ok(options)
}
