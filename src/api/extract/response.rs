// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Extraction response types

use serde::{Deserialize, Serialize};

use crate::pipeline::{ExtractionMode, ExtractionResult, NO_TEXT_MESSAGE};
use crate::vision::ImageInfo;

/// Bounding box for a text region, in original image pixels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A detected text region
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRegion {
    /// Extracted text
    pub text: String,
    /// Detection confidence (0.0-1.0)
    pub confidence: f32,
    /// Rotation of the detected box in radians
    pub angle: f32,
    pub bounding_box: BoundingBox,
}

/// Response from text extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    /// Full extracted text (regions separated by a blank line)
    pub text: String,
    pub regions: Vec<TextRegion>,
    pub boxes_detected: usize,
    pub mode: ExtractionMode,
    pub used_fallback: bool,
    pub no_text_found: bool,
    /// Hint shown when no text was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Base64 PNG with detected regions outlined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotated_image: Option<String>,
    pub image_width: u32,
    pub image_height: u32,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

impl ExtractResponse {
    pub fn new(result: ExtractionResult, info: &ImageInfo, annotated_image: Option<String>) -> Self {
        let no_text_found = result.is_empty();

        let regions = result
            .regions
            .iter()
            .filter_map(|r| {
                let region = r.region.as_ref()?;
                Some(TextRegion {
                    text: r.text.clone(),
                    confidence: region.source.confidence,
                    angle: region.source.angle,
                    bounding_box: BoundingBox {
                        x: region.x,
                        y: region.y,
                        width: region.width,
                        height: region.height,
                    },
                })
            })
            .collect();

        Self {
            text: result.text,
            regions,
            boxes_detected: result.boxes_detected,
            mode: result.mode,
            used_fallback: result.used_fallback,
            no_text_found,
            message: no_text_found.then(|| NO_TEXT_MESSAGE.to_string()),
            annotated_image,
            image_width: info.width,
            image_height: info.height,
            processing_time_ms: result.processing_time_ms,
        }
    }
}
