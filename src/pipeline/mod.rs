// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Extraction pipeline: detect, crop, normalize and recognize
//!
//! [`TextExtractor`] is shared by the web server and the batch runner. It
//! holds the detector and OCR engine behind trait objects so both can be
//! replaced in tests.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::ToolkitConfig;
use crate::errors::{Result, ToolkitError};
use crate::vision::{
    crop_regions, draw_regions, preprocess_for_ocr, CropRegion, DetectionParams, EastDetector,
    OcrEngine, PageSegMode, TesseractEngine, TextDetector,
};

/// Shown to users when an image yields no text
pub const NO_TEXT_MESSAGE: &str =
    "No text found. Try lowering the confidence threshold or using a clearer image.";

/// Separator between the texts of consecutive regions
pub const REGION_SEPARATOR: &str = "\n\n";

/// Order in which region texts are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionOrder {
    /// Highest detection confidence first
    #[default]
    Confidence,
    /// Top to bottom, then left to right within a line
    Reading,
}

/// How an image is turned into text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Detect text regions first and recognize each one
    #[default]
    Detect,
    /// Recognize the whole image in one pass
    Simple,
}

impl FromStr for ExtractionMode {
    type Err = ToolkitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detect" | "east" => Ok(ExtractionMode::Detect),
            "simple" | "full" => Ok(ExtractionMode::Simple),
            other => Err(ToolkitError::invalid_config(
                "mode",
                format!("unknown extraction mode '{other}' (expected 'detect' or 'simple')"),
            )),
        }
    }
}

/// Text recognized from one region, or from the whole image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizedText {
    pub text: String,
    /// `None` when the whole image was recognized
    pub region: Option<CropRegion>,
    /// Detection confidence of the region
    pub confidence: Option<f32>,
}

/// Outcome of running the pipeline on one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Non-empty region texts joined by a blank line
    pub text: String,
    pub regions: Vec<RecognizedText>,
    /// Boxes that survived detection and suppression
    pub boxes_detected: usize,
    pub mode: ExtractionMode,
    /// Whether the whole image was recognized because no region was found
    pub used_fallback: bool,
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    /// True when no text was found
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Detected regions, in reporting order
    pub fn crop_regions(&self) -> Vec<CropRegion> {
        self.regions.iter().filter_map(|r| r.region.clone()).collect()
    }
}

/// Per-call options
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExtractOptions {
    pub mode: ExtractionMode,
    /// Overrides the configured detection threshold
    pub min_confidence: Option<f32>,
}

impl ExtractOptions {
    pub fn simple() -> Self {
        Self {
            mode: ExtractionMode::Simple,
            ..Self::default()
        }
    }

    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = Some(min_confidence);
        self
    }
}

/// Runs detection and recognition on images
#[derive(Clone)]
pub struct TextExtractor {
    detector: Arc<dyn TextDetector>,
    ocr: Arc<dyn OcrEngine>,
    config: ToolkitConfig,
}

impl std::fmt::Debug for TextExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextExtractor")
            .field("ocr", &self.ocr.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TextExtractor {
    pub fn new(detector: Arc<dyn TextDetector>, ocr: Arc<dyn OcrEngine>, config: ToolkitConfig) -> Self {
        Self {
            detector,
            ocr,
            config,
        }
    }

    /// Load the EAST model and set up Tesseract
    ///
    /// The model is loaded first so a missing model is reported before any
    /// image is touched. A missing OCR binary only produces a warning here;
    /// it surfaces per image as [`ToolkitError::OcrEngineUnavailable`].
    pub fn from_config(config: &ToolkitConfig) -> Result<Self> {
        config.validate()?;
        let detector = EastDetector::load(&config.detection)?;

        let ocr = TesseractEngine::new(config.ocr.clone());
        if !ocr.is_available() {
            warn!(
                "⚠️  OCR engine '{}' not found: {}",
                config.ocr.program,
                crate::errors::OCR_INSTALL_HINT
            );
        }

        Ok(Self::new(Arc::new(detector), Arc::new(ocr), config.clone()))
    }

    pub fn ocr_available(&self) -> bool {
        self.ocr.is_available()
    }

    /// Extract text from `image`
    pub fn extract(&self, image: &DynamicImage, options: &ExtractOptions) -> Result<ExtractionResult> {
        let start = Instant::now();

        let mut result = match options.mode {
            ExtractionMode::Simple => {
                let text = self.ocr.recognize(image, self.config.ocr.page_psm)?;
                self.assemble(vec![RecognizedText { text, region: None, confidence: None }], 0, options.mode, false)
            }
            ExtractionMode::Detect => self.extract_regions(image, options)?,
        };

        result.processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Extraction complete: {} boxes, {} chars, {}ms{}",
            result.boxes_detected,
            result.text.len(),
            result.processing_time_ms,
            if result.used_fallback { " (full image fallback)" } else { "" }
        );

        Ok(result)
    }

    /// Outline the regions of `result` on a copy of `image`
    pub fn annotate(&self, image: &DynamicImage, result: &ExtractionResult) -> DynamicImage {
        draw_regions(image, &result.crop_regions())
    }

    fn extract_regions(&self, image: &DynamicImage, options: &ExtractOptions) -> Result<ExtractionResult> {
        let mut params = DetectionParams::from(&self.config.detection);
        if let Some(min_confidence) = options.min_confidence {
            params = params.with_min_confidence(min_confidence);
        }

        let detection = self.detector.detect(image, &params)?;
        let boxes_detected = detection.boxes.len();
        debug!("Detected {} text regions", boxes_detected);

        let mut crops = crop_regions(image, &detection, &self.config.crop);
        if self.config.pipeline.region_order == RegionOrder::Reading {
            sort_reading_order(&mut crops);
        }

        if crops.is_empty() {
            if !self.config.pipeline.full_image_fallback {
                return Ok(self.assemble(Vec::new(), boxes_detected, options.mode, false));
            }
            debug!("No usable regions, recognizing the whole image");
            let text = self.ocr.recognize(image, self.config.ocr.page_psm)?;
            let regions = vec![RecognizedText { text, region: None, confidence: None }];
            return Ok(self.assemble(regions, boxes_detected, options.mode, true));
        }

        let mut regions = Vec::with_capacity(crops.len());
        for (region, crop) in crops {
            let prepared = if self.config.crop.preprocess {
                preprocess_for_ocr(&crop, self.config.crop.min_text_height)
            } else {
                crop
            };

            let text = match self.ocr.recognize(&prepared, self.config.ocr.region_psm) {
                Ok(text) => text,
                Err(e @ ToolkitError::OcrFailed { .. }) => {
                    warn!("OCR failed for region at ({}, {}): {}", region.x, region.y, e);
                    String::new()
                }
                Err(e) => return Err(e),
            };

            regions.push(RecognizedText {
                text,
                confidence: Some(region.source.confidence),
                region: Some(region),
            });
        }

        Ok(self.assemble(regions, boxes_detected, options.mode, false))
    }

    fn assemble(
        &self,
        regions: Vec<RecognizedText>,
        boxes_detected: usize,
        mode: ExtractionMode,
        used_fallback: bool,
    ) -> ExtractionResult {
        let text = join_region_texts(&regions);
        ExtractionResult {
            text,
            regions,
            boxes_detected,
            mode,
            used_fallback,
            processing_time_ms: 0,
        }
    }
}

/// Join the non-empty texts with [`REGION_SEPARATOR`]
pub fn join_region_texts(regions: &[RecognizedText]) -> String {
    regions
        .iter()
        .map(|r| r.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(REGION_SEPARATOR)
}

/// Sort crops top to bottom, grouping crops whose centres share a line
fn sort_reading_order(crops: &mut [(CropRegion, DynamicImage)]) {
    crops.sort_by(|a, b| {
        let (ay, by) = (a.0.center().1, b.0.center().1);
        ay.partial_cmp(&by).unwrap_or(Ordering::Equal)
    });

    let mut line_start = 0;
    for i in 1..=crops.len() {
        let new_line = i == crops.len() || {
            let anchor = &crops[line_start].0;
            let current = &crops[i].0;
            let tolerance = anchor.height.min(current.height) as f32 / 2.0;
            (current.center().1 - anchor.center().1).abs() > tolerance
        };
        if new_line {
            crops[line_start..i].sort_by_key(|c| c.0.x);
            line_start = i;
        }
    }
}
