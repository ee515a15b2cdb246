// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Stand-ins for the EAST detector and Tesseract so pipeline tests run without
//! a model file or an installed OCR binary

#![allow(dead_code)]

use image::{DynamicImage, Rgb, RgbImage};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use text_extraction_toolkit::vision::east::{Detection, ScaleInfo};
use text_extraction_toolkit::{
    DetectionBox, DetectionParams, OcrEngine, PageSegMode, TextDetector, TextExtractor, ToolkitConfig,
    ToolkitError,
};

/// Returns the same boxes for every image, filtered by the requested threshold
pub struct FixedDetector {
    pub boxes: Vec<DetectionBox>,
}

impl TextDetector for FixedDetector {
    fn detect(&self, image: &DynamicImage, params: &DetectionParams) -> text_extraction_toolkit::Result<Detection> {
        Ok(Detection {
            boxes: self
                .boxes
                .iter()
                .filter(|b| b.confidence >= params.min_confidence)
                .cloned()
                .collect(),
            scale: ScaleInfo::identity(image.width(), image.height()),
        })
    }
}

pub enum OcrBehavior {
    Text(String),
    Unavailable,
}

/// OCR engine with canned output that counts its calls
pub struct StubOcr {
    pub behavior: OcrBehavior,
    pub calls: AtomicUsize,
}

impl StubOcr {
    pub fn text(text: &str) -> Self {
        Self {
            behavior: OcrBehavior::Text(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            behavior: OcrBehavior::Unavailable,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrEngine for StubOcr {
    fn recognize(&self, _image: &DynamicImage, _psm: PageSegMode) -> text_extraction_toolkit::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            OcrBehavior::Text(text) => Ok(text.clone()),
            OcrBehavior::Unavailable => Err(ToolkitError::OcrEngineUnavailable {
                program: "tesseract".to_string(),
                reason: "No such file or directory (os error 2)".to_string(),
            }),
        }
    }

    fn is_available(&self) -> bool {
        matches!(self.behavior, OcrBehavior::Text(_))
    }

    fn name(&self) -> &str {
        "stub"
    }
}

pub fn word_box(center_x: f32, center_y: f32, confidence: f32) -> DetectionBox {
    DetectionBox {
        center_x,
        center_y,
        width: 60.0,
        height: 16.0,
        angle: 0.0,
        confidence,
    }
}

pub fn extractor(boxes: Vec<DetectionBox>, ocr: Arc<StubOcr>) -> TextExtractor {
    TextExtractor::new(Arc::new(FixedDetector { boxes }), ocr, ToolkitConfig::default())
}

pub fn extractor_with_config(boxes: Vec<DetectionBox>, ocr: Arc<StubOcr>, config: ToolkitConfig) -> TextExtractor {
    TextExtractor::new(Arc::new(FixedDetector { boxes }), ocr, config)
}

pub fn white_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])))
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    white_image(width, height).save(path).unwrap();
}
