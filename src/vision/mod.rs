// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing: text detection, cropping and recognition
//!
//! This module provides:
//! - EAST text region detection via ONNX Runtime
//! - Region cropping, deskewing and OCR normalization
//! - OCR through an external engine (Tesseract)
//!
//! Everything runs on CPU.

pub mod annotate;
pub mod crop;
pub mod east;
pub mod image_utils;
pub mod ocr;

pub use annotate::draw_regions;
pub use crop::{crop_regions, preprocess_for_ocr, CropRegion};
pub use east::{Detection, DetectionBox, DetectionParams, EastDetector, TextDetector};
pub use image_utils::{
    decode_base64_image, decode_image_bytes, detect_format, load_image_file, ImageError, ImageInfo,
};
pub use ocr::{OcrEngine, PageSegMode, TesseractEngine};
