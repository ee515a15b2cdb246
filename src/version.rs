// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Text Extraction Toolkit

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-east-tesseract-2025-10-19";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-10-19";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "east-text-detection",
    "rotated-boxes",
    "nms",
    "region-deskew",
    "otsu-binarization",
    "tesseract-ocr",
    "full-image-fallback",
    "reading-order",
    "web-ui",
    "batch-extraction",
    "json-output",
    "annotated-output",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Text Extraction Toolkit {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info for API responses
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}
