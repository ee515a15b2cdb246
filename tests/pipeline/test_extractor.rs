// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end extraction with stand-in detector and OCR engine

use std::sync::Arc;
use text_extraction_toolkit::pipeline::NO_TEXT_MESSAGE;
use text_extraction_toolkit::{ExtractOptions, ExtractionMode, ToolkitConfig, ToolkitError};

use crate::common::{extractor, extractor_with_config, white_image, word_box, StubOcr};

#[test]
fn test_blank_image_gives_empty_result_without_error() {
    let ocr = Arc::new(StubOcr::text(""));
    let ex = extractor(vec![], ocr.clone());

    let result = ex.extract(&white_image(320, 240), &ExtractOptions::default()).unwrap();

    assert!(result.is_empty());
    assert_eq!(result.text, "");
    assert_eq!(result.boxes_detected, 0);
    assert!(result.used_fallback);
    // One whole-page pass only
    assert_eq!(ocr.call_count(), 1);
    assert!(!NO_TEXT_MESSAGE.is_empty());
}

#[test]
fn test_each_region_is_recognized_once() {
    let ocr = Arc::new(StubOcr::text("HELLO"));
    let boxes = vec![
        word_box(80.0, 40.0, 0.95),
        word_box(200.0, 40.0, 0.85),
        word_box(80.0, 150.0, 0.75),
    ];
    let ex = extractor(boxes, ocr.clone());

    let result = ex.extract(&white_image(320, 240), &ExtractOptions::default()).unwrap();

    assert_eq!(ocr.call_count(), 3);
    assert_eq!(result.boxes_detected, 3);
    assert_eq!(result.text, "HELLO\n\nHELLO\n\nHELLO");
    assert!(!result.used_fallback);
    assert_eq!(result.mode, ExtractionMode::Detect);

    // Highest confidence first by default
    let confidences: Vec<f32> = result.regions.iter().filter_map(|r| r.confidence).collect();
    assert_eq!(confidences, vec![0.95, 0.85, 0.75]);
}

#[test]
fn test_regions_have_padded_coordinates_in_original_image() {
    let ocr = Arc::new(StubOcr::text("word"));
    let ex = extractor(vec![word_box(100.0, 50.0, 0.9)], ocr);

    let result = ex.extract(&white_image(320, 240), &ExtractOptions::default()).unwrap();
    let regions = result.crop_regions();

    // 60x16 box centred at (100, 50), padded by 5
    assert_eq!(regions.len(), 1);
    assert_eq!((regions[0].x, regions[0].y), (65, 37));
    assert_eq!((regions[0].width, regions[0].height), (70, 26));
}

#[test]
fn test_higher_confidence_threshold_returns_fewer_regions() {
    let boxes = vec![
        word_box(80.0, 40.0, 0.95),
        word_box(200.0, 40.0, 0.65),
        word_box(80.0, 150.0, 0.55),
    ];
    let img = white_image(320, 240);

    let mut previous = usize::MAX;
    for min_confidence in [0.5, 0.6, 0.7, 0.9, 0.99] {
        let ex = extractor(boxes.clone(), Arc::new(StubOcr::text("x")));
        let options = ExtractOptions::default().with_min_confidence(min_confidence);
        let result = ex.extract(&img, &options).unwrap();
        assert!(result.boxes_detected <= previous);
        previous = result.boxes_detected;
    }
    assert_eq!(previous, 0);
}

#[test]
fn test_simple_mode_recognizes_whole_image() {
    let ocr = Arc::new(StubOcr::text("  full page text \n"));
    let ex = extractor(vec![word_box(80.0, 40.0, 0.95)], ocr.clone());

    let result = ex.extract(&white_image(320, 240), &ExtractOptions::simple()).unwrap();

    assert_eq!(ocr.call_count(), 1);
    assert_eq!(result.text, "full page text");
    assert_eq!(result.mode, ExtractionMode::Simple);
    assert!(result.crop_regions().is_empty());
}

#[test]
fn test_disabled_fallback_skips_ocr() {
    let ocr = Arc::new(StubOcr::text("should not be read"));
    let mut config = ToolkitConfig::default();
    config.pipeline.full_image_fallback = false;
    let ex = extractor_with_config(vec![], ocr.clone(), config);

    let result = ex.extract(&white_image(100, 100), &ExtractOptions::default()).unwrap();

    assert!(result.is_empty());
    assert_eq!(ocr.call_count(), 0);
}

#[test]
fn test_missing_ocr_engine_is_reported() {
    let ocr = Arc::new(StubOcr::unavailable());
    let ex = extractor(vec![word_box(80.0, 40.0, 0.95)], ocr);

    let err = ex.extract(&white_image(320, 240), &ExtractOptions::default()).unwrap_err();

    assert!(matches!(err, ToolkitError::OcrEngineUnavailable { .. }));
    assert!(err.to_string().contains("install Tesseract"));
    // Aborts this image only
    assert!(!err.is_fatal());
}

#[test]
fn test_from_config_requires_model() {
    let mut config = ToolkitConfig::default();
    config.detection.model_path = "/nonexistent/models/EAST_text_detection.onnx".into();

    let err = text_extraction_toolkit::TextExtractor::from_config(&config).unwrap_err();
    assert!(matches!(err, ToolkitError::ModelNotFound { .. }));
    assert!(err.to_string().contains("/nonexistent/models/EAST_text_detection.onnx"));
}

#[test]
fn test_from_config_with_only_frozen_graph_explains_conversion() {
    let dir = tempfile::TempDir::new().unwrap();
    let models = dir.path().join("models");
    std::fs::create_dir(&models).unwrap();
    std::fs::write(models.join("EAST_text_detection.pb"), b"frozen graph").unwrap();

    let mut config = ToolkitConfig::default();
    config.detection.model_path = models.join("EAST_text_detection.onnx");

    let err = text_extraction_toolkit::TextExtractor::from_config(&config).unwrap_err();
    assert!(matches!(err, ToolkitError::ModelNeedsConversion { .. }));
    assert!(err.to_string().contains("tf2onnx"));
}
