// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Directory processing: per-file outputs, skipped files and startup failures

use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use text_extraction_toolkit::config::BatchConfig;
use text_extraction_toolkit::{
    run_batch, BatchRunner, ExtractOptions, OutputFormat, ToolkitConfig, ToolkitError,
};

use crate::common::{extractor, word_box, write_png, StubOcr};

fn batch_dirs() -> (TempDir, BatchConfig) {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("samples");
    fs::create_dir(&input).unwrap();
    let config = BatchConfig {
        input_dir: input,
        output_dir: dir.path().join("output"),
        format: OutputFormat::Text,
        save_annotated: false,
    };
    (dir, config)
}

#[test]
fn test_corrupt_file_is_skipped_and_others_written() {
    let (_dir, config) = batch_dirs();
    for name in ["a.png", "b.png", "c.png"] {
        write_png(&config.input_dir.join(name), 200, 100);
    }
    fs::write(config.input_dir.join("broken.png"), b"not really a png").unwrap();

    let ocr = Arc::new(StubOcr::text("INVOICE 42"));
    let ex = extractor(vec![word_box(100.0, 50.0, 0.9)], ocr);

    let report = run_batch(&ex, &config, &ExtractOptions::default()).unwrap();

    assert_eq!(report.total, 4);
    assert_eq!(report.processed(), 3);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("broken.png"));

    for stem in ["a", "b", "c"] {
        let text = fs::read_to_string(config.output_dir.join(format!("extracted_{stem}.txt"))).unwrap();
        assert_eq!(text, "INVOICE 42");
    }
    assert!(!config.output_dir.join("extracted_broken.txt").exists());
}

#[test]
fn test_missing_ocr_engine_skips_every_file_but_finishes() {
    let (_dir, config) = batch_dirs();
    write_png(&config.input_dir.join("page1.png"), 120, 80);
    write_png(&config.input_dir.join("page2.png"), 120, 80);

    let ex = extractor(vec![word_box(60.0, 40.0, 0.9)], Arc::new(StubOcr::unavailable()));
    let report = run_batch(&ex, &config, &ExtractOptions::default()).unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.processed(), 0);
    assert!(report.failures.iter().all(|f| f.reason.contains("install Tesseract")));
}

#[test]
fn test_image_without_text_still_gets_output_file() {
    let (_dir, config) = batch_dirs();
    write_png(&config.input_dir.join("blank.png"), 64, 64);

    let ex = extractor(vec![], Arc::new(StubOcr::text("")));
    let report = run_batch(&ex, &config, &ExtractOptions::default()).unwrap();

    assert_eq!(report.no_text, 1);
    assert_eq!(fs::read_to_string(config.output_dir.join("extracted_blank.txt")).unwrap(), "");
}

#[test]
fn test_json_output_and_annotated_images() {
    let (_dir, mut config) = batch_dirs();
    config.format = OutputFormat::Json;
    config.save_annotated = true;
    write_png(&config.input_dir.join("receipt.png"), 200, 100);

    let ex = extractor(vec![word_box(100.0, 50.0, 0.9)], Arc::new(StubOcr::text("TOTAL")));
    run_batch(&ex, &config, &ExtractOptions::default()).unwrap();

    let raw = fs::read_to_string(config.output_dir.join("extracted_receipt.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["text"], "TOTAL");
    assert_eq!(json["boxesDetected"], 1);
    assert!(json["source"].as_str().unwrap().ends_with("receipt.png"));

    let annotated = image::open(config.output_dir.join("detected_regions_receipt.png")).unwrap();
    assert_eq!((annotated.width(), annotated.height()), (200, 100));
}

#[test]
fn test_unsupported_and_nested_files_are_ignored() {
    let (_dir, config) = batch_dirs();
    write_png(&config.input_dir.join("scan.png"), 50, 50);
    fs::write(config.input_dir.join("notes.txt"), "not an image").unwrap();
    let nested = config.input_dir.join("nested");
    fs::create_dir(&nested).unwrap();
    write_png(&nested.join("inner.png"), 50, 50);

    let ex = extractor(vec![], Arc::new(StubOcr::text("x")));
    let report = run_batch(&ex, &config, &ExtractOptions::default()).unwrap();

    assert_eq!(report.total, 1);
    assert_eq!(report.processed(), 1);
}

#[test]
fn test_missing_input_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = BatchConfig {
        input_dir: dir.path().join("does-not-exist"),
        output_dir: dir.path().join("output"),
        ..BatchConfig::default()
    };

    let ex = extractor(vec![], Arc::new(StubOcr::text("x")));
    let err = run_batch(&ex, &config, &ExtractOptions::default()).unwrap_err();
    assert!(matches!(err, ToolkitError::Io { .. }));
}

#[test]
fn test_missing_model_aborts_before_any_output() {
    let (dir, batch) = batch_dirs();
    write_png(&batch.input_dir.join("a.png"), 50, 50);

    let mut config = ToolkitConfig::default();
    config.detection.model_path = dir.path().join("models/EAST_text_detection.onnx");
    config.batch = batch.clone();

    let err = BatchRunner::from_config(&config, ExtractOptions::default()).unwrap_err();

    assert!(matches!(err, ToolkitError::ModelNotFound { .. }));
    assert!(!batch.output_dir.exists());
}
