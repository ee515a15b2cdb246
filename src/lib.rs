// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod batch;
pub mod cli;
pub mod config;
pub mod errors;
pub mod pipeline;
pub mod version;
pub mod vision;

// Re-export main types
pub use batch::{run_batch, BatchReport, BatchRunner, OutputFormat};
pub use config::ToolkitConfig;
pub use errors::{Result, ToolkitError};
pub use pipeline::{
    ExtractOptions, ExtractionMode, ExtractionResult, RecognizedText, RegionOrder, TextExtractor,
};
pub use vision::{
    DetectionBox, DetectionParams, EastDetector, OcrEngine, PageSegMode, TesseractEngine,
    TextDetector,
};
