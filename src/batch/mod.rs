// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Batch extraction over a directory of images
//!
//! Every supported image in the input directory is run through the
//! pipeline and its text written to `extracted_<stem>.txt` (or `.json`).
//! A file that cannot be processed is logged and skipped; the run carries on
//! with the next one.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::config::{BatchConfig, ToolkitConfig};
use crate::errors::{Result, ToolkitError};
use crate::pipeline::{ExtractOptions, ExtractionResult, TextExtractor};
use crate::vision::image_utils::{encode_png, has_supported_extension, load_image_file};

/// Format of the per-image output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain extracted text
    #[default]
    Text,
    /// The full extraction result
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ToolkitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ToolkitError::invalid_config(
                "format",
                format!("unknown output format '{other}' (expected 'text' or 'json')"),
            )),
        }
    }
}

/// A file that was skipped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Summary of a batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// Images found in the input directory
    pub total: usize,
    /// Output files written, one per processed image
    pub written: Vec<PathBuf>,
    pub failures: Vec<BatchFailure>,
    /// Processed images in which no text was found
    pub no_text: usize,
    pub elapsed_ms: u64,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.written.len()
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    source: String,
    #[serde(flatten)]
    result: &'a ExtractionResult,
}

/// Supported images directly inside `dir`, sorted by path
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| ToolkitError::io(dir, e))?;

    let mut images = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ToolkitError::io(dir, e))?.path();
        if path.is_file() && has_supported_extension(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

/// Where the extracted text for `image` goes
pub fn output_path(output_dir: &Path, image: &Path, format: OutputFormat) -> PathBuf {
    output_dir.join(format!("extracted_{}.{}", file_stem(image), format.extension()))
}

/// Where the annotated copy of `image` goes
pub fn annotated_path(output_dir: &Path, image: &Path) -> PathBuf {
    output_dir.join(format!("detected_regions_{}.png", file_stem(image)))
}

/// Extract one image and write its outputs, returning the result
pub fn process_file(
    extractor: &TextExtractor,
    path: &Path,
    config: &BatchConfig,
    options: &ExtractOptions,
) -> Result<ExtractionResult> {
    let (image, info) = load_image_file(path)?;
    info!(
        "Processing {} ({}x{}, {} bytes)",
        path.display(),
        info.width,
        info.height,
        info.size_bytes
    );

    let result = extractor.extract(&image, options)?;

    let out = output_path(&config.output_dir, path, config.format);
    let contents = match config.format {
        OutputFormat::Text => result.text.clone(),
        OutputFormat::Json => serde_json::to_string_pretty(&JsonOutput {
            source: path.display().to_string(),
            result: &result,
        })
        .map_err(|e| ToolkitError::Inference(format!("failed to serialize result: {e}")))?,
    };
    fs::write(&out, contents).map_err(|e| ToolkitError::io(&out, e))?;

    if config.save_annotated {
        let annotated = extractor.annotate(&image, &result);
        let png = encode_png(&annotated)?;
        let annotated_out = annotated_path(&config.output_dir, path);
        fs::write(&annotated_out, png).map_err(|e| ToolkitError::io(&annotated_out, e))?;
    }

    Ok(result)
}

/// Run the extractor over every image in `config.input_dir`
///
/// Fails only when the input directory cannot be listed or the output
/// directory cannot be created.
pub fn run_batch(extractor: &TextExtractor, config: &BatchConfig, options: &ExtractOptions) -> Result<BatchReport> {
    let start = Instant::now();
    let images = list_images(&config.input_dir)?;
    fs::create_dir_all(&config.output_dir).map_err(|e| ToolkitError::io(&config.output_dir, e))?;

    info!(
        "Found {} images in {}, writing to {}",
        images.len(),
        config.input_dir.display(),
        config.output_dir.display()
    );

    let mut report = BatchReport {
        total: images.len(),
        ..BatchReport::default()
    };

    for path in images {
        match process_file(extractor, &path, config, options) {
            Ok(result) => {
                if result.is_empty() {
                    info!("No text found in {}", path.display());
                    report.no_text += 1;
                }
                report.written.push(output_path(&config.output_dir, &path, config.format));
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                error!("❌ Skipping {}: {}", path.display(), e);
                report.failures.push(BatchFailure {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    report.elapsed_ms = start.elapsed().as_millis() as u64;
    if report.failures.is_empty() {
        info!(
            "✅ Batch complete: {}/{} images processed in {}ms",
            report.processed(),
            report.total,
            report.elapsed_ms
        );
    } else {
        warn!(
            "Batch complete: {}/{} images processed, {} skipped",
            report.processed(),
            report.total,
            report.failures.len()
        );
    }

    Ok(report)
}

/// Extractor plus the batch settings it runs with
#[derive(Debug, Clone)]
pub struct BatchRunner {
    extractor: TextExtractor,
    config: BatchConfig,
    options: ExtractOptions,
}

impl BatchRunner {
    pub fn new(extractor: TextExtractor, config: BatchConfig, options: ExtractOptions) -> Self {
        Self {
            extractor,
            config,
            options,
        }
    }

    /// Load the model and OCR engine; nothing is read from disk before the model
    pub fn from_config(config: &ToolkitConfig, options: ExtractOptions) -> Result<Self> {
        let extractor = TextExtractor::from_config(config)?;
        Ok(Self::new(extractor, config.batch.clone(), options))
    }

    pub fn run(&self) -> Result<BatchReport> {
        run_batch(&self.extractor, &self.config, &self.options)
    }
}
