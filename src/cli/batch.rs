// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use super::CommonArgs;
use crate::batch::{BatchReport, BatchRunner, OutputFormat};
use crate::config::ToolkitConfig;
use crate::pipeline::{ExtractOptions, ExtractionMode};

/// Extract text from every image in a directory
#[derive(Parser, Debug)]
#[command(name = "extract-batch")]
#[command(version)]
#[command(about = "Extract text from every image in a directory", long_about = None)]
pub struct BatchArgs {
    /// Directory containing the images
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Directory the extracted text is written to
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Output format: text or json
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Recognize whole images instead of detected regions
    #[arg(long)]
    pub simple: bool,

    /// Also write detected_regions_<name>.png with the regions outlined
    #[arg(long)]
    pub save_annotated: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl BatchArgs {
    pub fn apply(&self, config: &mut ToolkitConfig) {
        self.common.apply(config);
        if let Some(input) = &self.input {
            config.batch.input_dir = input.clone();
        }
        if let Some(output) = &self.output {
            config.batch.output_dir = output.clone();
        }
        if let Some(format) = self.format {
            config.batch.format = format;
        }
        if self.save_annotated {
            config.batch.save_annotated = true;
        }
    }

    pub fn options(&self) -> ExtractOptions {
        ExtractOptions {
            mode: if self.simple {
                ExtractionMode::Simple
            } else {
                ExtractionMode::Detect
            },
            min_confidence: None,
        }
    }
}

/// Load the model, then process the input directory
pub fn run(args: BatchArgs) -> Result<BatchReport> {
    let mut config = ToolkitConfig::load(args.common.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let runner = BatchRunner::from_config(&config, args.options()).context("Failed to initialize text extractor")?;
    let report = runner.run().with_context(|| {
        format!("Failed to process images in {}", config.batch.input_dir.display())
    })?;

    info!(
        "{} written, {} skipped, {} without text",
        report.processed(),
        report.failures.len(),
        report.no_text
    );
    for failure in &report.failures {
        warn!("  skipped {}: {}", failure.path.display(), failure.reason);
    }

    Ok(report)
}
