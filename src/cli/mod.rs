// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod batch;
pub mod serve;

use clap::Args;
use std::path::PathBuf;

use crate::config::ToolkitConfig;

/// Options shared by the server and the batch runner
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// TOML configuration file (defaults to ./toolkit.toml when present)
    #[arg(long, env = "TOOLKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the EAST text detection model (ONNX)
    #[arg(long, env = "EAST_MODEL_PATH")]
    pub model: Option<PathBuf>,

    /// Minimum detection confidence (0.0-1.0)
    #[arg(long, env = "MIN_CONFIDENCE")]
    pub min_confidence: Option<f32>,

    /// Tesseract executable
    #[arg(long, env = "TESSERACT_CMD")]
    pub tesseract: Option<String>,

    /// Tesseract language(s), e.g. "eng" or "eng+deu"
    #[arg(long, env = "OCR_LANGUAGE")]
    pub language: Option<String>,
}

impl CommonArgs {
    pub fn apply(&self, config: &mut ToolkitConfig) {
        if let Some(model) = &self.model {
            config.detection.model_path = model.clone();
        }
        if let Some(min_confidence) = self.min_confidence {
            config.detection.min_confidence = min_confidence;
        }
        if let Some(program) = &self.tesseract {
            config.ocr.program = program.clone();
        }
        if let Some(language) = &self.language {
            config.ocr.language = language.clone();
        }
    }
}

/// Set up logging the same way for every binary
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
