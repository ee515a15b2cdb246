// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tesseract command line engine
//!
//! Each call spawns `<program> stdin stdout ...`, pipes a PNG in and reads
//! the recognized text from stdout.

use image::DynamicImage;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

use super::{OcrEngine, PageSegMode};
use crate::config::OcrConfig;
use crate::errors::{Result, ToolkitError};
use crate::vision::image_utils::encode_png;

/// OCR engine backed by the `tesseract` binary
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    config: OcrConfig,
}

impl TesseractEngine {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    pub fn program(&self) -> &str {
        &self.config.program
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// Command line arguments for one recognition call
    pub fn build_args(&self, psm: PageSegMode) -> Vec<String> {
        let mut args = vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.config.language.clone(),
            "--oem".to_string(),
            self.config.oem.to_string(),
            "--psm".to_string(),
            psm.to_string(),
        ];

        if let Some(dpi) = self.config.dpi {
            args.push("--dpi".to_string());
            args.push(dpi.to_string());
        }

        for (key, value) in &self.config.variables {
            args.push("-c".to_string());
            args.push(format!("{key}={value}"));
        }

        args
    }

    /// Tesseract version line, or the reason it cannot be run
    pub fn version(&self) -> Result<String> {
        let output = Command::new(&self.config.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(ToolkitError::OcrFailed {
                program: self.config.program.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // Older releases print the banner on stderr
        let banner = if output.stdout.is_empty() {
            &output.stderr
        } else {
            &output.stdout
        };
        Ok(String::from_utf8_lossy(banner)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    fn spawn_error(&self, err: std::io::Error) -> ToolkitError {
        match err.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => ToolkitError::OcrEngineUnavailable {
                program: self.config.program.clone(),
                reason: err.to_string(),
            },
            _ => ToolkitError::OcrFailed {
                program: self.config.program.clone(),
                stderr: format!("failed to start: {err}"),
            },
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &DynamicImage, psm: PageSegMode) -> Result<String> {
        let png_data = encode_png(image)?;
        let args = self.build_args(psm);
        debug!("Running {} {}", self.config.program, args.join(" "));

        let mut child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(&png_data) {
                // Early exit closes the pipe; the exit status is checked below
                warn!("Failed to pipe image to {}: {}", self.config.program, e);
            }
        }

        let output = child.wait_with_output().map_err(|e| ToolkitError::OcrFailed {
            program: self.config.program.clone(),
            stderr: format!("failed to wait for process: {e}"),
        })?;

        if !output.status.success() {
            return Err(ToolkitError::OcrFailed {
                program: self.config.program.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn is_available(&self) -> bool {
        match self.version() {
            Ok(version) => {
                debug!("Found {}", version);
                true
            }
            Err(e) => {
                debug!("OCR engine unavailable: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}
