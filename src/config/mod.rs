// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Toolkit configuration
//!
//! Values are resolved in this order (later wins):
//! 1. Built-in defaults
//! 2. TOML file (`--config`, `TOOLKIT_CONFIG`, or `./toolkit.toml` when present)
//! 3. Environment variables (`EAST_MODEL_PATH`, `TESSERACT_CMD`, `OCR_LANGUAGE`,
//!    `MIN_CONFIDENCE`, `API_HOST`, `API_PORT`)
//! 4. Command line flags, applied by the binaries

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::batch::OutputFormat;
use crate::errors::{Result, ToolkitError};
use crate::pipeline::RegionOrder;
use crate::vision::east::TensorLayout;
use crate::vision::image_utils::MAX_REQUEST_BODY;
use crate::vision::ocr::PageSegMode;

/// Default location of the EAST model, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "models/EAST_text_detection.onnx";

/// Config file picked up automatically from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "toolkit.toml";

/// EAST consumes inputs whose sides are multiples of this value
pub const EAST_STRIDE_MULTIPLE: u32 = 32;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    pub detection: DetectionConfig,
    pub crop: CropConfig,
    pub ocr: OcrConfig,
    pub pipeline: PipelineConfig,
    pub batch: BatchConfig,
    pub server: ServerConfig,
}

/// Text detector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Path to the EAST model (ONNX export of the frozen graph)
    pub model_path: PathBuf,
    /// Network input width, multiple of 32
    pub input_width: u32,
    /// Network input height, multiple of 32
    pub input_height: u32,
    /// Tensor layout expected by the exported model
    pub input_layout: TensorLayout,
    /// Minimum score for a cell to produce a box
    pub min_confidence: f32,
    /// IoU above which the weaker of two boxes is suppressed
    pub nms_threshold: f32,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            input_width: 320,
            input_height: 320,
            input_layout: TensorLayout::Nhwc,
            min_confidence: 0.5,
            nms_threshold: 0.3,
            intra_threads: 4,
        }
    }
}

/// Region cropping and OCR normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Pixels added around every detected box before cropping
    pub padding: u32,
    /// Resample rotated boxes upright instead of taking their envelope
    pub deskew: bool,
    /// Grayscale, upscale and binarize crops before OCR
    pub preprocess: bool,
    /// Crops shorter than this are upscaled before OCR (0 disables)
    pub min_text_height: u32,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            padding: 5,
            deskew: false,
            preprocess: true,
            min_text_height: 32,
        }
    }
}

/// External OCR engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract executable, looked up on PATH when not absolute
    pub program: String,
    /// Tesseract language pack(s), e.g. "eng" or "eng+deu"
    pub language: String,
    /// OCR engine mode (0-3)
    pub oem: u8,
    /// Page segmentation used for detected regions
    pub region_psm: PageSegMode,
    /// Page segmentation used for whole images
    pub page_psm: PageSegMode,
    /// Resolution hint passed with `--dpi`
    pub dpi: Option<u32>,
    /// Extra `-c name=value` variables (e.g. tessedit_char_whitelist)
    pub variables: BTreeMap<String, String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            program: "tesseract".to_string(),
            language: "eng".to_string(),
            oem: 3,
            region_psm: PageSegMode::SingleLine,
            page_psm: PageSegMode::Auto,
            dpi: None,
            variables: BTreeMap::new(),
        }
    }
}

/// Detect → crop → OCR wiring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// OCR the whole image when the detector finds nothing
    pub full_image_fallback: bool,
    /// Order in which region texts are reported and joined
    pub region_order: RegionOrder,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            full_image_fallback: true,
            region_order: RegionOrder::Confidence,
        }
    }
}

/// Batch processing over a directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    /// Also write `detected_regions_<stem>.png` with boxes drawn
    pub save_annotated: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("samples"),
            output_dir: PathBuf::from("output"),
            format: OutputFormat::Text,
            save_annotated: false,
        }
    }
}

/// Web UI / HTTP API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted request body in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            max_upload_bytes: MAX_REQUEST_BODY,
        }
    }
}

impl ToolkitConfig {
    /// Resolve file + environment configuration and validate it
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| env::var("TOOLKIT_CONFIG").ok().map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ToolkitError::io(path, e))?;
        let config = Self::from_toml_str(&raw)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| ToolkitError::invalid_config("config file", e.to_string()))
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("EAST_MODEL_PATH") {
            self.detection.model_path = PathBuf::from(path);
        }
        if let Some(program) = lookup("TESSERACT_CMD") {
            self.ocr.program = program;
        }
        if let Some(language) = lookup("OCR_LANGUAGE") {
            self.ocr.language = language;
        }
        if let Some(raw) = lookup("MIN_CONFIDENCE") {
            self.detection.min_confidence = parse_override("MIN_CONFIDENCE", &raw)?;
        }
        if let Some(host) = lookup("API_HOST") {
            self.server.host = host;
        }
        if let Some(raw) = lookup("API_PORT") {
            self.server.port = parse_override("API_PORT", &raw)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let det = &self.detection;
        for (field, value) in [
            ("detection.input_width", det.input_width),
            ("detection.input_height", det.input_height),
        ] {
            if value == 0 || value % EAST_STRIDE_MULTIPLE != 0 {
                return Err(ToolkitError::invalid_config(
                    field,
                    format!("must be a positive multiple of {EAST_STRIDE_MULTIPLE}, got {value}"),
                ));
            }
        }
        for (field, value) in [
            ("detection.min_confidence", det.min_confidence),
            ("detection.nms_threshold", det.nms_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ToolkitError::invalid_config(
                    field,
                    format!("must be within [0, 1], got {value}"),
                ));
            }
        }
        if det.intra_threads == 0 {
            return Err(ToolkitError::invalid_config(
                "detection.intra_threads",
                "must be at least 1",
            ));
        }
        if self.ocr.program.trim().is_empty() {
            return Err(ToolkitError::invalid_config("ocr.program", "must not be empty"));
        }
        if self.ocr.language.trim().is_empty() {
            return Err(ToolkitError::invalid_config("ocr.language", "must not be empty"));
        }
        if self.ocr.oem > 3 {
            return Err(ToolkitError::invalid_config(
                "ocr.oem",
                format!("must be between 0 and 3, got {}", self.ocr.oem),
            ));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(ToolkitError::invalid_config(
                "server.max_upload_bytes",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ToolkitError::invalid_config(key, format!("'{raw}': {e}")))
}
