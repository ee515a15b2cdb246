// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error taxonomy shared by the detection, OCR and orchestration layers

use std::path::PathBuf;
use thiserror::Error;

use crate::vision::ImageError;

/// Hint printed whenever the OCR binary cannot be started
pub const OCR_INSTALL_HINT: &str =
    "install Tesseract and add it to PATH, or point TESSERACT_CMD at the executable";

/// Errors produced while extracting text from an image
#[derive(Debug, Error)]
pub enum ToolkitError {
    #[error(
        "EAST text detection model not found at '{}'. Download the model, export it to ONNX and place it in the 'models' folder (or set EAST_MODEL_PATH)",
        .path.display()
    )]
    ModelNotFound { path: PathBuf },

    #[error(
        "EAST model must be an ONNX export, but only the frozen TensorFlow graph was found at '{}'. Convert it with: python -m tf2onnx.convert --graphdef {} --inputs input_images:0 --outputs {} --output {}",
        .frozen.display(),
        .frozen.display(),
        EAST_GRAPH_OUTPUTS,
        .expected.display()
    )]
    ModelNeedsConversion { frozen: PathBuf, expected: PathBuf },

    #[error("OCR engine '{program}' is unavailable: {reason}. Please {hint}", hint = OCR_INSTALL_HINT)]
    OcrEngineUnavailable { program: String, reason: String },

    #[error("OCR engine '{program}' failed: {stderr}")]
    OcrFailed { program: String, stderr: String },

    #[error("Invalid image: {0}")]
    Image(#[from] ImageError),

    #[error("Text detection inference failed: {0}")]
    Inference(String),

    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig { field: String, message: String },

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ToolkitError {
    /// Errors that stop the whole run rather than a single image
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ToolkitError::ModelNotFound { .. }
                | ToolkitError::ModelNeedsConversion { .. }
                | ToolkitError::InvalidConfig { .. }
        )
    }

    pub(crate) fn invalid_config(field: &str, message: impl Into<String>) -> Self {
        ToolkitError::InvalidConfig {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ToolkitError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Output tensors of the frozen EAST graph: score map, then geometry map
pub const EAST_GRAPH_OUTPUTS: &str = "feature_fusion/Conv_7/Sigmoid:0,feature_fusion/concat_3:0";

pub type Result<T> = std::result::Result<T, ToolkitError>;
