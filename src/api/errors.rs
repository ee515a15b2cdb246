// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::errors::{ToolkitError, OCR_INSTALL_HINT};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    NotFound(String),
    InvalidRequest(String),
    ValidationError { field: String, message: String },
    InvalidImage(String),
    PayloadTooLarge(String),
    ServiceUnavailable(String),
    OcrUnavailable { program: String, reason: String },
    InternalError(String),
}

impl ApiError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        ApiError::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let (error_type, message, details) = match self {
            ApiError::NotFound(msg) => ("not_found", msg.clone(), None),
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone(), None),
            ApiError::ValidationError { field, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(field.clone()),
                );
                ("validation_error", message.clone(), Some(details))
            }
            ApiError::InvalidImage(msg) => ("invalid_image", msg.clone(), None),
            ApiError::PayloadTooLarge(msg) => ("payload_too_large", msg.clone(), None),
            ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg.clone(), None),
            ApiError::OcrUnavailable { program, reason } => {
                let mut details = HashMap::new();
                details.insert(
                    "program".to_string(),
                    serde_json::Value::String(program.clone()),
                );
                details.insert(
                    "hint".to_string(),
                    serde_json::Value::String(OCR_INSTALL_HINT.to_string()),
                );
                (
                    "ocr_unavailable",
                    format!("OCR engine '{}' is unavailable: {}", program, reason),
                    Some(details),
                )
            }
            ApiError::InternalError(msg) => ("internal_error", msg.clone(), None),
        };

        ErrorResponse {
            error_type: error_type.to_string(),
            message,
            details,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::InvalidRequest(_) | ApiError::ValidationError { .. } | ApiError::InvalidImage(_) => 400,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::ServiceUnavailable(_) | ApiError::OcrUnavailable { .. } => 503,
            ApiError::InternalError(_) => 500,
        }
    }
}

impl From<ToolkitError> for ApiError {
    fn from(err: ToolkitError) -> Self {
        match err {
            ToolkitError::Image(e) => ApiError::InvalidImage(e.to_string()),
            ToolkitError::OcrEngineUnavailable { program, reason } => {
                ApiError::OcrUnavailable { program, reason }
            }
            ToolkitError::InvalidConfig { field, message } => ApiError::ValidationError { field, message },
            e @ (ToolkitError::ModelNotFound { .. } | ToolkitError::ModelNeedsConversion { .. }) => {
                ApiError::ServiceUnavailable(e.to_string())
            }
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::InvalidImage(msg) => write!(f, "Invalid image: {}", msg),
            ApiError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::OcrUnavailable { program, reason } => {
                write!(f, "OCR engine '{}' is unavailable: {}", program, reason)
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}
