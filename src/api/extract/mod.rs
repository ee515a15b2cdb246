// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Extraction API endpoint module
//!
//! Provides POST /v1/extract (JSON) and POST /v1/extract/upload (multipart).

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{extract_handler, extract_upload_handler};
pub use request::ExtractRequest;
pub use response::{BoundingBox, ExtractResponse, TextRegion};
