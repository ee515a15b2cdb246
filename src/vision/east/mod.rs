// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! EAST scene text detection
//!
//! Finds word and line level text regions in natural images:
//! - `preprocessing`: resize and mean subtraction into the network tensor
//! - `model`: ONNX Runtime session around the EAST graph
//! - `decode`: score and geometry maps to oriented boxes
//! - `nms`: overlap suppression
//! - `detector`: the [`TextDetector`] seam used by the pipeline

pub mod boxes;
pub mod decode;
pub mod detector;
pub mod model;
pub mod nms;
pub mod preprocessing;

pub use boxes::{BoxRect, DetectionBox};
pub use decode::{decode_predictions, EastOutput, EAST_CELL_SIZE};
pub use detector::{Detection, DetectionParams, EastDetector, TextDetector};
pub use model::EastModel;
pub use nms::non_max_suppression;
pub use preprocessing::{preprocess_for_east, ScaleInfo, TensorLayout, EAST_MEAN};
