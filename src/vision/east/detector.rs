// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text detection front end: preprocessing, inference, decoding and NMS

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::boxes::DetectionBox;
use super::decode::decode_predictions;
use super::model::EastModel;
use super::nms::non_max_suppression;
use super::preprocessing::{preprocess_for_east, ScaleInfo};
use crate::config::DetectionConfig;
use crate::errors::{Result, ToolkitError};

/// Per-call detection thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionParams {
    /// Minimum score for a cell to become a candidate box
    pub min_confidence: f32,
    /// IoU above which a lower scoring box is suppressed
    pub nms_threshold: f32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            nms_threshold: 0.3,
        }
    }
}

impl From<&DetectionConfig> for DetectionParams {
    fn from(config: &DetectionConfig) -> Self {
        Self {
            min_confidence: config.min_confidence,
            nms_threshold: config.nms_threshold,
        }
    }
}

impl DetectionParams {
    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ToolkitError::invalid_config(
                "min_confidence",
                format!("must be between 0 and 1, got {}", self.min_confidence),
            ));
        }
        if !(0.0..=1.0).contains(&self.nms_threshold) {
            return Err(ToolkitError::invalid_config(
                "nms_threshold",
                format!("must be between 0 and 1, got {}", self.nms_threshold),
            ));
        }
        Ok(())
    }
}

/// Result of running the detector on one image
#[derive(Debug, Clone)]
pub struct Detection {
    /// Surviving boxes in detector input coordinates, highest confidence first
    pub boxes: Vec<DetectionBox>,
    pub scale: ScaleInfo,
}

impl Detection {
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Boxes mapped back onto the original image
    pub fn boxes_in_original(&self) -> Vec<DetectionBox> {
        self.boxes
            .iter()
            .map(|b| b.rescale(self.scale.ratio_w, self.scale.ratio_h))
            .collect()
    }
}

/// Anything that can locate text regions in an image
pub trait TextDetector: Send + Sync {
    fn detect(&self, image: &DynamicImage, params: &DetectionParams) -> Result<Detection>;
}

/// EAST based detector
#[derive(Debug, Clone)]
pub struct EastDetector {
    model: EastModel,
}

impl EastDetector {
    pub fn new(model: EastModel) -> Self {
        Self { model }
    }

    pub fn load(config: &DetectionConfig) -> Result<Self> {
        Ok(Self::new(EastModel::load(config)?))
    }
}

impl TextDetector for EastDetector {
    fn detect(&self, image: &DynamicImage, params: &DetectionParams) -> Result<Detection> {
        params.validate()?;
        let start = Instant::now();

        let (input_width, input_height) = self.model.input_size();
        let (tensor, scale) =
            preprocess_for_east(image, input_width, input_height, self.model.layout());

        let output = self.model.forward(tensor)?;
        let candidates = decode_predictions(&output, params.min_confidence);
        let candidate_count = candidates.len();
        let boxes = non_max_suppression(&candidates, params.nms_threshold);

        debug!(
            "EAST detection: {} candidates, {} after NMS in {}ms",
            candidate_count,
            boxes.len(),
            start.elapsed().as_millis()
        );

        Ok(Detection { boxes, scale })
    }
}
