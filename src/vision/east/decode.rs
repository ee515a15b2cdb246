// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decoding of EAST score and geometry maps into candidate boxes

use ndarray::{Array2, Array3, ArrayViewD, Ix4};

use super::boxes::DetectionBox;
use super::preprocessing::TensorLayout;
use crate::errors::{Result, ToolkitError};

/// Input pixels covered by one cell of the output maps
pub const EAST_CELL_SIZE: f32 = 4.0;

/// Channels in the geometry map: top, right, bottom, left, angle
pub const GEOMETRY_CHANNELS: usize = 5;

/// Network output in a layout-independent form
#[derive(Debug, Clone)]
pub struct EastOutput {
    /// Text probability per cell, `[rows, cols]`
    pub scores: Array2<f32>,
    /// Edge distances and angle per cell, `[5, rows, cols]`
    pub geometry: Array3<f32>,
}

impl EastOutput {
    pub fn new(scores: Array2<f32>, geometry: Array3<f32>) -> Result<Self> {
        let (rows, cols) = scores.dim();
        if geometry.dim() != (GEOMETRY_CHANNELS, rows, cols) {
            return Err(ToolkitError::Inference(format!(
                "geometry map shape {:?} does not match score map {:?}",
                geometry.shape(),
                scores.shape()
            )));
        }
        Ok(Self { scores, geometry })
    }

    /// Convert raw `[1, ...]` output tensors in the given layout
    pub fn from_raw(
        scores: ArrayViewD<'_, f32>,
        geometry: ArrayViewD<'_, f32>,
        layout: TensorLayout,
    ) -> Result<Self> {
        let scores = scores.into_dimensionality::<Ix4>().map_err(|e| {
            ToolkitError::Inference(format!("score map must be 4-dimensional: {e}"))
        })?;
        let geometry = geometry.into_dimensionality::<Ix4>().map_err(|e| {
            ToolkitError::Inference(format!("geometry map must be 4-dimensional: {e}"))
        })?;

        let (rows, cols) = match layout {
            TensorLayout::Nhwc => (scores.shape()[1], scores.shape()[2]),
            TensorLayout::Nchw => (scores.shape()[2], scores.shape()[3]),
        };

        if channel_count(scores.shape(), layout) != Some(1) {
            return Err(ToolkitError::Inference(format!(
                "score map has unexpected shape {:?}",
                scores.shape()
            )));
        }
        if channel_count(geometry.shape(), layout) != Some(GEOMETRY_CHANNELS) {
            return Err(ToolkitError::Inference(format!(
                "geometry map has unexpected shape {:?}",
                geometry.shape()
            )));
        }

        let score_map = match layout {
            TensorLayout::Nhwc => Array2::from_shape_fn((rows, cols), |(y, x)| scores[[0, y, x, 0]]),
            TensorLayout::Nchw => Array2::from_shape_fn((rows, cols), |(y, x)| scores[[0, 0, y, x]]),
        };

        let geometry_map = match layout {
            TensorLayout::Nhwc => {
                let (g_rows, g_cols) = (geometry.shape()[1], geometry.shape()[2]);
                Array3::from_shape_fn((GEOMETRY_CHANNELS, g_rows, g_cols), |(c, y, x)| {
                    geometry[[0, y, x, c]]
                })
            }
            TensorLayout::Nchw => geometry.index_axis(ndarray::Axis(0), 0).to_owned(),
        };

        Self::new(score_map, geometry_map)
    }

    pub fn rows(&self) -> usize {
        self.scores.nrows()
    }

    pub fn cols(&self) -> usize {
        self.scores.ncols()
    }
}

/// Channel count of a 4-D tensor shape in the given layout
pub fn channel_count(shape: &[usize], layout: TensorLayout) -> Option<usize> {
    if shape.len() != 4 || shape[0] != 1 {
        return None;
    }
    Some(match layout {
        TensorLayout::Nhwc => shape[3],
        TensorLayout::Nchw => shape[1],
    })
}

/// Turn every cell scoring at least `min_confidence` into a box
///
/// Boxes are emitted in row-major cell order, in detector input coordinates.
pub fn decode_predictions(output: &EastOutput, min_confidence: f32) -> Vec<DetectionBox> {
    let mut boxes = Vec::new();

    for ((y, x), &score) in output.scores.indexed_iter() {
        if !(score >= min_confidence) {
            continue;
        }

        let distances = [
            output.geometry[[0, y, x]],
            output.geometry[[1, y, x]],
            output.geometry[[2, y, x]],
            output.geometry[[3, y, x]],
        ];
        let angle = output.geometry[[4, y, x]];
        let origin = (x as f32 * EAST_CELL_SIZE, y as f32 * EAST_CELL_SIZE);

        let candidate = DetectionBox::from_geometry(origin, distances, angle, score);
        if candidate.is_valid() {
            boxes.push(candidate);
        }
    }

    boxes
}
