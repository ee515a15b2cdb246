// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the EAST detector

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use ndarray::Array4;
use serde::{Deserialize, Serialize};

/// Per-channel RGB means subtracted from every pixel (no further scaling)
pub const EAST_MEAN: [f32; 3] = [123.68, 116.78, 103.94];

/// Memory layout of the network input and output tensors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// `[N, H, W, C]`, the layout of tf2onnx exports of the frozen graph
    #[default]
    Nhwc,
    /// `[N, C, H, W]`
    Nchw,
}

/// Mapping between original image coordinates and detector input coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleInfo {
    pub original_width: u32,
    pub original_height: u32,
    pub input_width: u32,
    pub input_height: u32,
    /// original_width / input_width
    pub ratio_w: f32,
    /// original_height / input_height
    pub ratio_h: f32,
}

impl ScaleInfo {
    pub fn new(original_width: u32, original_height: u32, input_width: u32, input_height: u32) -> Self {
        Self {
            original_width,
            original_height,
            input_width,
            input_height,
            ratio_w: original_width as f32 / input_width as f32,
            ratio_h: original_height as f32 / input_height as f32,
        }
    }

    /// Identity mapping, for images that are already at input size
    pub fn identity(width: u32, height: u32) -> Self {
        Self::new(width, height, width, height)
    }

    /// Map a point from detector input space back to original image space
    pub fn to_original(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.ratio_w, y * self.ratio_h)
    }
}

/// Resize to the fixed network input and build the normalized tensor
///
/// The image is stretched to `input_width x input_height` (aspect ratio is
/// recovered later through [`ScaleInfo`]), converted to RGB and mean
/// subtracted.
pub fn preprocess_for_east(
    image: &DynamicImage,
    input_width: u32,
    input_height: u32,
    layout: TensorLayout,
) -> (Array4<f32>, ScaleInfo) {
    let (orig_w, orig_h) = image.dimensions();
    let scale = ScaleInfo::new(orig_w, orig_h, input_width, input_height);

    let resized = if (orig_w, orig_h) == (input_width, input_height) {
        image.to_rgb8()
    } else {
        image
            .resize_exact(input_width, input_height, FilterType::Triangle)
            .to_rgb8()
    };

    let (h, w) = (input_height as usize, input_width as usize);
    let mut tensor = match layout {
        TensorLayout::Nhwc => Array4::zeros((1, h, w, 3)),
        TensorLayout::Nchw => Array4::zeros((1, 3, h, w)),
    };

    for (x, y, pixel) in resized.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for c in 0..3 {
            let value = pixel[c] as f32 - EAST_MEAN[c];
            match layout {
                TensorLayout::Nhwc => tensor[[0, y, x, c]] = value,
                TensorLayout::Nchw => tensor[[0, c, y, x]] = value,
            }
        }
    }

    (tensor, scale)
}
