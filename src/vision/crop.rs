// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Cropping detected regions out of the original image and preparing them for OCR

use image::{DynamicImage, GenericImageView, GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use imageproc::contrast::otsu_level;
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::east::{Detection, DetectionBox};
use crate::config::CropConfig;

/// Angles below this (radians) are treated as axis aligned when deskewing
const DESKEW_MIN_ANGLE: f32 = 0.01;

/// A clamped, axis-aligned region of the original image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Detected box, in original image coordinates
    pub source: DetectionBox,
}

impl CropRegion {
    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }
}

/// Pad, round and clamp the envelope of `source` to an image of the given size
///
/// Returns `None` when nothing of the box is left inside the image.
pub fn region_for_box(source: DetectionBox, padding: u32, image_width: u32, image_height: u32) -> Option<CropRegion> {
    let rect = source.bounding_rect();
    let pad = padding as f32;

    let x_min = (rect.x_min - pad).round().max(0.0);
    let y_min = (rect.y_min - pad).round().max(0.0);
    let x_max = (rect.x_max + pad).round().min(image_width as f32);
    let y_max = (rect.y_max + pad).round().min(image_height as f32);

    if !(x_max > x_min && y_max > y_min) {
        return None;
    }

    Some(CropRegion {
        x: x_min as u32,
        y: y_min as u32,
        width: (x_max - x_min) as u32,
        height: (y_max - y_min) as u32,
        source,
    })
}

/// Map every detected box onto the original image and cut it out
///
/// Regions keep the order of `detection.boxes`. Boxes that collapse to zero
/// width or height after clamping are dropped.
pub fn crop_regions(image: &DynamicImage, detection: &Detection, config: &CropConfig) -> Vec<(CropRegion, DynamicImage)> {
    let (width, height) = image.dimensions();
    let mut crops = Vec::with_capacity(detection.boxes.len());

    for original in detection.boxes_in_original() {
        let (cx, cy) = (original.center_x, original.center_y);
        let Some(region) = region_for_box(original, config.padding, width, height) else {
            debug!("Dropping degenerate region centred at ({cx:.1}, {cy:.1})");
            continue;
        };

        let crop = if config.deskew && region.source.angle.abs() > DESKEW_MIN_ANGLE {
            deskew_region(image, &region.source, config.padding)
                .unwrap_or_else(|| image.crop_imm(region.x, region.y, region.width, region.height))
        } else {
            image.crop_imm(region.x, region.y, region.width, region.height)
        };

        crops.push((region, crop));
    }

    crops
}

/// Resample the rotated rectangle of `source` into an upright image
///
/// Pixels outside the original image are filled with white. Returns `None`
/// when a side of the padded box is longer than the image diagonal plus
/// padding, so callers fall back to the clamped envelope crop.
pub fn deskew_region(image: &DynamicImage, source: &DetectionBox, padding: u32) -> Option<DynamicImage> {
    let pad = padding as f32;
    let padded = DetectionBox {
        width: source.width + 2.0 * pad,
        height: source.height + 2.0 * pad,
        ..source.clone()
    };

    let (width, height) = image.dimensions();
    let max_side = (width as f32).hypot(height as f32) + 2.0 * pad;
    let fits = |side: f32| side.is_finite() && side <= max_side;
    if !fits(padded.width) || !fits(padded.height) {
        debug!(
            "Deskew skipped for {:.0}x{:.0} box on {width}x{height} image",
            padded.width, padded.height
        );
        return None;
    }

    let out_w = padded.width.round() as u32;
    let out_h = padded.height.round() as u32;
    if out_w == 0 || out_h == 0 {
        return None;
    }

    let [tl, tr, br, bl] = padded.corners();
    let from = [(tl[0], tl[1]), (tr[0], tr[1]), (br[0], br[1]), (bl[0], bl[1])];
    let to = [
        (0.0, 0.0),
        (out_w as f32, 0.0),
        (out_w as f32, out_h as f32),
        (0.0, out_h as f32),
    ];
    let projection = Projection::from_control_points(from, to)?;

    let rgb = image.to_rgb8();
    let mut out: RgbImage = ImageBuffer::new(out_w, out_h);
    warp_into(&rgb, &projection, Interpolation::Bilinear, Rgb([255, 255, 255]), &mut out);

    Some(DynamicImage::ImageRgb8(out))
}

/// Grayscale, upscale short crops and binarize with Otsu's threshold
pub fn preprocess_for_ocr(crop: &DynamicImage, min_text_height: u32) -> DynamicImage {
    let mut gray = crop.to_luma8();

    if min_text_height > 0 && gray.height() > 0 && gray.height() < min_text_height {
        let factor = min_text_height as f32 / gray.height() as f32;
        let new_width = ((gray.width() as f32 * factor).round() as u32).max(1);
        gray = image::imageops::resize(&gray, new_width, min_text_height, image::imageops::FilterType::Triangle);
    }

    DynamicImage::ImageLuma8(binarize(&gray))
}

fn binarize(gray: &GrayImage) -> GrayImage {
    let threshold_value = otsu_level(gray);

    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] > threshold_value {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}
