// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Drawing detected regions onto a copy of the input image

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use super::crop::CropRegion;

/// Outline colour for detected regions
pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Outline thickness in pixels
pub const BOX_THICKNESS: u32 = 2;

/// Return an RGB copy of `image` with every region outlined
pub fn draw_regions(image: &DynamicImage, regions: &[CropRegion]) -> DynamicImage {
    let mut canvas: RgbImage = image.to_rgb8();
    let (img_width, img_height) = image.dimensions();

    for region in regions {
        for thickness in 0..BOX_THICKNESS {
            // Grow inwards so the outline never leaves the image
            let inset = thickness * 2;
            if region.width <= inset || region.height <= inset {
                break;
            }
            let rect = Rect::at((region.x + thickness) as i32, (region.y + thickness) as i32)
                .of_size(region.width - inset, region.height - inset);
            if region.x + region.width <= img_width && region.y + region.height <= img_height {
                draw_hollow_rect_mut(&mut canvas, rect, BOX_COLOR);
            }
        }
    }

    DynamicImage::ImageRgb8(canvas)
}
