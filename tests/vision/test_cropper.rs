// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Cropping detected boxes out of the original image

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use text_extraction_toolkit::config::CropConfig;
use text_extraction_toolkit::vision::east::{Detection, DetectionBox, ScaleInfo};
use text_extraction_toolkit::vision::{crop_regions, draw_regions, preprocess_for_ocr};

/// White page with a black "word" at x 100..220, y 60..92
fn page() -> DynamicImage {
    let mut img = RgbImage::from_pixel(400, 200, Rgb([255, 255, 255]));
    draw_filled_rect_mut(&mut img, Rect::at(100, 60).of_size(120, 32), Rgb([0, 0, 0]));
    DynamicImage::ImageRgb8(img)
}

fn word_box(angle: f32) -> DetectionBox {
    DetectionBox {
        center_x: 160.0,
        center_y: 76.0,
        width: 120.0,
        height: 32.0,
        angle,
        confidence: 0.9,
    }
}

fn detection(boxes: Vec<DetectionBox>, original: (u32, u32)) -> Detection {
    Detection {
        boxes,
        scale: ScaleInfo::identity(original.0, original.1),
    }
}

fn dark_fraction(img: &DynamicImage) -> f32 {
    let gray = img.to_luma8();
    let dark = gray.pixels().filter(|p| p[0] < 128).count();
    dark as f32 / (gray.width() * gray.height()) as f32
}

#[test]
fn test_crop_covers_word_plus_padding() {
    let img = page();
    let crops = crop_regions(&img, &detection(vec![word_box(0.0)], img.dimensions()), &CropConfig::default());

    assert_eq!(crops.len(), 1);
    let (region, crop) = &crops[0];
    assert_eq!((region.x, region.y), (95, 55));
    assert_eq!((region.width, region.height), (130, 42));
    assert_eq!(crop.dimensions(), (130, 42));

    // Word fills the middle, padding stays white
    let rgb = crop.to_rgb8();
    assert_eq!(rgb.get_pixel(65, 21), &Rgb([0, 0, 0]));
    assert_eq!(rgb.get_pixel(1, 1), &Rgb([255, 255, 255]));
}

#[test]
fn test_boxes_from_resized_input_land_on_original() {
    let img = page();
    // Same word as seen by a 320x320 detector input
    let scaled = DetectionBox {
        center_x: 160.0 * 320.0 / 400.0,
        center_y: 76.0 * 320.0 / 200.0,
        width: 120.0 * 320.0 / 400.0,
        height: 32.0 * 320.0 / 200.0,
        angle: 0.0,
        confidence: 0.9,
    };
    let detection = Detection {
        boxes: vec![scaled],
        scale: ScaleInfo::new(400, 200, 320, 320),
    };

    let crops = crop_regions(&img, &detection, &CropConfig { padding: 0, ..CropConfig::default() });
    let (region, _) = &crops[0];
    assert_eq!((region.x, region.y, region.width, region.height), (100, 60, 120, 32));
}

#[test]
fn test_edge_boxes_are_clamped_and_outside_boxes_dropped() {
    let img = page();
    let edge = DetectionBox {
        center_x: 390.0,
        center_y: 195.0,
        ..word_box(0.0)
    };
    let outside = DetectionBox {
        center_x: 900.0,
        center_y: 900.0,
        ..word_box(0.0)
    };

    let crops = crop_regions(&img, &detection(vec![edge, outside], img.dimensions()), &CropConfig::default());
    assert_eq!(crops.len(), 1);

    let (region, crop) = &crops[0];
    assert!(region.x + region.width <= 400);
    assert!(region.y + region.height <= 200);
    assert_eq!(crop.dimensions(), (region.width, region.height));
}

#[test]
fn test_deskew_straightens_rotated_word() {
    // Draw the word rotated by 0.3 rad, then crop it back upright
    let angle = 0.3_f32;
    let rotated = word_box(angle);
    let mut img = RgbImage::from_pixel(400, 200, Rgb([255, 255, 255]));
    let corners = rotated.corners();
    let polygon: Vec<imageproc::point::Point<i32>> = corners
        .iter()
        .map(|[x, y]| imageproc::point::Point::new(x.round() as i32, y.round() as i32))
        .collect();
    imageproc::drawing::draw_polygon_mut(&mut img, &polygon, Rgb([0, 0, 0]));
    let img = DynamicImage::ImageRgb8(img);

    let config = CropConfig {
        deskew: true,
        padding: 0,
        ..CropConfig::default()
    };
    let crops = crop_regions(&img, &detection(vec![rotated.clone()], img.dimensions()), &config);
    let (_, upright) = &crops[0];

    assert_eq!(upright.dimensions(), (120, 32));
    assert!(dark_fraction(upright) > 0.8, "deskewed crop should be mostly text");

    // Without deskew the envelope includes white corners
    let envelope = crop_regions(
        &img,
        &detection(vec![rotated], img.dimensions()),
        &CropConfig { padding: 0, ..CropConfig::default() },
    );
    assert!(dark_fraction(&envelope[0].1) < dark_fraction(upright));
}

#[test]
fn test_ocr_preprocessing_binarizes_and_upscales() {
    let img = page();
    let crops = crop_regions(&img, &detection(vec![word_box(0.0)], img.dimensions()), &CropConfig::default());
    let prepared = preprocess_for_ocr(&crops[0].1, 64).to_luma8();

    assert_eq!(prepared.height(), 64);
    assert!(prepared.pixels().all(|p| p[0] == 0 || p[0] == 255));
}

#[test]
fn test_annotation_outlines_crop_regions() {
    let img = page();
    let crops = crop_regions(&img, &detection(vec![word_box(0.0)], img.dimensions()), &CropConfig::default());
    let regions: Vec<_> = crops.into_iter().map(|(region, _)| region).collect();

    let annotated = draw_regions(&img, &regions).to_rgb8();
    assert_eq!(annotated.dimensions(), (400, 200));
    assert_eq!(annotated.get_pixel(95, 55), &Rgb([0, 255, 0]));
    // Original is left untouched
    assert_eq!(img.to_rgb8().get_pixel(95, 55), &Rgb([255, 255, 255]));
}
