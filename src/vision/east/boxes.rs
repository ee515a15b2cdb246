// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Oriented text boxes produced by the EAST decoder

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in floating point pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxRect {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl BoxRect {
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn width(&self) -> f32 {
        (self.x_max - self.x_min).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y_max - self.y_min).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// Intersection over Union with another rectangle
    pub fn iou(&self, other: &BoxRect) -> f32 {
        let inter_x1 = self.x_min.max(other.x_min);
        let inter_y1 = self.y_min.max(other.y_min);
        let inter_x2 = self.x_max.min(other.x_max);
        let inter_y2 = self.y_max.min(other.y_max);

        let inter_area = (inter_x2 - inter_x1).max(0.0) * (inter_y2 - inter_y1).max(0.0);
        let union_area = self.area() + other.area() - inter_area;

        if union_area <= 0.0 {
            0.0
        } else {
            inter_area / union_area
        }
    }
}

/// A detected text region: an oriented rectangle plus its score
///
/// `angle` follows the EAST geometry convention: the box's horizontal axis
/// points along `(cos angle, -sin angle)` in image coordinates (y down), so a
/// positive angle is text rising to the right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionBox {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
    /// Rotation in radians
    pub angle: f32,
    /// Detection confidence (0.0-1.0)
    pub confidence: f32,
}

impl DetectionBox {
    /// Build a box from one EAST output cell
    ///
    /// `distances` are the predicted distances from the cell origin to the
    /// top, right, bottom and left edges. `origin` is the cell position in
    /// input pixels.
    pub fn from_geometry(origin: (f32, f32), distances: [f32; 4], angle: f32, confidence: f32) -> Self {
        let [top, right, bottom, left] = distances;
        let (sin, cos) = angle.sin_cos();
        let height = top + bottom;
        let width = right + left;

        // Bottom-right corner of the rotated rectangle
        let end_x = origin.0 + cos * right + sin * bottom;
        let end_y = origin.1 - sin * right + cos * bottom;

        Self {
            center_x: end_x - (width / 2.0) * cos - (height / 2.0) * sin,
            center_y: end_y + (width / 2.0) * sin - (height / 2.0) * cos,
            width,
            height,
            angle,
            confidence,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.center_x.is_finite()
            && self.center_y.is_finite()
            && self.angle.is_finite()
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Unit vectors along the box's width and height
    fn axes(&self) -> ((f32, f32), (f32, f32)) {
        let (sin, cos) = self.angle.sin_cos();
        ((cos, -sin), (sin, cos))
    }

    /// Corners in order: top-left, top-right, bottom-right, bottom-left
    pub fn corners(&self) -> [[f32; 2]; 4] {
        let (u, v) = self.axes();
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        let corner = |su: f32, sv: f32| {
            [
                self.center_x + su * hw * u.0 + sv * hh * v.0,
                self.center_y + su * hw * u.1 + sv * hh * v.1,
            ]
        };
        [
            corner(-1.0, -1.0),
            corner(1.0, -1.0),
            corner(1.0, 1.0),
            corner(-1.0, 1.0),
        ]
    }

    /// Axis-aligned envelope of the rotated rectangle
    pub fn bounding_rect(&self) -> BoxRect {
        let corners = self.corners();
        let mut rect = BoxRect::new(f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
        for [x, y] in corners {
            rect.x_min = rect.x_min.min(x);
            rect.y_min = rect.y_min.min(y);
            rect.x_max = rect.x_max.max(x);
            rect.y_max = rect.y_max.max(y);
        }
        rect
    }

    /// Map the box into a space scaled by `ratio_w` horizontally and `ratio_h` vertically
    pub fn rescale(&self, ratio_w: f32, ratio_h: f32) -> Self {
        let (sin, cos) = self.angle.sin_cos();
        let width_scale = ((ratio_w * cos).powi(2) + (ratio_h * sin).powi(2)).sqrt();
        let height_scale = ((ratio_w * sin).powi(2) + (ratio_h * cos).powi(2)).sqrt();

        Self {
            center_x: self.center_x * ratio_w,
            center_y: self.center_y * ratio_h,
            width: self.width * width_scale,
            height: self.height * height_scale,
            angle: (ratio_h * sin).atan2(ratio_w * cos),
            confidence: self.confidence,
        }
    }
}
