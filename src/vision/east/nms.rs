// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Greedy non-maximum suppression over detection boxes

use std::cmp::Ordering;

use super::boxes::{BoxRect, DetectionBox};

/// Keep the highest scoring boxes, dropping any box whose envelope overlaps
/// an already kept box by more than `iou_threshold`
///
/// Overlap is measured on axis-aligned envelopes. Output is ordered by
/// descending confidence; equal scores keep their input order.
pub fn non_max_suppression(boxes: &[DetectionBox], iou_threshold: f32) -> Vec<DetectionBox> {
    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by(|&a, &b| {
        boxes[b]
            .confidence
            .partial_cmp(&boxes[a].confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut kept: Vec<DetectionBox> = Vec::new();
    let mut kept_rects: Vec<BoxRect> = Vec::new();

    for idx in order {
        let candidate = &boxes[idx];
        let rect = candidate.bounding_rect();
        let suppressed = kept_rects.iter().any(|other| rect.iou(other) > iou_threshold);
        if !suppressed {
            kept_rects.push(rect);
            kept.push(candidate.clone());
        }
    }

    kept
}
