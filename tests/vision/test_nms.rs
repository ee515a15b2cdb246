// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Properties of non-maximum suppression over clustered detections

use text_extraction_toolkit::vision::east::{non_max_suppression, DetectionBox};

/// Deterministic clustered boxes, several candidates per word like EAST emits
fn clustered_boxes() -> Vec<DetectionBox> {
    let mut seed: u32 = 0x5eed;
    let mut next = move || {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        (seed >> 16) as f32 / 65_535.0
    };

    let words = [(60.0, 40.0), (200.0, 42.0), (120.0, 150.0), (250.0, 260.0)];
    let mut boxes = Vec::new();
    for (cx, cy) in words {
        for _ in 0..6 {
            boxes.push(DetectionBox {
                center_x: cx + (next() - 0.5) * 12.0,
                center_y: cy + (next() - 0.5) * 6.0,
                width: 70.0 + next() * 20.0,
                height: 18.0 + next() * 6.0,
                angle: (next() - 0.5) * 0.2,
                confidence: 0.5 + next() * 0.5,
            });
        }
    }
    boxes
}

#[test]
fn test_one_box_per_word() {
    let kept = non_max_suppression(&clustered_boxes(), 0.3);
    assert_eq!(kept.len(), 4);
}

#[test]
fn test_kept_boxes_never_overlap_beyond_threshold() {
    for threshold in [0.1, 0.3, 0.5, 0.7] {
        let kept = non_max_suppression(&clustered_boxes(), threshold);
        for (i, a) in kept.iter().enumerate() {
            for b in &kept[i + 1..] {
                let iou = a.bounding_rect().iou(&b.bounding_rect());
                assert!(iou <= threshold, "IoU {iou} above threshold {threshold}");
            }
        }
    }
}

#[test]
fn test_suppression_is_idempotent() {
    let once = non_max_suppression(&clustered_boxes(), 0.3);
    let twice = non_max_suppression(&once, 0.3);
    assert_eq!(once, twice);
}

#[test]
fn test_raising_confidence_threshold_never_adds_boxes() {
    let boxes = clustered_boxes();
    let all_kept = non_max_suppression(&boxes, 0.3);
    let mut previous = usize::MAX;

    for step in 5..=10 {
        let min_confidence = step as f32 / 10.0;
        let candidates: Vec<DetectionBox> =
            boxes.iter().filter(|b| b.confidence >= min_confidence).cloned().collect();
        let kept = non_max_suppression(&candidates, 0.3);

        assert!(kept.len() <= previous, "min confidence {min_confidence} kept {} > {previous}", kept.len());
        // Survivors are exactly the unfiltered survivors above the threshold
        let expected: Vec<DetectionBox> =
            all_kept.iter().filter(|b| b.confidence >= min_confidence).cloned().collect();
        assert_eq!(kept, expected);
        previous = kept.len();
    }
}

#[test]
fn test_threshold_of_one_keeps_everything() {
    let boxes = clustered_boxes();
    assert_eq!(non_max_suppression(&boxes, 1.0).len(), boxes.len());
}

#[test]
fn test_output_is_subset_sorted_by_confidence() {
    let boxes = clustered_boxes();
    let kept = non_max_suppression(&boxes, 0.3);

    assert!(kept.iter().all(|k| boxes.contains(k)));
    assert!(kept.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    let best = boxes.iter().map(|b| b.confidence).fold(f32::MIN, f32::max);
    assert_eq!(kept[0].confidence, best);
}

#[test]
fn test_empty_input() {
    assert!(non_max_suppression(&[], 0.3).is_empty());
}
