use std::collections::HashMap;

use anyhow::Result;

use crate::detection::preprocessing::Letterboxed;
use crate::models::{BoundingBox, Classification, Detection};

/// Decode a YOLOv8 detection head laid out as `[4 + classes, anchors]`
/// (center x, center y, width, height, then one score per class).
pub fn decode_boxes(
    output: &[f32],
    channels: usize,
    anchors: usize,
    confidence_threshold: f32,
    letterbox: &Letterboxed,
    image_size: (u32, u32),
) -> Result<Vec<Detection>> {
    if channels <= 4 {
        anyhow::bail!("Detector output has {} channels, expected more than 4", channels);
    }
    if output.len() != channels * anchors {
        anyhow::bail!(
            "Detector output has {} values, expected {}x{}",
            output.len(),
            channels,
            anchors
        );
    }

    let at = |channel: usize, anchor: usize| output[channel * anchors + anchor];
    let mut detections = Vec::new();

    for i in 0..anchors {
        let mut best_class = 0;
        let mut best_confidence = 0.0f32;
        for class in 0..channels - 4 {
            let confidence = at(4 + class, i);
            if confidence > best_confidence {
                best_confidence = confidence;
                best_class = class;
            }
        }

        if best_confidence < confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (at(0, i), at(1, i), at(2, i), at(3, i));
        let (x1, y1) = letterbox.unmap(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.unmap(cx + w / 2.0, cy + h / 2.0);

        detections.push(Detection {
            class_index: best_class,
            confidence: best_confidence,
            bbox: BoundingBox { x1, y1, x2, y2 }.clamp_to(image_size.0, image_size.1),
        });
    }

    Ok(detections)
}

/// Per-class non-maximum suppression; result sorted by confidence, capped at `max_detections`
pub fn nms(detections: Vec<Detection>, iou_threshold: f32, max_detections: usize) -> Vec<Detection> {
    let mut class_groups: HashMap<usize, Vec<Detection>> = HashMap::new();
    for detection in detections {
        class_groups
            .entry(detection.class_index)
            .or_default()
            .push(detection);
    }

    let mut kept = Vec::new();
    for (_, mut group) in class_groups {
        group.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        let mut suppressed = vec![false; group.len()];

        for i in 0..group.len() {
            if suppressed[i] {
                continue;
            }
            for j in (i + 1)..group.len() {
                if !suppressed[j] && group[i].bbox.iou(&group[j].bbox) > iou_threshold {
                    suppressed[j] = true;
                }
            }
            kept.push(group[i].clone());
        }
    }

    kept.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    kept.truncate(max_detections);
    kept
}

/// Top-1 class of a classifier output row. Logits are softmaxed first;
/// rows that already sum to one are taken as probabilities.
pub fn top1(row: &[f32]) -> Result<Classification> {
    if row.is_empty() {
        anyhow::bail!("Classifier returned no classes");
    }

    let sum: f32 = row.iter().sum();
    let is_distribution = row.iter().all(|p| (0.0..=1.0).contains(p)) && (sum - 1.0).abs() < 1e-3;
    let probabilities = if is_distribution {
        row.to_vec()
    } else {
        softmax(row)
    };

    let (class_index, confidence) = probabilities
        .iter()
        .copied()
        .enumerate()
        .fold((0, f32::MIN), |best, (i, p)| if p > best.1 { (i, p) } else { best });

    Ok(Classification {
        class_index,
        confidence,
    })
}

fn softmax(row: &[f32]) -> Vec<f32> {
    let max = row.iter().copied().fold(f32::MIN, f32::max);
    let exps: Vec<f32> = row.iter().map(|v| (v - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
