use crate::detection::preprocessing::Letterbox;
use crate::error::InferenceError;
use crate::models::{BoundingBox, Detection, SpermClass};

/// Number of classes the detector head must produce
pub const CLASS_COUNT: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct DecodeParams {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
}

/// Decode a YOLOv8 head output laid out row-major as `[4 + classes, anchors]`.
///
/// Rows 0..4 hold `cx, cy, w, h` in model input pixels, the remaining rows
/// hold one score per class.
pub fn decode_predictions(
    output: &[f32],
    rows: usize,
    anchors: usize,
    letterbox: &Letterbox,
    params: &DecodeParams,
) -> Result<Vec<Detection>, InferenceError> {
    if rows != 4 + CLASS_COUNT {
        return Err(InferenceError::UnexpectedOutput(format!(
            "expected {} rows (4 box + {} classes), got {}",
            4 + CLASS_COUNT,
            CLASS_COUNT,
            rows
        )));
    }
    if output.len() != rows * anchors {
        return Err(InferenceError::UnexpectedOutput(format!(
            "output has {} values, expected {}x{}",
            output.len(),
            rows,
            anchors
        )));
    }

    let at = |row: usize, anchor: usize| output[row * anchors + anchor];
    let (src_w, src_h) = (letterbox.source_width as f32, letterbox.source_height as f32);

    let mut candidates = Vec::new();
    for anchor in 0..anchors {
        let (best_class, best_score) = (0..CLASS_COUNT)
            .map(|class| (class, at(4 + class, anchor)))
            .fold((0, f32::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });

        if best_score < params.confidence_threshold {
            continue;
        }
        let Some(class) = SpermClass::from_index(best_class) else {
            continue;
        };

        let input_box = BoundingBox::from_center(
            at(0, anchor),
            at(1, anchor),
            at(2, anchor),
            at(3, anchor),
        );
        let (x1, y1) = letterbox.to_source(input_box.x1, input_box.y1);
        let (x2, y2) = letterbox.to_source(input_box.x2, input_box.y2);
        let bbox = BoundingBox { x1, y1, x2, y2 }.clamp(src_w, src_h);

        candidates.push(Detection::new(class, best_score).with_bbox(bbox));
    }

    Ok(non_max_suppression(candidates, params.iou_threshold, params.max_detections))
}

/// Greedy per-class suppression, highest confidence first
pub fn non_max_suppression(
    mut candidates: Vec<Detection>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Detection> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Detection> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let overlaps = kept.iter().any(|k| {
            k.class == candidate.class
                && match (&k.bbox, &candidate.bbox) {
                    (Some(a), Some(b)) => a.iou(b) > iou_threshold,
                    _ => false,
                }
        });
        if !overlaps {
            kept.push(candidate);
        }
    }
    kept
}
