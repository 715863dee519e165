/// UltraFace detector using ONNX Runtime via `ort`.
///
/// Handles resize/normalize preprocessing, inference, confidence filtering,
/// and NMS post-processing. UltraFace emits per-anchor class scores and
/// corner-format boxes normalized to `[0, 1]`.
use std::path::Path;

use crate::detection::domain::face_box::FaceBox;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::constants::{
    FULL_RANGE_MODEL_NAME, FULL_RANGE_MODEL_URL, SHORT_RANGE_MODEL_NAME, SHORT_RANGE_MODEL_URL,
};
use crate::shared::frame::Frame;

/// Default confidence threshold for face detection.
pub const DEFAULT_CONFIDENCE: f64 = 0.6;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.3;

/// Pixel normalization: `(v - MEAN) / SCALE`, per the UltraFace model card.
const PIXEL_MEAN: f32 = 127.0;
const PIXEL_SCALE: f32 = 128.0;

/// Which UltraFace model to run.
///
/// Short-range (RFB-320) is tuned for selfie-distance faces; full-range
/// (RFB-640) handles smaller faces at a higher inference cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UltrafaceVariant {
    ShortRange,
    FullRange,
}

impl UltrafaceVariant {
    pub fn model_name(&self) -> &'static str {
        match self {
            UltrafaceVariant::ShortRange => SHORT_RANGE_MODEL_NAME,
            UltrafaceVariant::FullRange => FULL_RANGE_MODEL_NAME,
        }
    }

    pub fn model_url(&self) -> &'static str {
        match self {
            UltrafaceVariant::ShortRange => SHORT_RANGE_MODEL_URL,
            UltrafaceVariant::FullRange => FULL_RANGE_MODEL_URL,
        }
    }

    /// Human-readable variant name for logs and UI notes.
    pub fn label(&self) -> &'static str {
        match self {
            UltrafaceVariant::ShortRange => "short-range",
            UltrafaceVariant::FullRange => "full-range",
        }
    }

    /// Model input resolution `(width, height)`, used as a fallback when the
    /// loaded graph reports a dynamic shape.
    fn input_size(&self) -> (u32, u32) {
        match self {
            UltrafaceVariant::ShortRange => (320, 240),
            UltrafaceVariant::FullRange => (640, 480),
        }
    }
}

/// UltraFace detector backed by an ONNX Runtime session.
pub struct OnnxUltrafaceDetector {
    session: ort::session::Session,
    confidence: f64,
    input_width: u32,
    input_height: u32,
}

impl OnnxUltrafaceDetector {
    /// Load an UltraFace ONNX model and prepare for inference.
    ///
    /// The input resolution is read from the model's input shape (expecting
    /// NCHW). Falls back to the variant's published resolution if the shape
    /// is dynamic or unreadable.
    pub fn new(
        model_path: &Path,
        variant: UltrafaceVariant,
        confidence: f64,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;

        // Try to read input size from model metadata (NCHW: [1, 3, H, W])
        let (fallback_w, fallback_h) = variant.input_size();
        let (input_width, input_height) = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[2] > 0 && shape[3] > 0 {
                        Some((shape[3] as u32, shape[2] as u32))
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or((fallback_w, fallback_h));

        log::debug!("ultraface input resolution: {input_width}x{input_height}");

        Ok(Self {
            session,
            confidence,
            input_width,
            input_height,
        })
    }
}

impl FaceDetector for OnnxUltrafaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
        let fw = frame.width();
        let fh = frame.height();

        // 1. Preprocess: resize + normalize → NCHW float32
        let input_tensor = preprocess(frame, self.input_width, self.input_height);

        // 2. Inference
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() < 2 {
            return Err(format!(
                "UltraFace model expected 2 outputs, got {}",
                outputs.len()
            )
            .into());
        }

        // Outputs: scores [1, N, 2] and boxes [1, N, 4]. The published graphs
        // emit scores first; identify by trailing dimension to be safe.
        let first = outputs[0].try_extract_array::<f32>()?;
        let second = outputs[1].try_extract_array::<f32>()?;
        let (scores, boxes) = if first.shape().last() == Some(&2) {
            (first, second)
        } else {
            (second, first)
        };

        let score_shape = scores.shape();
        let box_shape = boxes.shape();
        if score_shape.len() != 3 || box_shape.len() != 3 || box_shape[2] != 4 {
            return Err(format!(
                "Unexpected UltraFace output shapes: scores {score_shape:?}, boxes {box_shape:?}"
            )
            .into());
        }
        let num_anchors = score_shape[1].min(box_shape[1]);

        let score_data = scores.as_slice().ok_or("Cannot get score slice")?;
        let box_data = boxes.as_slice().ok_or("Cannot get box slice")?;

        // 3. Decode + threshold, 4. NMS
        let mut raw_dets = decode_detections(score_data, box_data, num_anchors, self.confidence);
        let filtered = nms(&mut raw_dets, NMS_IOU_THRESH);

        // 5. Map normalized corners back to pixel coordinates, clamped
        Ok(to_face_boxes(&filtered, fw, fh))
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Resize a frame to the model resolution and normalize to `(v - 127) / 128`.
///
/// UltraFace does not letterbox: aspect ratio distortion is absorbed by the
/// normalized output coordinates, which map back through the original frame
/// dimensions.
fn preprocess(frame: &Frame, target_w: u32, target_h: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray(); // [H, W, C] u8
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let scale_x = src_w as f64 / target_w as f64;
    let scale_y = src_h as f64 / target_h as f64;

    let mut tensor =
        ndarray::Array4::<f32>::zeros((1, 3, target_h as usize, target_w as usize));

    // Nearest-neighbor resize straight into the tensor
    for y in 0..target_h as usize {
        let src_y = ((y as f64 * scale_y) as usize).min(src_h - 1);
        for x in 0..target_w as usize {
            let src_x = ((x as f64 * scale_x) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = (src[[src_y, src_x, c]] as f32 - PIXEL_MEAN) / PIXEL_SCALE;
            }
        }
    }

    tensor
}

// ---------------------------------------------------------------------------
// Postprocessing
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct RawDetection {
    // Normalized corner coordinates in [0, 1].
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    score: f64,
}

/// Decode per-anchor scores and boxes, keeping anchors whose face-class
/// probability meets the confidence threshold.
///
/// `score_data` is `[background, face]` pairs; `box_data` is
/// `[x1, y1, x2, y2]` normalized corners.
fn decode_detections(
    score_data: &[f32],
    box_data: &[f32],
    num_anchors: usize,
    confidence: f64,
) -> Vec<RawDetection> {
    let mut dets = Vec::new();
    for i in 0..num_anchors {
        let score_offset = i * 2;
        let box_offset = i * 4;
        if score_offset + 2 > score_data.len() || box_offset + 4 > box_data.len() {
            break;
        }

        let score = score_data[score_offset + 1] as f64;
        if score < confidence {
            continue;
        }

        dets.push(RawDetection {
            x1: box_data[box_offset] as f64,
            y1: box_data[box_offset + 1] as f64,
            x2: box_data[box_offset + 2] as f64,
            y2: box_data[box_offset + 3] as f64,
            score,
        });
    }
    dets
}

/// Greedy NMS: sort by score descending, suppress overlapping boxes.
fn nms(dets: &mut [RawDetection], iou_thresh: f64) -> Vec<RawDetection> {
    dets.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; dets.len()];

    for i in 0..dets.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(dets[i].clone());
        for j in (i + 1)..dets.len() {
            if suppressed[j] {
                continue;
            }
            let iou = corner_iou(
                &[dets[i].x1, dets[i].y1, dets[i].x2, dets[i].y2],
                &[dets[j].x1, dets[j].y1, dets[j].x2, dets[j].y2],
            );
            if iou > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}

fn corner_iou(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    inter / (area_a + area_b - inter)
}

/// Scale normalized detections to pixel coordinates, clamped to the frame.
/// Detections that collapse to zero size after clamping are dropped.
fn to_face_boxes(dets: &[RawDetection], frame_w: u32, frame_h: u32) -> Vec<FaceBox> {
    let fw = frame_w as f64;
    let fh = frame_h as f64;

    dets.iter()
        .filter_map(|d| {
            let x1 = (d.x1 * fw).clamp(0.0, fw);
            let y1 = (d.y1 * fh).clamp(0.0, fh);
            let x2 = (d.x2 * fw).clamp(0.0, fw);
            let y2 = (d.y2 * fh).clamp(0.0, fh);

            let x = x1.round() as i32;
            let y = y1.round() as i32;
            let width = (x2.round() as i32 - x).min(frame_w as i32 - x);
            let height = (y2.round() as i32 - y).min(frame_h as i32 - y);

            if width <= 0 || height <= 0 {
                return None;
            }
            Some(FaceBox {
                x,
                y,
                width,
                height,
                score: d.score,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(x1: f64, y1: f64, x2: f64, y2: f64, score: f64) -> RawDetection {
        RawDetection {
            x1,
            y1,
            x2,
            y2,
            score,
        }
    }

    #[test]
    fn test_preprocess_shape_and_normalization() {
        // Uniform 127 frame normalizes to ~0.0
        let data = vec![127u8; 100 * 50 * 3];
        let frame = Frame::new(data, 100, 50, 3);
        let tensor = preprocess(&frame, 320, 240);

        assert_eq!(tensor.shape(), &[1, 3, 240, 320]);
        assert!(tensor[[0, 0, 0, 0]].abs() < 0.01);
        assert!(tensor[[0, 2, 239, 319]].abs() < 0.01);
    }

    #[test]
    fn test_preprocess_value_range() {
        // 255 → (255-127)/128 = 1.0, 0 → (0-127)/128 ≈ -0.992
        let white = Frame::new(vec![255u8; 4 * 4 * 3], 4, 4, 3);
        let tensor = preprocess(&white, 320, 240);
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 0.01);

        let black = Frame::new(vec![0u8; 4 * 4 * 3], 4, 4, 3);
        let tensor = preprocess(&black, 320, 240);
        assert!((tensor[[0, 0, 0, 0]] + 127.0 / 128.0).abs() < 0.01);
    }

    #[test]
    fn test_preprocess_samples_source_pixels() {
        // Left half red, right half black: left of the tensor should carry
        // the red channel high, the right low.
        let mut data = vec![0u8; 8 * 4 * 3];
        for y in 0..4 {
            for x in 0..4 {
                data[(y * 8 + x) * 3] = 255;
            }
        }
        let frame = Frame::new(data, 8, 4, 3);
        let tensor = preprocess(&frame, 320, 240);

        assert!(tensor[[0, 0, 120, 10]] > 0.9); // red region
        assert!(tensor[[0, 0, 120, 310]] < -0.9); // black region
    }

    #[test]
    fn test_decode_filters_below_confidence() {
        // Two anchors: face scores 0.9 and 0.4
        let scores = [0.1f32, 0.9, 0.6, 0.4];
        let boxes = [0.1f32, 0.1, 0.3, 0.3, 0.5, 0.5, 0.7, 0.7];
        let dets = decode_detections(&scores, &boxes, 2, 0.6);
        assert_eq!(dets.len(), 1);
        assert!((dets[0].score - 0.9).abs() < 1e-6);
        assert!((dets[0].x1 - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_decode_empty_input() {
        assert!(decode_detections(&[], &[], 0, 0.5).is_empty());
    }

    #[test]
    fn test_decode_truncated_data_stops_cleanly() {
        // num_anchors claims 3 but only one anchor's worth of data exists
        let scores = [0.1f32, 0.9];
        let boxes = [0.1f32, 0.1, 0.3, 0.3];
        let dets = decode_detections(&scores, &boxes, 3, 0.5);
        assert_eq!(dets.len(), 1);
    }

    #[test]
    fn test_nms_suppresses_overlapping() {
        let mut dets = vec![
            raw(0.0, 0.0, 0.5, 0.5, 0.9),
            raw(0.02, 0.02, 0.52, 0.52, 0.8),
        ];
        let kept = nms(&mut dets, 0.3);
        assert_eq!(kept.len(), 1);
        assert!((kept[0].score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_nms_keeps_non_overlapping() {
        let mut dets = vec![
            raw(0.0, 0.0, 0.2, 0.2, 0.9),
            raw(0.7, 0.7, 0.9, 0.9, 0.8),
        ];
        let kept = nms(&mut dets, 0.3);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_nms_empty_input() {
        let mut dets: Vec<RawDetection> = Vec::new();
        assert!(nms(&mut dets, 0.3).is_empty());
    }

    #[test]
    fn test_nms_confidence_ordering() {
        let mut dets = vec![
            raw(0.0, 0.0, 0.5, 0.5, 0.5),
            raw(0.01, 0.01, 0.51, 0.51, 0.9),
        ];
        let kept = nms(&mut dets, 0.3);
        // Higher score (0.9) should win
        assert_eq!(kept.len(), 1);
        assert!((kept[0].score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_corner_iou_no_overlap() {
        assert_eq!(
            corner_iou(&[0.0, 0.0, 0.1, 0.1], &[0.5, 0.5, 0.6, 0.6]),
            0.0
        );
    }

    #[test]
    fn test_corner_iou_perfect() {
        let b = [0.0, 0.0, 0.4, 0.4];
        assert!((corner_iou(&b, &b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_to_face_boxes_scales_to_pixels() {
        let dets = vec![raw(0.25, 0.25, 0.75, 0.5, 0.9)];
        let boxes = to_face_boxes(&dets, 400, 200);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].x, 100);
        assert_eq!(boxes[0].y, 50);
        assert_eq!(boxes[0].width, 200);
        assert_eq!(boxes[0].height, 50);
    }

    #[test]
    fn test_to_face_boxes_clamps_out_of_range() {
        // Coordinates beyond [0, 1] must clamp to the frame
        let dets = vec![raw(-0.1, -0.1, 1.2, 1.2, 0.9)];
        let boxes = to_face_boxes(&dets, 100, 80);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].x, 0);
        assert_eq!(boxes[0].y, 0);
        assert_eq!(boxes[0].width, 100);
        assert_eq!(boxes[0].height, 80);
    }

    #[test]
    fn test_to_face_boxes_drops_degenerate() {
        // Entirely outside the frame → zero size after clamping
        let dets = vec![raw(1.5, 1.5, 2.0, 2.0, 0.9)];
        assert!(to_face_boxes(&dets, 100, 100).is_empty());
    }

    #[test]
    fn test_variant_model_names() {
        assert_eq!(
            UltrafaceVariant::ShortRange.model_name(),
            "version-RFB-320.onnx"
        );
        assert_eq!(
            UltrafaceVariant::FullRange.model_name(),
            "version-RFB-640.onnx"
        );
    }

    #[test]
    fn test_variant_input_sizes() {
        assert_eq!(UltrafaceVariant::ShortRange.input_size(), (320, 240));
        assert_eq!(UltrafaceVariant::FullRange.input_size(), (640, 480));
    }
}
