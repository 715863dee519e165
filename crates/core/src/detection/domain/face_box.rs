pub const DEFAULT_IOU_THRESHOLD: f64 = 0.3;

/// A detected face rectangle in image pixel coordinates.
///
/// Coordinates are clamped to the frame the detector ran on, so
/// `x + width <= frame width` and `y + height <= frame height` always hold.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Detector confidence in `[0, 1]`.
    pub score: f64,
}

impl FaceBox {
    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }

    /// Greedy deduplication: keeps a box only if its IoU with every
    /// previously-kept box is at or below the threshold.
    ///
    /// Callers are expected to pass boxes sorted by descending score so the
    /// strongest detection of an overlapping pair survives.
    pub fn deduplicate(boxes: &[FaceBox], iou_threshold: f64) -> Vec<FaceBox> {
        if boxes.len() <= 1 {
            return boxes.to_vec();
        }
        let mut kept: Vec<FaceBox> = Vec::with_capacity(boxes.len());
        for b in boxes {
            let dominated = kept.iter().any(|k| b.iou(k) > iou_threshold);
            if !dominated {
                kept.push(b.clone());
            }
        }
        kept
    }

    pub fn iou(&self, other: &FaceBox) -> f64 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = (self.x + self.width).min(other.x + other.width);
        let iy2 = (self.y + self.height).min(other.y + other.height);

        let inter = (ix2 - ix1).max(0) as f64 * (iy2 - iy1).max(0) as f64;
        if inter == 0.0 {
            return 0.0;
        }

        let area_a = self.area();
        let area_b = other.area();
        inter / (area_a + area_b - inter)
    }
}
