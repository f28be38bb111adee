/// Axis-aligned detection box in pixel coordinates.
///
/// Produced fresh by the detector on every frame; never persisted. The class
/// is implicit (pothole), so only geometry and confidence are carried.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
    /// Confidence in [0, 1].
    pub confidence: f32,
}

impl BoundingBox {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32, confidence: f32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            confidence,
        }
    }

    /// Pixel area. Degenerate boxes (x2 <= x1 or y2 <= y1) have zero area.
    pub fn area(&self) -> u64 {
        let w = self.x2.saturating_sub(self.x1) as u64;
        let h = self.y2.saturating_sub(self.y1) as u64;
        w * h
    }

    /// Box area divided by total frame area; the severity proxy.
    pub fn area_ratio(&self, frame_area: u64) -> f32 {
        if frame_area == 0 {
            return 0.0;
        }
        self.area() as f32 / frame_area as f32
    }

    fn intersection_area(&self, other: &BoundingBox) -> u64 {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);

        if x2 > x1 && y2 > y1 {
            (x2 - x1) as u64 * (y2 - y1) as u64
        } else {
            0
        }
    }

    /// Intersection over union with another box.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let intersection = self.intersection_area(other);
        let union = self.area() + other.area() - intersection;

        if union > 0 {
            intersection as f32 / union as f32
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_and_ratio() {
        let bbox = BoundingBox::new(10, 20, 110, 70, 0.9);
        assert_eq!(bbox.area(), 100 * 50);

        let ratio = bbox.area_ratio(640 * 480);
        assert!((ratio - 5000.0 / 307200.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_box_has_zero_area() {
        let bbox = BoundingBox::new(50, 50, 50, 80, 0.5);
        assert_eq!(bbox.area(), 0);
        assert_eq!(bbox.area_ratio(307200), 0.0);
    }

    #[test]
    fn zero_frame_area_does_not_divide() {
        let bbox = BoundingBox::new(0, 0, 10, 10, 0.5);
        assert_eq!(bbox.area_ratio(0), 0.0);
    }

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let a = BoundingBox::new(10, 10, 50, 50, 0.9);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        let a = BoundingBox::new(0, 0, 10, 10, 0.9);
        let b = BoundingBox::new(20, 20, 30, 30, 0.9);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn iou_of_half_overlap() {
        let a = BoundingBox::new(0, 0, 10, 10, 0.9);
        let b = BoundingBox::new(0, 5, 10, 15, 0.9);
        // intersection 50, union 150
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-6);
    }
}
