use anyhow::Result;

use crate::detect::result::BoundingBox;

/// Inference parameters handed to a backend at construction time.
///
/// The thresholds are deployment knobs, not algorithm constants: field units
/// have been observed running anywhere between 0.60 and 0.63 confidence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorConfig {
    /// Minimum confidence for a box to be reported.
    pub confidence_threshold: f32,
    /// IoU threshold for the model's non-max suppression.
    pub iou_threshold: f32,
    /// Hard cap on boxes reported per frame.
    pub max_detections: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.60,
            iou_threshold: 0.5,
            max_detections: 30,
        }
    }
}

/// Detector backend trait.
///
/// The model behind this trait is an opaque collaborator: the pipeline only
/// aggregates its boxes, it performs no inference logic of its own.
///
/// Implementations must treat the pixel slice as read-only RGB data and must
/// not retain it beyond the `detect` call. There is no cancellation path; a
/// backend that hangs stalls the capture thread.
pub trait DetectorBackend: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run detection on one RGB frame, returning boxes that already satisfy
    /// the configured confidence threshold and detection cap.
    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<BoundingBox>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
