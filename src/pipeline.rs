//! Per-frame detection pipeline.
//!
//! For each captured frame: run the detector once, classify each box's
//! severity from its area ratio, draw the severity-coded overlays onto the
//! frame in place, and produce the frame summary. All inference lives behind
//! the backend; this stage is aggregation and geometry only.

use anyhow::Result;
use chrono::{DateTime, Local};

use crate::detect::{DetectorBackend, Severity, SeverityThresholds};
use crate::frame::Frame;
use crate::overlay;

/// Per-frame summary handed to the status display and episode controller.
///
/// Invariant: `severity` is `None` and `max_confidence` is 0.0 whenever
/// `count` is zero; `detected_at` is set only on detecting frames.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub severity: Severity,
    pub max_confidence: f32,
    pub count: usize,
    pub detected_at: Option<DateTime<Local>>,
}

pub struct FramePipeline {
    backend: Box<dyn DetectorBackend>,
    thresholds: SeverityThresholds,
}

impl FramePipeline {
    pub fn new(backend: Box<dyn DetectorBackend>, thresholds: SeverityThresholds) -> Self {
        Self {
            backend,
            thresholds,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn warm_up(&mut self) -> Result<()> {
        self.backend.warm_up()
    }

    /// Detect, classify, and annotate one frame.
    pub fn process(&mut self, frame: &mut Frame) -> Result<FrameReport> {
        let boxes = self
            .backend
            .detect(&frame.pixels, frame.width, frame.height)?;

        let frame_area = frame.area();
        let mut severity = Severity::None;
        let mut max_confidence = 0.0f32;

        for bbox in &boxes {
            let box_severity = self.thresholds.classify(bbox.area_ratio(frame_area));
            severity = severity.max(box_severity);
            max_confidence = max_confidence.max(bbox.confidence);
            overlay::draw_detection(frame, bbox, box_severity);
        }

        let detected_at = if boxes.is_empty() {
            None
        } else {
            Some(frame.captured_at)
        };

        Ok(FrameReport {
            severity,
            max_confidence,
            count: boxes.len(),
            detected_at,
        })
    }
}
