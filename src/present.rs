//! Live status surface.
//!
//! The capture loop publishes one [`StatusUpdate`] per processed frame. The
//! console display turns those into log lines; tests use the recording
//! display. The last-detection time is sticky: it keeps its previous value
//! across empty frames.

use std::sync::{Arc, Mutex};

use crate::detect::Severity;

#[derive(Clone, Debug, PartialEq)]
pub struct StatusUpdate {
    pub camera_on: bool,
    pub severity: Severity,
    /// Max confidence for this frame as a percentage, one decimal.
    pub confidence_pct: f32,
    /// "--" until the first detection of the run.
    pub last_detected: String,
}

impl StatusUpdate {
    pub fn camera_off() -> Self {
        Self {
            camera_on: false,
            severity: Severity::None,
            confidence_pct: 0.0,
            last_detected: "--".to_string(),
        }
    }
}

pub trait StatusDisplay: Send {
    fn render(&mut self, update: &StatusUpdate);
}

/// Logs a status line whenever the displayed state changes.
#[derive(Default)]
pub struct ConsoleDisplay {
    last: Option<StatusUpdate>,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusDisplay for ConsoleDisplay {
    fn render(&mut self, update: &StatusUpdate) {
        let changed = self
            .last
            .as_ref()
            .map(|last| {
                last.camera_on != update.camera_on
                    || last.severity != update.severity
                    || last.last_detected != update.last_detected
            })
            .unwrap_or(true);

        if changed {
            if update.camera_on {
                log::info!(
                    "camera ON | severity={} confidence={:.1}% last_detected={}",
                    update.severity,
                    update.confidence_pct,
                    update.last_detected
                );
            } else {
                log::info!("camera OFF");
            }
        }
        self.last = Some(update.clone());
    }
}

/// Captures every update for later assertions.
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    updates: Arc<Mutex<Vec<StatusUpdate>>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.updates.lock().expect("display lock poisoned").clone()
    }
}

impl StatusDisplay for RecordingDisplay {
    fn render(&mut self, update: &StatusUpdate) {
        self.updates
            .lock()
            .expect("display lock poisoned")
            .push(update.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_display_keeps_order() {
        let display = RecordingDisplay::new();
        let mut sink = display.clone();

        sink.render(&StatusUpdate {
            camera_on: true,
            severity: Severity::Large,
            confidence_pct: 91.2,
            last_detected: "10:15:30".to_string(),
        });
        sink.render(&StatusUpdate::camera_off());

        let updates = display.updates();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].severity, Severity::Large);
        assert!(!updates[1].camera_on);
    }
}
