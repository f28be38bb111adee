use std::collections::VecDeque;

use anyhow::Result;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::BoundingBox;

/// Scripted backend for tests and `stub://` operation.
///
/// Detections are played back per frame from a queue; once the script runs
/// out, every subsequent frame is empty. An unscripted stub never detects.
#[derive(Default)]
pub struct StubBackend {
    script: VecDeque<Vec<BoundingBox>>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the boxes the next frames should report, one entry per frame.
    pub fn script<I>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = Vec<BoundingBox>>,
    {
        self.script.extend(frames);
        self
    }

    pub fn push_frame(&mut self, boxes: Vec<BoundingBox>) {
        self.script.push_back(boxes);
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, _pixels: &[u8], _width: u32, _height: u32) -> Result<Vec<BoundingBox>> {
        Ok(self.script.pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plays_back_script_then_goes_quiet() {
        let mut backend = StubBackend::new().script([
            vec![BoundingBox::new(0, 0, 10, 10, 0.9)],
            vec![],
            vec![
                BoundingBox::new(0, 0, 5, 5, 0.7),
                BoundingBox::new(20, 20, 40, 40, 0.8),
            ],
        ]);

        assert_eq!(backend.detect(&[], 640, 480).unwrap().len(), 1);
        assert!(backend.detect(&[], 640, 480).unwrap().is_empty());
        assert_eq!(backend.detect(&[], 640, 480).unwrap().len(), 2);
        assert!(backend.detect(&[], 640, 480).unwrap().is_empty());
    }
}
