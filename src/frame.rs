use chrono::{DateTime, Local};

/// One captured RGB frame.
///
/// Pixels are tightly packed RGB8, row-major. The capture timestamp is taken
/// when the ingestion layer hands the frame over, and is what alert records
/// and overlays are stamped with.
#[derive(Clone, Debug)]
pub struct Frame {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub captured_at: DateTime<Local>,
}

impl Frame {
    /// Create a frame stamped with the current wall-clock time. Called by the
    /// ingestion layer.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
            captured_at: Local::now(),
        }
    }

    /// Total pixel area, the denominator of every box's area ratio.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Byte length a well-formed RGB frame of these dimensions must have.
    pub fn expected_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_area() {
        let frame = Frame::new(vec![0; Frame::expected_len(640, 480)], 640, 480);
        assert_eq!(frame.area(), 307_200);
        assert_eq!(frame.pixels.len(), 640 * 480 * 3);
    }
}
