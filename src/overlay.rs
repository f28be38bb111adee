//! Severity-coded overlays drawn directly on RGB frame buffers.
//!
//! Each detection gets a rectangle outline in the severity color plus a
//! filled tag strip above its top edge. All edges are clamped to the frame,
//! so boxes touching or crossing the border draw safely.

use crate::detect::{BoundingBox, Severity};
use crate::frame::Frame;

const OUTLINE_THICKNESS: u32 = 2;
const TAG_HEIGHT: u32 = 8;
const TAG_MAX_WIDTH: u32 = 48;

/// Overlay color per severity level, RGB.
pub fn severity_color(severity: Severity) -> [u8; 3] {
    match severity {
        Severity::Small => [0, 255, 0],
        Severity::Medium => [255, 255, 0],
        Severity::Large => [255, 0, 0],
        Severity::None => [255, 255, 255],
    }
}

/// Draw one detection: outline plus severity tag.
pub fn draw_detection(frame: &mut Frame, bbox: &BoundingBox, severity: Severity) {
    let color = severity_color(severity);
    draw_rect_outline(frame, bbox, color);
    draw_severity_tag(frame, bbox, color);
}

fn draw_rect_outline(frame: &mut Frame, bbox: &BoundingBox, color: [u8; 3]) {
    for t in 0..OUTLINE_THICKNESS {
        let x1 = bbox.x1.saturating_add(t);
        let y1 = bbox.y1.saturating_add(t);
        let x2 = bbox.x2.saturating_sub(t);
        let y2 = bbox.y2.saturating_sub(t);
        if x2 <= x1 || y2 <= y1 {
            break;
        }

        for x in x1..=x2 {
            put_pixel(frame, x, y1, color);
            put_pixel(frame, x, y2, color);
        }
        for y in y1..=y2 {
            put_pixel(frame, x1, y, color);
            put_pixel(frame, x2, y, color);
        }
    }
}

/// Filled strip above the box. Stands in for a text label; the textual
/// severity travels with the frame report, log record, and email body.
fn draw_severity_tag(frame: &mut Frame, bbox: &BoundingBox, color: [u8; 3]) {
    let width = bbox.x2.saturating_sub(bbox.x1).min(TAG_MAX_WIDTH);
    if width == 0 {
        return;
    }

    // Sits just above the box; slides inside the top edge when there is no
    // room above.
    let top = bbox.y1.saturating_sub(TAG_HEIGHT + 2);
    for y in top..top + TAG_HEIGHT {
        for x in bbox.x1..bbox.x1 + width {
            put_pixel(frame, x, y, color);
        }
    }
}

fn put_pixel(frame: &mut Frame, x: u32, y: u32, color: [u8; 3]) {
    if x >= frame.width || y >= frame.height {
        return;
    }
    let idx = (y as usize * frame.width as usize + x as usize) * 3;
    if idx + 2 < frame.pixels.len() {
        frame.pixels[idx] = color[0];
        frame.pixels[idx + 1] = color[1];
        frame.pixels[idx + 2] = color[2];
    }
}
