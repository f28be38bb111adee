#![cfg(feature = "backend-tract")]

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tract_onnx::prelude::*;

use crate::detect::backend::{DetectorBackend, DetectorConfig};
use crate::detect::result::BoundingBox;

/// Values per detection row in the model output tensor:
/// x1, y1, x2, y2, confidence, class.
const ROW_LEN: usize = 6;

/// Tract-based backend running a pretrained ONNX pothole model.
///
/// The model is expected to take a 1x3xHxW float input (RGB, 0..1) and emit
/// post-NMS detection rows of `[x1, y1, x2, y2, confidence, class]` in input
/// pixel coordinates. Everything about the model beyond that layout is
/// opaque to this crate.
pub struct TractBackend {
    model: TypedSimplePlan<TypedModel>,
    width: u32,
    height: u32,
    config: DetectorConfig,
}

impl TractBackend {
    /// Load an ONNX model from disk and prepare it for inference.
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        width: u32,
        height: u32,
        config: DetectorConfig,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, 3, height as usize, width as usize),
                ),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        Ok(Self {
            model,
            width,
            height,
            config,
        })
    }

    fn build_input(&self, pixels: &[u8], width: u32, height: u32) -> Result<Tensor> {
        if width != self.width || height != self.height {
            return Err(anyhow!(
                "frame size {}x{} does not match model input {}x{}",
                width,
                height,
                self.width,
                self.height
            ));
        }

        let expected_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;

        if pixels.len() != expected_len {
            return Err(anyhow!(
                "expected {} RGB bytes, received {}",
                expected_len,
                pixels.len()
            ));
        }

        let width = width as usize;
        let input = tract_ndarray::Array4::from_shape_fn(
            (1, 3, height as usize, width),
            |(_, channel, y, x)| {
                let idx = (y * width + x) * 3 + channel;
                pixels[idx] as f32 / 255.0
            },
        );

        Ok(input.into_tensor())
    }

    fn extract_boxes(&self, outputs: TVec<TValue>) -> Result<Vec<BoundingBox>> {
        let output = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?;
        let view = output
            .to_array_view::<f32>()
            .context("model output tensor was not f32")?;
        let flat = view
            .as_slice()
            .ok_or_else(|| anyhow!("model output tensor is not contiguous"))?;

        if !flat.len().is_multiple_of(ROW_LEN) {
            return Err(anyhow!(
                "model output length {} is not a multiple of {}",
                flat.len(),
                ROW_LEN
            ));
        }

        let mut boxes = Vec::new();
        for row in flat.chunks_exact(ROW_LEN) {
            let confidence = row[4];
            if confidence < self.config.confidence_threshold {
                continue;
            }
            boxes.push(BoundingBox::new(
                clamp_coord(row[0], self.width),
                clamp_coord(row[1], self.height),
                clamp_coord(row[2], self.width),
                clamp_coord(row[3], self.height),
                confidence.clamp(0.0, 1.0),
            ));
        }

        let mut boxes = suppress_overlaps(boxes, self.config.iou_threshold);
        boxes.truncate(self.config.max_detections);
        Ok(boxes)
    }
}

/// Greedy non-max suppression over confidence-sorted boxes. Models that ship
/// their own NMS pass through unchanged.
fn suppress_overlaps(mut boxes: Vec<BoundingBox>, iou_threshold: f32) -> Vec<BoundingBox> {
    boxes.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<BoundingBox> = Vec::new();
    for bbox in boxes {
        if keep.iter().all(|kept| bbox.iou(kept) <= iou_threshold) {
            keep.push(bbox);
        }
    }
    keep
}

fn clamp_coord(value: f32, limit: u32) -> u32 {
    if value.is_nan() {
        return 0;
    }
    (value.max(0.0) as u32).min(limit)
}

impl DetectorBackend for TractBackend {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<BoundingBox>> {
        let input = self.build_input(pixels, width, height)?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;
        self.extract_boxes(outputs)
    }
}
