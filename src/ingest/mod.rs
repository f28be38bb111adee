//! Frame ingestion.
//!
//! Camera input comes from one of:
//! - `stub://` synthetic road scenes (tests, demos, CI)
//! - `http(s)://` MJPEG streams or single-JPEG snapshot endpoints
//!
//! The source is opened once, read frame-by-frame, and released on drop.
//! There is no queueing: when the pipeline is slower than the camera, frames
//! are simply not pulled, which drops them at the source.

mod camera;

pub use camera::{CameraConfig, CameraSource, CameraStats};
