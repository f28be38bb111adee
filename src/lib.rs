//! Pothole Sentinel
//!
//! This crate watches a camera feed, runs a pretrained object-detection
//! model per frame to find road potholes, overlays severity-coded bounding
//! boxes, and raises one alert per detection episode: a JPEG snapshot, a CSV
//! log row, and an email with both attached.
//!
//! # Architecture
//!
//! - One capture thread runs capture -> detect -> overlay -> emit at the
//!   source's frame rate. Slow processing drops frames at the source; there
//!   is no queueing on the hot path.
//! - A two-state episode controller (`Idle`/`Armed`) guarantees at most one
//!   alert per contiguous run of detecting frames, fired on the run's first
//!   qualifying frame.
//! - A single dispatch worker behind a bounded queue performs the alert side
//!   effects (geolocate, snapshot, CSV append, email) off the capture path.
//!   CSV appends only ever happen on that thread.
//!
//! # Module Structure
//!
//! - `ingest`: camera sources (synthetic `stub://`, HTTP MJPEG/JPEG)
//! - `detect`: detector backends, bounding boxes, severity classification
//! - `pipeline`: per-frame detect/classify/annotate stage
//! - `episode`: once-per-episode alert gating
//! - `alert`: dispatch worker, geolocation, email
//! - `eventlog` / `artifacts`: the CSV log and JPEG snapshots
//! - `present`: live status surface
//! - `runner`: the capture loop

pub mod alert;
pub mod artifacts;
pub mod config;
pub mod detect;
pub mod episode;
pub mod eventlog;
pub mod frame;
pub mod ingest;
pub mod overlay;
pub mod pipeline;
pub mod present;
pub mod runner;

pub use alert::{
    AlertDispatcher, AlertMessage, AlertSnapshot, DisabledMailer, DispatchStats, EmailSettings,
    IpGeolocator, Locate, LocationFix, Mailer, RecordingMailer, SmtpMailer, StaticLocator,
};
pub use artifacts::ImageStore;
pub use config::{AlertSettings, DetectorSettings, LocationSettings, SentinelConfig};
pub use detect::{BoundingBox, DetectorBackend, DetectorConfig, Severity, SeverityThresholds};
#[cfg(feature = "backend-tract")]
pub use detect::TractBackend;
pub use detect::StubBackend;
pub use episode::{EpisodeController, EpisodePhase, EpisodeTransition};
pub use eventlog::{EventLog, LogRecord, LOG_HEADER};
pub use frame::Frame;
pub use ingest::{CameraConfig, CameraSource, CameraStats};
pub use pipeline::{FramePipeline, FrameReport};
pub use present::{ConsoleDisplay, RecordingDisplay, StatusDisplay, StatusUpdate};
pub use runner::Sentinel;
