//! Capture loop orchestration.
//!
//! One thread runs capture -> detect -> overlay -> emit at the source rate.
//! A detecting frame that arms the episode controller has its annotated
//! snapshot handed to the alert dispatcher; the dispatcher never blocks this
//! path. A single frame-read or inference failure skips the frame; a source
//! that never opens, or stops delivering, ends the run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};

use crate::alert::{AlertDispatcher, AlertSnapshot};
use crate::episode::{EpisodeController, EpisodeTransition};
use crate::ingest::CameraSource;
use crate::pipeline::FramePipeline;
use crate::present::{StatusDisplay, StatusUpdate};

const HEALTH_LOG_INTERVAL: Duration = Duration::from_secs(5);

pub struct Sentinel {
    source: CameraSource,
    pipeline: FramePipeline,
    episode: EpisodeController,
    dispatcher: AlertDispatcher,
    display: Box<dyn StatusDisplay>,
    target_fps: u32,
    last_detected: String,
    last_health_log: Instant,
}

impl Sentinel {
    pub fn new(
        source: CameraSource,
        pipeline: FramePipeline,
        dispatcher: AlertDispatcher,
        display: Box<dyn StatusDisplay>,
        target_fps: u32,
    ) -> Self {
        Self {
            source,
            pipeline,
            episode: EpisodeController::new(),
            dispatcher,
            display,
            target_fps,
            last_detected: "--".to_string(),
            last_health_log: Instant::now(),
        }
    }

    /// Open the camera. Failure here is fatal for the run.
    pub fn connect(&mut self) -> Result<()> {
        self.source.connect()?;
        self.pipeline.warm_up()?;
        log::info!("detection backend: {}", self.pipeline.backend_name());
        Ok(())
    }

    /// Capture and process one frame.
    pub fn tick(&mut self) -> Result<()> {
        let mut frame = match self.source.next_frame() {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("frame capture failed: {e:#}");
                if !self.source.is_healthy() {
                    return Err(anyhow!("camera stopped delivering frames"));
                }
                return Ok(());
            }
        };

        let report = match self.pipeline.process(&mut frame) {
            Ok(report) => report,
            Err(e) => {
                log::warn!("detection failed, skipping frame: {e:#}");
                return Ok(());
            }
        };

        if let Some(at) = report.detected_at {
            self.last_detected = at.format("%H:%M:%S").to_string();
        }

        self.display.render(&StatusUpdate {
            camera_on: true,
            severity: report.severity,
            confidence_pct: (report.max_confidence * 1000.0).round() / 10.0,
            last_detected: self.last_detected.clone(),
        });

        if self.episode.observe(report.count) == EpisodeTransition::Triggered {
            self.dispatcher.enqueue(AlertSnapshot {
                pixels: frame.pixels,
                width: frame.width,
                height: frame.height,
                severity: report.severity,
                count: report.count,
                captured_at: frame.captured_at,
            });
        }

        if self.last_health_log.elapsed() >= HEALTH_LOG_INTERVAL {
            let stats = self.source.stats();
            log::info!(
                "camera health={} frames={} url={}",
                self.source.is_healthy(),
                stats.frames_captured,
                stats.url
            );
            self.last_health_log = Instant::now();
        }

        Ok(())
    }

    /// Run until the stop flag flips, then mark the camera off and shut the
    /// dispatcher down (draining queued alerts).
    pub fn run(mut self, stop: &AtomicBool) -> Result<()> {
        self.connect()?;

        let pace = Duration::from_millis((1000 / self.target_fps.max(1)) as u64);
        while !stop.load(Ordering::SeqCst) {
            self.tick()?;
            std::thread::sleep(pace);
        }

        self.display.render(&StatusUpdate::camera_off());
        let stats = self.dispatcher.shutdown()?;
        log::info!(
            "stopped: {} alerts dispatched, {} dropped, {} log failures, {} email failures",
            stats.dispatched,
            stats.dropped,
            stats.log_failures,
            stats.email_failures
        );
        Ok(())
    }

    /// Stop without running the loop; used by callers driving `tick`
    /// themselves.
    pub fn finish(mut self) -> Result<crate::alert::DispatchStats> {
        self.display.render(&StatusUpdate::camera_off());
        self.dispatcher.shutdown()
    }
}
