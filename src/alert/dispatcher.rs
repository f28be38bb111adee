//! Alert dispatch worker.
//!
//! A single worker thread consumes alert jobs from a bounded channel, so the
//! capture loop never blocks on alert side effects and CSV appends are
//! naturally serialized. Enqueueing when the queue is full drops the job
//! with a warning rather than stalling frame processing.
//!
//! Per-job steps: resolve location (best-effort), write the JPEG snapshot,
//! append the CSV record, send the email. Snapshot or log failures abort the
//! job and are surfaced at error level (lost evidence); an email failure is
//! logged and counted but does not undo the local record.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use crossbeam_channel::{bounded, Sender, TrySendError};

use crate::alert::email::{AlertMessage, Mailer};
use crate::alert::geolocate::{Locate, LocationFix};
use crate::artifacts::ImageStore;
use crate::detect::Severity;
use crate::eventlog::{EventLog, LogRecord};

/// Snapshot of the frame that armed the episode, with everything the worker
/// needs to raise the alert.
#[derive(Clone, Debug)]
pub struct AlertSnapshot {
    /// Annotated RGB pixels (overlays already drawn).
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub severity: Severity,
    pub count: usize,
    pub captured_at: DateTime<Local>,
}

/// Counters published by the worker. `log_failures` covers snapshot and CSV
/// writes; `email_failures` covers the transport only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub dispatched: u64,
    pub dropped: u64,
    pub log_failures: u64,
    pub email_failures: u64,
}

#[derive(Default)]
struct Counters {
    dispatched: AtomicU64,
    dropped: AtomicU64,
    log_failures: AtomicU64,
    email_failures: AtomicU64,
}

pub struct AlertDispatcher {
    tx: Option<Sender<AlertSnapshot>>,
    worker: Option<JoinHandle<()>>,
    counters: Arc<Counters>,
}

struct Worker {
    city_label: String,
    log: EventLog,
    images: ImageStore,
    locator: Box<dyn Locate>,
    mailer: Box<dyn Mailer>,
    counters: Arc<Counters>,
}

impl AlertDispatcher {
    /// Start the worker thread behind a queue of `queue_depth` jobs.
    pub fn spawn(
        city_label: &str,
        log: EventLog,
        images: ImageStore,
        locator: Box<dyn Locate>,
        mailer: Box<dyn Mailer>,
        queue_depth: usize,
    ) -> Result<Self> {
        let (tx, rx) = bounded::<AlertSnapshot>(queue_depth.max(1));
        let counters = Arc::new(Counters::default());

        let mut worker = Worker {
            city_label: city_label.to_string(),
            log,
            images,
            locator,
            mailer,
            counters: counters.clone(),
        };

        let handle = std::thread::Builder::new()
            .name("alert-dispatch".to_string())
            .spawn(move || {
                for job in rx.iter() {
                    worker.handle(job);
                }
            })
            .context("failed to spawn alert dispatch worker")?;

        Ok(Self {
            tx: Some(tx),
            worker: Some(handle),
            counters,
        })
    }

    /// Hand a snapshot to the worker without blocking. Returns false when the
    /// job was dropped (queue full or worker gone).
    pub fn enqueue(&self, snapshot: AlertSnapshot) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };
        match tx.try_send(snapshot) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                log::warn!("alert queue full; dropping alert");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                log::error!("alert worker is gone; dropping alert");
                false
            }
        }
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            dispatched: self.counters.dispatched.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            log_failures: self.counters.log_failures.load(Ordering::Relaxed),
            email_failures: self.counters.email_failures.load(Ordering::Relaxed),
        }
    }

    /// Drain remaining jobs and stop the worker.
    pub fn shutdown(mut self) -> Result<DispatchStats> {
        drop(self.tx.take());
        if let Some(handle) = self.worker.take() {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("alert dispatch worker panicked"))?;
        }
        Ok(self.stats())
    }
}

impl Worker {
    fn handle(&mut self, job: AlertSnapshot) {
        let date = job.captured_at.format("%Y-%m-%d").to_string();
        let time = job.captured_at.format("%H-%M-%S").to_string();

        let fix = self.locator.locate().unwrap_or_else(|e| {
            log::debug!("geolocation unavailable: {e:#}");
            LocationFix::placeholder(&self.city_label)
        });

        let alert = match self.persist(&job, &date, &time, &fix) {
            Ok(alert) => alert,
            Err(e) => {
                self.counters.log_failures.fetch_add(1, Ordering::Relaxed);
                log::error!("alert evidence write failed: {e:#}");
                return;
            }
        };

        if let Err(e) = self.mailer.send_alert(&alert) {
            self.counters.email_failures.fetch_add(1, Ordering::Relaxed);
            log::error!("alert email failed: {e:#}");
        }

        self.counters.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    fn persist(
        &mut self,
        job: &AlertSnapshot,
        date: &str,
        time: &str,
        fix: &LocationFix,
    ) -> Result<AlertMessage> {
        let image_path =
            self.images
                .save_snapshot(&job.pixels, job.width, job.height, date, time)?;

        self.log.append(&LogRecord {
            date: date.to_string(),
            time: time.to_string(),
            city: fix.city.clone(),
            latitude: fix.latitude.clone(),
            longitude: fix.longitude.clone(),
            severity: job.severity.label().to_string(),
            count: job.count,
        })?;

        Ok(AlertMessage {
            date: date.to_string(),
            time: time.to_string(),
            location_text: fix.display_text(),
            severity: job.severity.label().to_string(),
            image_path,
            log_path: self.log.path().to_path_buf(),
        })
    }
}

impl Drop for AlertDispatcher {
    fn drop(&mut self) {
        // Without an explicit shutdown() the sender is closed here and the
        // worker finishes the queue detached.
        drop(self.tx.take());
    }
}
