//! sentineld - Pothole Sentinel daemon
//!
//! This daemon:
//! 1. Opens the configured camera source
//! 2. Runs pothole detection on every frame
//! 3. Draws severity-coded overlays and publishes a live status line
//! 4. Raises one alert per detection episode through the dispatch worker
//!    (JPEG snapshot + CSV log row + email)
//!
//! Stop with Ctrl-C; queued alerts are drained before exit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;

use pothole_sentinel::{
    AlertDispatcher, CameraSource, ConsoleDisplay, DisabledMailer, EventLog, FramePipeline,
    ImageStore, IpGeolocator, Locate, Mailer, Sentinel, SentinelConfig, SmtpMailer, StubBackend,
};

#[derive(Parser, Debug)]
#[command(name = "sentineld", about = "Camera-watching pothole detector")]
struct Args {
    /// Config file path (JSON)
    #[arg(long, env = "SENTINEL_CONFIG")]
    config: Option<String>,

    /// Override the camera URL from the config
    #[arg(long)]
    camera_url: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = SentinelConfig::load_from(args.config.as_deref())?;
    if let Some(url) = args.camera_url {
        cfg.camera.url = url;
    }

    log::info!(
        "sentineld {} starting: camera={} backend={} log={}",
        env!("CARGO_PKG_VERSION"),
        cfg.camera.url,
        cfg.detector.backend,
        cfg.alerts.log_path
    );

    let source = CameraSource::new(cfg.camera.clone())?;
    let pipeline = FramePipeline::new(build_backend(&cfg)?, cfg.detector.severity);

    let locator: Box<dyn Locate> = Box::new(IpGeolocator::new(
        &cfg.location.endpoint,
        &cfg.location.city_label,
        cfg.location.timeout,
    ));
    let mailer: Box<dyn Mailer> = match cfg.email.clone() {
        Some(settings) => Box::new(SmtpMailer::new(settings)),
        None => {
            log::warn!("no email settings configured; alerts will only be logged locally");
            Box::new(DisabledMailer)
        }
    };

    let dispatcher = AlertDispatcher::spawn(
        &cfg.location.city_label,
        EventLog::new(&cfg.alerts.log_path),
        ImageStore::new(&cfg.alerts.image_dir),
        locator,
        mailer,
        cfg.alerts.queue_depth,
    )?;

    let sentinel = Sentinel::new(
        source,
        pipeline,
        dispatcher,
        Box::new(ConsoleDisplay::new()),
        cfg.camera.target_fps,
    );

    let stop = Arc::new(AtomicBool::new(false));
    let stop_handler = stop.clone();
    ctrlc::set_handler(move || {
        log::info!("stop requested");
        stop_handler.store(true, Ordering::SeqCst);
    })?;

    sentinel.run(&stop)
}

fn build_backend(
    cfg: &SentinelConfig,
) -> Result<Box<dyn pothole_sentinel::DetectorBackend>> {
    match cfg.detector.backend.as_str() {
        "stub" => Ok(Box::new(StubBackend::new())),
        #[cfg(feature = "backend-tract")]
        "tract" => {
            let model_path = cfg
                .detector
                .model_path
                .as_ref()
                .ok_or_else(|| anyhow!("tract backend requires detector.model_path"))?;
            Ok(Box::new(pothole_sentinel::TractBackend::new(
                model_path,
                cfg.camera.width,
                cfg.camera.height,
                cfg.detector.config,
            )?))
        }
        #[cfg(not(feature = "backend-tract"))]
        "tract" => Err(anyhow!(
            "tract backend requires building with the backend-tract feature"
        )),
        other => Err(anyhow!("unknown detector backend '{}'", other)),
    }
}
