//! End-to-end run over a synthetic frame stream.
//!
//! Frames 1-3 each carry one large pothole (area ratio 0.10); frames 4-6 are
//! empty. Exactly one alert episode must result: one CSV row, one snapshot,
//! one email, with the episode resetting at frame 4.

use tempfile::TempDir;

use pothole_sentinel::{
    AlertDispatcher, BoundingBox, CameraConfig, CameraSource, EventLog, FramePipeline, ImageStore,
    LocationFix, RecordingDisplay, RecordingMailer, Sentinel, Severity, SeverityThresholds,
    StaticLocator, StubBackend,
};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

#[test]
fn single_episode_produces_one_alert() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("logs").join("pothole_log.csv");
    let image_dir = dir.path().join("images");

    // 0.10 of 640x480 = 30720 px^2: a 192x160 box.
    let large_box = BoundingBox::new(0, 0, 192, 160, 0.91);
    let backend = StubBackend::new().script([
        vec![large_box],
        vec![large_box],
        vec![large_box],
        vec![],
        vec![],
        vec![],
    ]);

    let source = CameraSource::new(CameraConfig {
        url: "stub://bench".to_string(),
        target_fps: 10,
        width: WIDTH,
        height: HEIGHT,
    })
    .expect("camera source");

    let mailer = RecordingMailer::new();
    let dispatcher = AlertDispatcher::spawn(
        "Mysore",
        EventLog::new(&log_path),
        ImageStore::new(&image_dir),
        Box::new(StaticLocator::fixed(LocationFix {
            city: "Mysore".to_string(),
            latitude: "12.2958".to_string(),
            longitude: "76.6394".to_string(),
        })),
        Box::new(mailer.clone()),
        8,
    )
    .expect("spawn dispatcher");

    let display = RecordingDisplay::new();
    let mut sentinel = Sentinel::new(
        source,
        FramePipeline::new(Box::new(backend), SeverityThresholds::default()),
        dispatcher,
        Box::new(display.clone()),
        10,
    );

    sentinel.connect().expect("connect");
    for _ in 0..6 {
        sentinel.tick().expect("tick");
    }
    let stats = sentinel.finish().expect("finish");

    // Exactly one alert episode, dispatched on frame 1.
    assert_eq!(stats.dispatched, 1);
    assert_eq!(stats.dropped, 0);
    assert_eq!(stats.log_failures, 0);
    assert_eq!(stats.email_failures, 0);

    let records = EventLog::new(&log_path).read_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].severity, "Large");
    assert_eq!(records[0].count, 1);

    let images: Vec<_> = std::fs::read_dir(&image_dir).unwrap().collect();
    assert_eq!(images.len(), 1);

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].severity, "Large");

    // Status surface: frames 1-3 show Large, frame 4 drops to None while the
    // last-detection time sticks; the final update marks the camera off.
    let updates = display.updates();
    assert_eq!(updates.len(), 7);
    assert_eq!(updates[0].severity, Severity::Large);
    assert!((updates[0].confidence_pct - 91.0).abs() < 0.11);
    assert_eq!(updates[2].severity, Severity::Large);
    assert_eq!(updates[3].severity, Severity::None);
    assert_eq!(updates[3].confidence_pct, 0.0);
    assert_ne!(updates[3].last_detected, "--");
    assert_eq!(updates[3].last_detected, updates[2].last_detected);
    assert!(!updates[6].camera_on);
}

#[test]
fn flicker_retriggers_immediately() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("pothole_log.csv");

    let small_box = BoundingBox::new(0, 0, 40, 40, 0.7);
    let backend = StubBackend::new().script([
        vec![small_box],
        vec![],
        vec![small_box],
        vec![],
    ]);

    let source = CameraSource::new(CameraConfig {
        url: "stub://bench".to_string(),
        target_fps: 10,
        width: WIDTH,
        height: HEIGHT,
    })
    .expect("camera source");

    let mailer = RecordingMailer::new();
    let dispatcher = AlertDispatcher::spawn(
        "Mysore",
        EventLog::new(&log_path),
        ImageStore::new(dir.path().join("images")),
        Box::new(StaticLocator::failing()),
        Box::new(mailer.clone()),
        8,
    )
    .expect("spawn dispatcher");

    let mut sentinel = Sentinel::new(
        source,
        FramePipeline::new(Box::new(backend), SeverityThresholds::default()),
        dispatcher,
        Box::new(RecordingDisplay::new()),
        10,
    );

    sentinel.connect().expect("connect");
    for _ in 0..4 {
        sentinel.tick().expect("tick");
    }
    let stats = sentinel.finish().expect("finish");

    // A single empty frame fully resets the gate: two alerts, not one.
    assert_eq!(stats.dispatched, 2);
    assert_eq!(mailer.sent().len(), 2);
}
