//! Episode gating and alert dispatch, wired with scripted collaborators.

use chrono::Local;
use tempfile::TempDir;

use pothole_sentinel::{
    AlertDispatcher, AlertSnapshot, EpisodeController, EpisodeTransition, EventLog, ImageStore,
    LocationFix, RecordingMailer, Severity, StaticLocator,
};

const WIDTH: u32 = 32;
const HEIGHT: u32 = 24;

fn snapshot(severity: Severity, count: usize) -> AlertSnapshot {
    AlertSnapshot {
        pixels: vec![80u8; (WIDTH * HEIGHT * 3) as usize],
        width: WIDTH,
        height: HEIGHT,
        severity,
        count,
        captured_at: Local::now(),
    }
}

fn spawn_dispatcher(
    dir: &TempDir,
    locator: StaticLocator,
    mailer: RecordingMailer,
) -> (AlertDispatcher, std::path::PathBuf) {
    let log_path = dir.path().join("logs").join("pothole_log.csv");
    let dispatcher = AlertDispatcher::spawn(
        "Mysore",
        EventLog::new(&log_path),
        ImageStore::new(dir.path().join("images")),
        Box::new(locator),
        Box::new(mailer),
        8,
    )
    .expect("spawn dispatcher");
    (dispatcher, log_path)
}

#[test]
fn detection_sequence_dispatches_once_per_run() {
    let dir = TempDir::new().unwrap();
    let mailer = RecordingMailer::new();
    let locator = StaticLocator::fixed(LocationFix {
        city: "Mysore".to_string(),
        latitude: "12.2958".to_string(),
        longitude: "76.6394".to_string(),
    });
    let (dispatcher, log_path) = spawn_dispatcher(&dir, locator, mailer.clone());

    let mut controller = EpisodeController::new();
    let detections_per_frame = [0usize, 0, 1, 1, 1, 0, 1];

    let mut triggered_at = Vec::new();
    for (index, count) in detections_per_frame.iter().enumerate() {
        if controller.observe(*count) == EpisodeTransition::Triggered {
            triggered_at.push(index);
            assert!(dispatcher.enqueue(snapshot(Severity::Medium, *count)));
        }
    }
    assert_eq!(triggered_at, vec![2, 6]);

    let stats = dispatcher.shutdown().expect("shutdown");
    assert_eq!(stats.dispatched, 2);
    assert_eq!(stats.dropped, 0);
    assert_eq!(stats.email_failures, 0);

    // 1 header + 2 records, 7 fields each.
    let raw = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(lines.len(), 3);
    for line in &lines {
        assert_eq!(line.split(',').count(), 7);
    }

    let sent = mailer.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].location_text.contains("12.2958"));
}

#[test]
fn geolocation_failure_falls_back_to_placeholder() {
    let dir = TempDir::new().unwrap();
    let mailer = RecordingMailer::new();
    let (dispatcher, log_path) = spawn_dispatcher(&dir, StaticLocator::failing(), mailer.clone());

    assert!(dispatcher.enqueue(snapshot(Severity::Large, 3)));
    let stats = dispatcher.shutdown().expect("shutdown");
    assert_eq!(stats.dispatched, 1);

    let records = EventLog::new(&log_path).read_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].city, "Mysore");
    assert_eq!(records[0].latitude, "N/A");
    assert_eq!(records[0].longitude, "N/A");
    assert_eq!(records[0].severity, "Large");
    assert_eq!(records[0].count, 3);

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].location_text.contains("N/A"));
}

#[test]
fn email_failure_is_counted_but_evidence_survives() {
    let dir = TempDir::new().unwrap();
    let locator = StaticLocator::fixed(LocationFix {
        city: "Mysore".to_string(),
        latitude: "12.2958".to_string(),
        longitude: "76.6394".to_string(),
    });
    let (dispatcher, log_path) = spawn_dispatcher(&dir, locator, RecordingMailer::failing());

    assert!(dispatcher.enqueue(snapshot(Severity::Small, 1)));
    let stats = dispatcher.shutdown().expect("shutdown");

    assert_eq!(stats.dispatched, 1);
    assert_eq!(stats.email_failures, 1);
    assert_eq!(stats.log_failures, 0);

    // CSV row and snapshot were written despite the failed send.
    let records = EventLog::new(&log_path).read_all().unwrap();
    assert_eq!(records.len(), 1);

    let images: Vec<_> = std::fs::read_dir(dir.path().join("images"))
        .unwrap()
        .collect();
    assert_eq!(images.len(), 1);
}

#[test]
fn repeated_episodes_accumulate_log_rows() {
    let dir = TempDir::new().unwrap();
    let locator = StaticLocator::fixed(LocationFix {
        city: "Mysore".to_string(),
        latitude: "12.2958".to_string(),
        longitude: "76.6394".to_string(),
    });
    let (dispatcher, log_path) = spawn_dispatcher(&dir, locator, RecordingMailer::new());

    let mut controller = EpisodeController::new();
    let episodes = 4;
    for _ in 0..episodes {
        assert_eq!(controller.observe(1), EpisodeTransition::Triggered);
        assert!(dispatcher.enqueue(snapshot(Severity::Small, 1)));
        assert_eq!(controller.observe(0), EpisodeTransition::Reset);
    }

    dispatcher.shutdown().expect("shutdown");

    let raw = std::fs::read_to_string(&log_path).unwrap();
    assert_eq!(raw.lines().count(), episodes + 1);
}
