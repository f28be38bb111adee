use std::sync::Mutex;

use tempfile::NamedTempFile;

use pothole_sentinel::SentinelConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "SENTINEL_CONFIG",
        "SENTINEL_CAMERA_URL",
        "SENTINEL_BACKEND",
        "SENTINEL_MODEL_PATH",
        "SENTINEL_CONFIDENCE",
        "SENTINEL_CITY_LABEL",
        "SENTINEL_LOG_PATH",
        "SENTINEL_IMAGE_DIR",
        "SENTINEL_SMTP_PASSWORD",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_defaults_without_file() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = SentinelConfig::load().expect("load config");

    assert_eq!(cfg.camera.url, "stub://road_camera");
    assert_eq!(cfg.camera.target_fps, 10);
    assert_eq!(cfg.detector.backend, "stub");
    assert!((cfg.detector.config.confidence_threshold - 0.60).abs() < 1e-6);
    assert!((cfg.detector.severity.small_max - 0.02).abs() < 1e-6);
    assert!((cfg.detector.severity.medium_max - 0.06).abs() < 1e-6);
    assert_eq!(cfg.alerts.log_path, "alerts/logs/pothole_log.csv");
    assert_eq!(cfg.alerts.image_dir, "alerts/images");
    assert!(cfg.email.is_none());

    clear_env();
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "camera": {
            "url": "http://camera-1/stream",
            "target_fps": 12,
            "width": 800,
            "height": 600
        },
        "detector": {
            "backend": "stub",
            "confidence_threshold": 0.63,
            "iou_threshold": 0.5,
            "max_detections": 30
        },
        "alerts": {
            "log_path": "run/pothole_log.csv",
            "image_dir": "run/images",
            "queue_depth": 4
        },
        "location": {
            "city_label": "Mysore",
            "timeout_secs": 3
        },
        "email": {
            "smtp_relay": "smtp.gmail.com",
            "username": "sender@example.com",
            "sender": "sender@example.com",
            "recipient": "ops@example.com"
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("SENTINEL_CONFIG", file.path());
    std::env::set_var("SENTINEL_CAMERA_URL", "stub://bench");
    std::env::set_var("SENTINEL_SMTP_PASSWORD", "app-password");

    let cfg = SentinelConfig::load().expect("load config");

    assert_eq!(cfg.camera.url, "stub://bench");
    assert_eq!(cfg.camera.target_fps, 12);
    assert_eq!(cfg.camera.width, 800);
    assert!((cfg.detector.config.confidence_threshold - 0.63).abs() < 1e-6);
    assert_eq!(cfg.alerts.log_path, "run/pothole_log.csv");
    assert_eq!(cfg.alerts.queue_depth, 4);
    assert_eq!(cfg.location.city_label, "Mysore");
    assert_eq!(cfg.location.timeout.as_secs(), 3);

    let email = cfg.email.expect("email settings");
    assert_eq!(email.smtp_relay, "smtp.gmail.com");
    assert_eq!(email.recipient, "ops@example.com");
    assert_eq!(email.password, "app-password");

    clear_env();
}

#[test]
fn rejects_invalid_thresholds() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("SENTINEL_CONFIDENCE", "1.5");
    assert!(SentinelConfig::load().is_err());

    std::env::set_var("SENTINEL_CONFIDENCE", "not-a-number");
    assert!(SentinelConfig::load().is_err());

    clear_env();
}

#[test]
fn tract_backend_requires_model_path() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("SENTINEL_BACKEND", "tract");
    assert!(SentinelConfig::load().is_err());

    std::env::set_var("SENTINEL_MODEL_PATH", "models/pothole.onnx");
    let cfg = SentinelConfig::load().expect("load config");
    assert_eq!(cfg.detector.backend, "tract");
    assert_eq!(cfg.detector.model_path.as_deref(), Some("models/pothole.onnx"));

    clear_env();
}
