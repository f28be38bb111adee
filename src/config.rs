use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::alert::email::EmailSettings;
use crate::alert::geolocate::DEFAULT_GEO_ENDPOINT;
use crate::detect::{DetectorConfig, SeverityThresholds};
use crate::ingest::CameraConfig;

const DEFAULT_CAMERA_URL: &str = "stub://road_camera";
const DEFAULT_CAMERA_FPS: u32 = 10;
const DEFAULT_CAMERA_WIDTH: u32 = 640;
const DEFAULT_CAMERA_HEIGHT: u32 = 480;
const DEFAULT_BACKEND: &str = "stub";
const DEFAULT_IMAGE_DIR: &str = "alerts/images";
const DEFAULT_LOG_PATH: &str = "alerts/logs/pothole_log.csv";
const DEFAULT_QUEUE_DEPTH: usize = 8;
const DEFAULT_CITY_LABEL: &str = "Unknown";
const DEFAULT_GEO_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Deserialize, Default)]
struct SentinelConfigFile {
    camera: Option<CameraConfigFile>,
    detector: Option<DetectorConfigFile>,
    alerts: Option<AlertsConfigFile>,
    location: Option<LocationConfigFile>,
    email: Option<EmailConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    url: Option<String>,
    target_fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    backend: Option<String>,
    model_path: Option<String>,
    confidence_threshold: Option<f32>,
    iou_threshold: Option<f32>,
    max_detections: Option<usize>,
    severity_small_max: Option<f32>,
    severity_medium_max: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct AlertsConfigFile {
    image_dir: Option<String>,
    log_path: Option<String>,
    queue_depth: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct LocationConfigFile {
    city_label: Option<String>,
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct EmailConfigFile {
    smtp_relay: Option<String>,
    username: Option<String>,
    password: Option<String>,
    sender: Option<String>,
    recipient: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SentinelConfig {
    pub camera: CameraConfig,
    pub detector: DetectorSettings,
    pub alerts: AlertSettings,
    pub location: LocationSettings,
    /// Absent when the deployment has no outbound mail; alerts still log
    /// locally.
    pub email: Option<EmailSettings>,
}

#[derive(Debug, Clone)]
pub struct DetectorSettings {
    /// "stub" or "tract".
    pub backend: String,
    pub model_path: Option<String>,
    pub config: DetectorConfig,
    pub severity: SeverityThresholds,
}

#[derive(Debug, Clone)]
pub struct AlertSettings {
    pub image_dir: String,
    pub log_path: String,
    pub queue_depth: usize,
}

#[derive(Debug, Clone)]
pub struct LocationSettings {
    pub city_label: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl SentinelConfig {
    /// Load from the file named by `SENTINEL_CONFIG` (if set), then apply
    /// environment overrides, then validate.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SENTINEL_CONFIG").ok();
        Self::load_from(config_path.as_deref())
    }

    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let file_cfg = match config_path {
            Some(path) => read_config_file(Path::new(path))?,
            None => SentinelConfigFile::default(),
        };
        let mut cfg = Self::from_file(file_cfg);
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: SentinelConfigFile) -> Self {
        let camera = CameraConfig {
            url: file
                .camera
                .as_ref()
                .and_then(|camera| camera.url.clone())
                .unwrap_or_else(|| DEFAULT_CAMERA_URL.to_string()),
            target_fps: file
                .camera
                .as_ref()
                .and_then(|camera| camera.target_fps)
                .unwrap_or(DEFAULT_CAMERA_FPS),
            width: file
                .camera
                .as_ref()
                .and_then(|camera| camera.width)
                .unwrap_or(DEFAULT_CAMERA_WIDTH),
            height: file
                .camera
                .as_ref()
                .and_then(|camera| camera.height)
                .unwrap_or(DEFAULT_CAMERA_HEIGHT),
        };

        let detector_defaults = DetectorConfig::default();
        let severity_defaults = SeverityThresholds::default();
        let detector = DetectorSettings {
            backend: file
                .detector
                .as_ref()
                .and_then(|detector| detector.backend.clone())
                .unwrap_or_else(|| DEFAULT_BACKEND.to_string()),
            model_path: file
                .detector
                .as_ref()
                .and_then(|detector| detector.model_path.clone()),
            config: DetectorConfig {
                confidence_threshold: file
                    .detector
                    .as_ref()
                    .and_then(|detector| detector.confidence_threshold)
                    .unwrap_or(detector_defaults.confidence_threshold),
                iou_threshold: file
                    .detector
                    .as_ref()
                    .and_then(|detector| detector.iou_threshold)
                    .unwrap_or(detector_defaults.iou_threshold),
                max_detections: file
                    .detector
                    .as_ref()
                    .and_then(|detector| detector.max_detections)
                    .unwrap_or(detector_defaults.max_detections),
            },
            severity: SeverityThresholds {
                small_max: file
                    .detector
                    .as_ref()
                    .and_then(|detector| detector.severity_small_max)
                    .unwrap_or(severity_defaults.small_max),
                medium_max: file
                    .detector
                    .as_ref()
                    .and_then(|detector| detector.severity_medium_max)
                    .unwrap_or(severity_defaults.medium_max),
            },
        };

        let alerts = AlertSettings {
            image_dir: file
                .alerts
                .as_ref()
                .and_then(|alerts| alerts.image_dir.clone())
                .unwrap_or_else(|| DEFAULT_IMAGE_DIR.to_string()),
            log_path: file
                .alerts
                .as_ref()
                .and_then(|alerts| alerts.log_path.clone())
                .unwrap_or_else(|| DEFAULT_LOG_PATH.to_string()),
            queue_depth: file
                .alerts
                .as_ref()
                .and_then(|alerts| alerts.queue_depth)
                .unwrap_or(DEFAULT_QUEUE_DEPTH),
        };

        let location = LocationSettings {
            city_label: file
                .location
                .as_ref()
                .and_then(|location| location.city_label.clone())
                .unwrap_or_else(|| DEFAULT_CITY_LABEL.to_string()),
            endpoint: file
                .location
                .as_ref()
                .and_then(|location| location.endpoint.clone())
                .unwrap_or_else(|| DEFAULT_GEO_ENDPOINT.to_string()),
            timeout: Duration::from_secs(
                file.location
                    .as_ref()
                    .and_then(|location| location.timeout_secs)
                    .unwrap_or(DEFAULT_GEO_TIMEOUT_SECS),
            ),
        };

        let email = file.email.and_then(|email| {
            match (
                email.smtp_relay,
                email.username,
                email.sender,
                email.recipient,
            ) {
                (Some(smtp_relay), Some(username), Some(sender), Some(recipient)) => {
                    Some(EmailSettings {
                        smtp_relay,
                        username,
                        password: email.password.unwrap_or_default(),
                        sender,
                        recipient,
                    })
                }
                _ => None,
            }
        });

        Self {
            camera,
            detector,
            alerts,
            location,
            email,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("SENTINEL_CAMERA_URL") {
            if !url.trim().is_empty() {
                self.camera.url = url;
            }
        }
        if let Ok(backend) = std::env::var("SENTINEL_BACKEND") {
            if !backend.trim().is_empty() {
                self.detector.backend = backend;
            }
        }
        if let Ok(model_path) = std::env::var("SENTINEL_MODEL_PATH") {
            if !model_path.trim().is_empty() {
                self.detector.model_path = Some(model_path);
            }
        }
        if let Ok(threshold) = std::env::var("SENTINEL_CONFIDENCE") {
            let parsed: f32 = threshold
                .parse()
                .map_err(|_| anyhow!("SENTINEL_CONFIDENCE must be a number in (0, 1]"))?;
            self.detector.config.confidence_threshold = parsed;
        }
        if let Ok(city) = std::env::var("SENTINEL_CITY_LABEL") {
            if !city.trim().is_empty() {
                self.location.city_label = city;
            }
        }
        if let Ok(log_path) = std::env::var("SENTINEL_LOG_PATH") {
            if !log_path.trim().is_empty() {
                self.alerts.log_path = log_path;
            }
        }
        if let Ok(image_dir) = std::env::var("SENTINEL_IMAGE_DIR") {
            if !image_dir.trim().is_empty() {
                self.alerts.image_dir = image_dir;
            }
        }
        if let Ok(password) = std::env::var("SENTINEL_SMTP_PASSWORD") {
            if let Some(email) = self.email.as_mut() {
                email.password = password;
            }
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        if self.camera.target_fps == 0 {
            return Err(anyhow!("camera target_fps must be greater than zero"));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(anyhow!("camera dimensions must be greater than zero"));
        }

        let conf = self.detector.config.confidence_threshold;
        if !(conf > 0.0 && conf <= 1.0) {
            return Err(anyhow!("confidence_threshold must be in (0, 1]"));
        }
        let iou = self.detector.config.iou_threshold;
        if !(0.0..=1.0).contains(&iou) {
            return Err(anyhow!("iou_threshold must be in [0, 1]"));
        }
        if self.detector.config.max_detections == 0 {
            return Err(anyhow!("max_detections must be at least 1"));
        }

        let severity = self.detector.severity;
        if !(severity.small_max > 0.0 && severity.small_max < severity.medium_max) {
            return Err(anyhow!(
                "severity thresholds must satisfy 0 < small_max < medium_max"
            ));
        }

        match self.detector.backend.as_str() {
            "stub" => {}
            "tract" => {
                if self.detector.model_path.is_none() {
                    return Err(anyhow!("tract backend requires detector.model_path"));
                }
            }
            other => return Err(anyhow!("unknown detector backend '{}'", other)),
        }

        if self.alerts.queue_depth == 0 {
            return Err(anyhow!("alert queue_depth must be at least 1"));
        }

        if let Some(email) = &self.email {
            if email.smtp_relay.trim().is_empty()
                || email.sender.trim().is_empty()
                || email.recipient.trim().is_empty()
            {
                return Err(anyhow!("email settings must not be empty when present"));
            }
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<SentinelConfigFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let cfg = serde_json::from_str(&raw)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(cfg)
}
