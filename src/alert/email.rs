//! Outbound alert mail.
//!
//! One message per episode: plain-text body with date, time, location, and
//! severity, plus the episode snapshot and the full cumulative CSV log as
//! attachments. Transport is an authenticated SMTPS relay.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};

/// SMTP relay settings. The password is expected to come from the
/// environment in production (see the config module), not the config file.
#[derive(Clone, Debug, PartialEq)]
pub struct EmailSettings {
    pub smtp_relay: String,
    pub username: String,
    pub password: String,
    pub sender: String,
    pub recipient: String,
}

/// Everything needed to compose one alert message.
#[derive(Clone, Debug, PartialEq)]
pub struct AlertMessage {
    pub date: String,
    pub time: String,
    pub location_text: String,
    pub severity: String,
    pub image_path: PathBuf,
    pub log_path: PathBuf,
}

impl AlertMessage {
    fn body_text(&self) -> String {
        format!(
            "Pothole detected!\n\n\
             Date: {}\n\
             Time: {}\n\
             Location: {}\n\
             Severity: {}\n\n\
             Attached:\n\
             - detected pothole image\n\
             - CSV log file\n",
            self.date, self.time, self.location_text, self.severity
        )
    }
}

/// Mail seam. Production sends over SMTP; tests use [`RecordingMailer`].
pub trait Mailer: Send {
    fn send_alert(&self, alert: &AlertMessage) -> Result<()>;
}

pub struct SmtpMailer {
    settings: EmailSettings,
}

impl SmtpMailer {
    pub fn new(settings: EmailSettings) -> Self {
        Self { settings }
    }

    fn compose(&self, alert: &AlertMessage) -> Result<Message> {
        let image_bytes = std::fs::read(&alert.image_path).with_context(|| {
            format!(
                "failed to read snapshot attachment {}",
                alert.image_path.display()
            )
        })?;
        let image_name = file_name(&alert.image_path);

        let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(alert.body_text()));
        parts = parts.singlepart(
            Attachment::new(image_name).body(image_bytes, ContentType::parse("image/jpeg")?),
        );

        if alert.log_path.exists() {
            let log_bytes = std::fs::read(&alert.log_path).with_context(|| {
                format!("failed to read log attachment {}", alert.log_path.display())
            })?;
            parts = parts.singlepart(
                Attachment::new(file_name(&alert.log_path))
                    .body(log_bytes, ContentType::parse("text/csv")?),
            );
        }

        let message = Message::builder()
            .from(self.settings.sender.parse::<Mailbox>()?)
            .to(self.settings.recipient.parse::<Mailbox>()?)
            .subject("Pothole Detected Alert")
            .multipart(parts)
            .context("failed to build alert message")?;
        Ok(message)
    }
}

impl Mailer for SmtpMailer {
    fn send_alert(&self, alert: &AlertMessage) -> Result<()> {
        let message = self.compose(alert)?;

        let transport = SmtpTransport::relay(&self.settings.smtp_relay)
            .context("failed to configure SMTP relay")?
            .credentials(Credentials::new(
                self.settings.username.clone(),
                self.settings.password.clone(),
            ))
            .build();

        transport
            .send(&message)
            .with_context(|| format!("SMTP send via {} failed", self.settings.smtp_relay))?;
        log::info!("alert email sent to {}", self.settings.recipient);
        Ok(())
    }
}

/// Used when no email settings are configured: the alert is still logged and
/// its artifacts written, only the outbound message is skipped.
pub struct DisabledMailer;

impl Mailer for DisabledMailer {
    fn send_alert(&self, alert: &AlertMessage) -> Result<()> {
        log::warn!(
            "email disabled; alert for {} {} not sent",
            alert.date,
            alert.time
        );
        Ok(())
    }
}

/// Records composed alerts instead of sending them.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<AlertMessage>>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose sends always fail, for transport-failure tests.
    pub fn failing() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<AlertMessage> {
        self.sent.lock().expect("mailer lock poisoned").clone()
    }
}

impl Mailer for RecordingMailer {
    fn send_alert(&self, alert: &AlertMessage) -> Result<()> {
        if self.fail {
            return Err(anyhow::anyhow!("scripted SMTP failure"));
        }
        self.sent
            .lock()
            .expect("mailer lock poisoned")
            .push(alert.clone());
        Ok(())
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string())
}
