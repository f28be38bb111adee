//! Once-per-episode alert path: geolocation, evidence persistence, email.

mod dispatcher;
pub mod email;
pub mod geolocate;

pub use dispatcher::{AlertDispatcher, AlertSnapshot, DispatchStats};
pub use email::{AlertMessage, DisabledMailer, EmailSettings, Mailer, RecordingMailer, SmtpMailer};
pub use geolocate::{IpGeolocator, Locate, LocationFix, StaticLocator, DEFAULT_GEO_ENDPOINT};
