mod backend;
mod backends;
mod result;
mod severity;

pub use backend::{DetectorBackend, DetectorConfig};
pub use backends::StubBackend;
#[cfg(feature = "backend-tract")]
pub use backends::TractBackend;
pub use result::BoundingBox;
pub use severity::{Severity, SeverityThresholds};
