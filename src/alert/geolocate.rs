//! Best-effort device geolocation.
//!
//! The lookup resolves coordinates from the device's public IP via an HTTP
//! JSON service. It is strictly best-effort: the dispatcher substitutes a
//! placeholder fix on any failure and the alert proceeds. The city label is
//! configuration, not lookup output, because deployments are stationary.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

pub const DEFAULT_GEO_ENDPOINT: &str = "http://ip-api.com/json/";

/// Resolved (or placeholder) location for one alert.
#[derive(Clone, Debug, PartialEq)]
pub struct LocationFix {
    pub city: String,
    pub latitude: String,
    pub longitude: String,
}

impl LocationFix {
    /// The fix recorded when the lookup fails.
    pub fn placeholder(city: &str) -> Self {
        Self {
            city: city.to_string(),
            latitude: "N/A".to_string(),
            longitude: "N/A".to_string(),
        }
    }

    /// Human-readable form used in the email body.
    pub fn display_text(&self) -> String {
        format!(
            "{}\nLatitude: {}, Longitude: {}",
            self.city, self.latitude, self.longitude
        )
    }
}

/// Location lookup seam. The production client talks HTTP; tests use
/// [`StaticLocator`].
pub trait Locate: Send {
    fn locate(&self) -> Result<LocationFix>;
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    status: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// HTTP IP-geolocation client.
pub struct IpGeolocator {
    endpoint: String,
    city_label: String,
    timeout: Duration,
}

impl IpGeolocator {
    pub fn new(endpoint: &str, city_label: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            city_label: city_label.to_string(),
            timeout,
        }
    }
}

impl Locate for IpGeolocator {
    fn locate(&self) -> Result<LocationFix> {
        let response = ureq::get(&self.endpoint)
            .timeout(self.timeout)
            .call()
            .with_context(|| format!("geolocation request to {} failed", self.endpoint))?;
        let body: GeoResponse = response
            .into_json()
            .context("geolocation response was not valid JSON")?;

        if let Some(status) = &body.status {
            if status != "success" {
                return Err(anyhow!("geolocation service returned status '{}'", status));
            }
        }

        let (lat, lon) = match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return Err(anyhow!("geolocation response missing coordinates")),
        };

        Ok(LocationFix {
            city: self.city_label.clone(),
            latitude: format!("{:.4}", lat),
            longitude: format!("{:.4}", lon),
        })
    }
}

/// Scripted locator for tests: either a fixed answer or a guaranteed failure.
pub struct StaticLocator {
    fix: Option<LocationFix>,
}

impl StaticLocator {
    pub fn fixed(fix: LocationFix) -> Self {
        Self { fix: Some(fix) }
    }

    pub fn failing() -> Self {
        Self { fix: None }
    }
}

impl Locate for StaticLocator {
    fn locate(&self) -> Result<LocationFix> {
        self.fix
            .clone()
            .ok_or_else(|| anyhow!("scripted geolocation failure"))
    }
}
