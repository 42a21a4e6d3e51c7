//! Device-position provider using IP geolocation (ipapi.co response shape).
//!
//! A terminal has no GPS, so the position of the machine's public IP stands
//! in for the device position. Every failure is reported as
//! [`PortError::GeolocationDenied`] and the caller falls back to its default.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use ridemap_core::{
    model::LatLng,
    ports::{LocatePort, PortError},
};

/// Configuration for the IP geolocation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpLocatorConfig {
    /// Base URL of the service; `/json/` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://ipapi.co".to_owned()
}

const fn default_timeout_secs() -> u64 {
    5
}

impl Default for IpLocatorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl IpLocatorConfig {
    /// Configuration pointing at a local mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout_secs: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PositionResponse {
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    // ipapi.co signals rate limiting with `"error": true` and a reason.
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// Looks up the approximate position of the current network connection.
pub struct IpLocator {
    client: Client,
    config: IpLocatorConfig,
}

impl IpLocator {
    /// Create a locator bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client, config: IpLocatorConfig) -> Self {
        Self { client, config }
    }

    async fn lookup(&self) -> Result<LatLng, PortError> {
        let base = self.config.base_url.trim_end_matches('/');
        let body: PositionResponse = self
            .client
            .get(format!("{base}/json/"))
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if body.error {
            let reason = body.reason.unwrap_or_else(|| "lookup refused".to_owned());
            return Err(PortError::GeolocationDenied(reason));
        }

        match (body.latitude, body.longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Ok(LatLng::new(lat, lng))
            }
            _ => Err(PortError::GeolocationDenied(
                "response carried no coordinates".to_owned(),
            )),
        }
    }
}

#[async_trait]
impl LocatePort for IpLocator {
    #[instrument(skip(self))]
    async fn current_position(&self) -> Result<LatLng, PortError> {
        match self.lookup().await {
            Ok(point) => {
                debug!(%point, "position resolved");
                Ok(point)
            }
            Err(PortError::GeolocationDenied(reason)) => Err(PortError::GeolocationDenied(reason)),
            Err(err) => Err(PortError::GeolocationDenied(err.to_string())),
        }
    }
}
