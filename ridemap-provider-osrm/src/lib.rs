//! Routing provider backed by the OSRM HTTP API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use ridemap_core::{
    model::{LatLng, RouteMetrics},
    ports::{PortError, RoutePort},
};

/// Configuration for the OSRM service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsrmConfig {
    /// Base URL of the OSRM server.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Routing profile segment of the URL.
    #[serde(default = "default_profile")]
    pub profile: String,
}

fn default_base_url() -> String {
    "https://router.project-osrm.org".to_owned()
}

fn default_profile() -> String {
    "driving".to_owned()
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            profile: default_profile(),
        }
    }
}

impl OsrmConfig {
    /// Configuration pointing at a local mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            ..Self::default()
        }
    }
}

/// Response from /route/v1/{profile}/{coordinates}
#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<RouteEntry>,
}

/// Single route alternative.
#[derive(Debug, Deserialize)]
struct RouteEntry {
    /// Meters.
    distance: f64,
    /// Seconds.
    duration: f64,
}

/// Driving routes from an OSRM server.
pub struct OsrmRouter {
    client: Client,
    config: OsrmConfig,
}

impl OsrmRouter {
    /// Create a router bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client, config: OsrmConfig) -> Self {
        Self { client, config }
    }

    fn route_url(&self, from: LatLng, to: LatLng) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        // OSRM takes longitude first.
        format!(
            "{base}/route/v1/{profile}/{},{};{},{}",
            from.lng,
            from.lat,
            to.lng,
            to.lat,
            profile = self.config.profile,
        )
    }
}

#[async_trait]
impl RoutePort for OsrmRouter {
    #[instrument(skip(self), fields(%from, %to))]
    async fn route(&self, from: LatLng, to: LatLng) -> Result<RouteMetrics, PortError> {
        let resp = self
            .client
            .get(self.route_url(from, to))
            .query(&[("overview", "false"), ("alternatives", "false")])
            .send()
            .await?;

        // "NoRoute" and friends come back as 400 with a JSON body, so the body
        // is read before the status is judged.
        let status = resp.status();
        let body = resp.text().await?;
        let parsed = match serde_json::from_str::<RouteResponse>(&body) {
            Ok(parsed) => parsed,
            Err(err) if status.is_success() => {
                return Err(PortError::Parse(format!("OSRM response: {err}")));
            }
            Err(_) => {
                return Err(PortError::Internal(format!("OSRM returned HTTP {status}")));
            }
        };

        if parsed.code != "Ok" {
            debug!(code = %parsed.code, message = ?parsed.message, "no route");
            return Err(PortError::NoRouteFound);
        }

        let best = parsed
            .routes
            .into_iter()
            .next()
            .ok_or(PortError::NoRouteFound)?;

        debug!(meters = best.distance, seconds = best.duration, "route found");
        Ok(RouteMetrics {
            total_distance_meters: best.distance,
            total_time_seconds: best.duration,
        })
    }
}
