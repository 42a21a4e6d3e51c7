//! Geocoding provider backed by the Nominatim (OpenStreetMap) API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use ridemap_core::{
    model::{LatLng, Location},
    ports::{GeocodePort, PortError},
};

/// Configuration for the Nominatim service.
///
/// Requests carry no timeout of their own; a lookup that never answers leaves
/// the endpoint unset. The Nominatim usage policy asks for an identifying
/// `User-Agent`, which belongs on the [`Client`] handed to the geocoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NominatimConfig {
    /// Base URL of the Nominatim API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_owned()
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl NominatimConfig {
    /// Configuration pointing at a local mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

/// Single hit from `/search` or the body of `/reverse`.
#[derive(Debug, Deserialize)]
struct Place {
    // Nominatim encodes coordinates as strings.
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl Place {
    fn point(&self) -> Result<LatLng, PortError> {
        let lat = parse_degrees(&self.lat)?;
        let lng = parse_degrees(&self.lon)?;
        Ok(LatLng::new(lat, lng))
    }
}

/// `/reverse` answers HTTP 200 with an `error` field when nothing is nearby.
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Address search and reverse lookup against Nominatim.
pub struct NominatimGeocoder {
    client: Client,
    config: NominatimConfig,
}

impl NominatimGeocoder {
    /// Create a geocoder bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client, config: NominatimConfig) -> Self {
        Self { client, config }
    }

    fn get(&self, endpoint: &str) -> RequestBuilder {
        let base = self.config.base_url.trim_end_matches('/');
        self.client.get(format!("{base}/{endpoint}"))
    }
}

#[async_trait]
impl GeocodePort for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn forward(&self, query: &str) -> Result<Location, PortError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PortError::NotFound(String::new()));
        }

        let req = self
            .get("search")
            .query(&[("format", "json"), ("q", query), ("limit", "1")]);
        let places = fetch_json::<Vec<Place>>(req).await?;

        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| PortError::NotFound(query.to_owned()))?;
        let point = place.point()?;
        let address = place.display_name.unwrap_or_else(|| point.to_string());

        debug!(%point, %address, "search resolved");
        Ok(Location::new(point, address))
    }

    #[instrument(skip(self), fields(%point))]
    async fn reverse(&self, point: LatLng) -> Result<Location, PortError> {
        let lat = point.lat.to_string();
        let lon = point.lng.to_string();
        let req = self
            .get("reverse")
            .query(&[("format", "json"), ("lat", lat.as_str()), ("lon", lon.as_str())]);
        let body = fetch_json::<ReverseResponse>(req).await?;

        if let Some(reason) = &body.error {
            debug!(%reason, "no address near point");
        }
        // The clicked coordinate is kept; only the label comes from the service.
        let address = body.display_name.unwrap_or_else(|| point.to_string());
        Ok(Location::new(point, address))
    }
}

fn parse_degrees(raw: &str) -> Result<f64, PortError> {
    raw.trim()
        .parse()
        .map_err(|err| PortError::Parse(format!("invalid coordinate {raw:?}: {err}")))
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    req.send()
        .await
        .map_err(PortError::from)?
        .error_for_status()
        .map_err(PortError::from)?
        .json()
        .await
        .map_err(PortError::from)
}
