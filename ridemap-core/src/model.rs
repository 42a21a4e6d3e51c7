//! Domain data structures for map points, endpoints, routes and fares.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fallback position used when the device position is unavailable (Mumbai city centre).
pub const FALLBACK_POSITION: LatLng = LatLng {
    lat: 19.076,
    lng: 72.8777,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Raw geographic coordinate.
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Construct a coordinate pair.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A resolved point with its human-readable address.
pub struct Location {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Address label returned by the geocoder.
    pub address: String,
}

impl Location {
    /// Construct a location from a coordinate and an address label.
    #[must_use]
    pub fn new<A: Into<String>>(point: LatLng, address: A) -> Self {
        Self {
            lat: point.lat,
            lng: point.lng,
            address: address.into(),
        }
    }

    /// Coordinate of this location.
    #[must_use]
    pub const fn point(&self) -> LatLng {
        LatLng {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// One end of a ride.
pub enum Endpoint {
    /// Where the ride starts.
    Pickup,
    /// Where the ride ends.
    Destination,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Endpoint::Pickup => "pickup",
            Endpoint::Destination => "destination",
        };
        write!(formatter, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Key of a marker on the map surface.
pub enum MarkerRole {
    /// Pickup point marker.
    Pickup,
    /// Destination point marker.
    Destination,
    /// Marker for the user's own position.
    Current,
}

impl From<Endpoint> for MarkerRole {
    fn from(endpoint: Endpoint) -> Self {
        match endpoint {
            Endpoint::Pickup => MarkerRole::Pickup,
            Endpoint::Destination => MarkerRole::Destination,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Raw payload of a found route, as reported by the routing service.
pub struct RouteMetrics {
    /// Route length in meters.
    pub total_distance_meters: f64,
    /// Travel time in seconds.
    pub total_time_seconds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Distance and duration of the current route.
pub struct RouteSummary {
    /// Route length in kilometers.
    pub distance_km: f64,
    /// Travel time in whole minutes.
    pub duration_min: u32,
}

impl From<RouteMetrics> for RouteSummary {
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "value is clamped to the u32 range before the cast"
    )]
    fn from(metrics: RouteMetrics) -> Self {
        let minutes = (metrics.total_time_seconds / 60.0)
            .round()
            .clamp(0.0, f64::from(u32::MAX));
        Self {
            distance_km: (metrics.total_distance_meters / 1000.0).max(0.0),
            duration_min: minutes as u32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Itemised fare estimate for a route.
///
/// `night_charge` and `surge_charge` are `None` when not applicable and are
/// left out of the serialized form entirely.
pub struct FareBreakdown {
    /// Flat charge per ride.
    pub base_fare: f64,
    /// Charge for the distance travelled.
    pub distance_fare: f64,
    /// Charge for the time travelled.
    pub time_fare: f64,
    /// Final amount after surcharges, minimum fare and rounding.
    pub total_fare: f64,
    /// Night surcharge, when the ride starts inside a night window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub night_charge: Option<f64>,
    /// Peak-hour surcharge, when the ride starts inside a surge window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surge_charge: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Where the user position came from.
pub enum PositionSource {
    /// Reported by the device / locator service.
    Device,
    /// Fixed default used after a failed or denied lookup.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// The user's current position, resolved once per session.
pub struct UserLocation {
    /// Coordinate of the user.
    pub position: LatLng,
    /// Origin of the coordinate.
    pub source: PositionSource,
}

impl UserLocation {
    /// Position reported by the device.
    #[must_use]
    pub const fn device(position: LatLng) -> Self {
        Self {
            position,
            source: PositionSource::Device,
        }
    }

    /// Default city-centre position.
    #[must_use]
    pub const fn fallback() -> Self {
        Self {
            position: FALLBACK_POSITION,
            source: PositionSource::Fallback,
        }
    }
}
