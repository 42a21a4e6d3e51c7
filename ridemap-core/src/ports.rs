//! Traits describing external capabilities and shared helper types.

use async_trait::async_trait;
use chrono::{Local, Timelike};
use reqwest::Error as ReqwestError;

use crate::model::{LatLng, Location, MarkerRole, RouteMetrics};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to external services.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Geocoding returned an empty result set.
    #[error("No results for: {0}")]
    NotFound(String),
    /// The routing service found no path between the waypoints.
    #[error("No route found")]
    NoRouteFound,
    /// The device position is unavailable or access was refused.
    #[error("Geolocation denied: {0}")]
    GeolocationDenied(String),
    /// Service response could not be interpreted.
    #[error("Parse error: {0}")]
    Parse(String),
    /// Internal provider error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[async_trait]
/// Forward and reverse address resolution.
pub trait GeocodePort: Send + Sync {
    /// Resolve free text to the top-ranked matching location.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::NotFound`] for an empty result set and
    /// [`PortError::Network`] when the request fails.
    async fn forward(&self, query: &str) -> Result<Location, PortError>;

    /// Resolve a coordinate to an address, keeping the coordinate itself.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Network`] when the request fails.
    async fn reverse(&self, point: LatLng) -> Result<Location, PortError>;
}

#[async_trait]
/// Route computation between two waypoints.
pub trait RoutePort: Send + Sync {
    /// Compute the best route from `from` to `to`. Alternatives are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::NoRouteFound`] when no path exists, or a transport error.
    async fn route(&self, from: LatLng, to: LatLng) -> Result<RouteMetrics, PortError>;
}

#[async_trait]
/// One-shot lookup of the device position.
pub trait LocatePort: Send + Sync {
    /// Current position of the device.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::GeolocationDenied`] when no position can be obtained.
    async fn current_position(&self) -> Result<LatLng, PortError>;
}

/// Rendering surface for markers and the route overlay.
///
/// Implementations own no booking state. Markers are keyed by role and a
/// second `set_marker` for the same role replaces the first; at most one route
/// overlay is shown at a time.
pub trait MapSurface {
    /// Place or move the marker for `role`.
    fn set_marker(&mut self, role: MarkerRole, location: &Location);

    /// Remove the marker for `role`, if any.
    fn clear_marker(&mut self, role: MarkerRole);

    /// Show the route overlay between two points, replacing any previous overlay.
    fn draw_route(&mut self, from: &Location, to: &Location);

    /// Remove the route overlay, if any.
    fn clear_route(&mut self);

    /// Center the view on `point` at the given zoom level.
    fn center_on(&mut self, point: LatLng, zoom: u8);

    /// Adjust the view so both points are visible.
    fn fit_bounds(&mut self, corner: LatLng, opposite: LatLng);
}

/// Source of the local hour used for time-of-day pricing.
pub trait Clock: Send + Sync {
    /// Hour of day in `0..=23`.
    fn hour(&self) -> u32;
}

#[derive(Debug, Clone, Copy, Default)]
/// Clock reading the local wall time.
pub struct LocalClock;

impl Clock for LocalClock {
    fn hour(&self) -> u32 {
        Local::now().hour()
    }
}

#[derive(Debug, Clone, Copy)]
/// Clock frozen at a fixed hour.
pub struct FixedClock(pub u32);

impl Clock for FixedClock {
    fn hour(&self) -> u32 {
        self.0
    }
}
