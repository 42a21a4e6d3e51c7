//! Bundle of the external services a booking session talks to.

use std::sync::Arc;

use crate::ports::{GeocodePort, LocatePort, RoutePort};

/// Collection of ports implementing the map backend.
#[derive(Clone)]
pub struct MapBackend {
    /// Address search and reverse lookup.
    pub geocoder: Arc<dyn GeocodePort>,
    /// Route computation.
    pub router: Arc<dyn RoutePort>,
    /// Device position lookup.
    pub locator: Arc<dyn LocatePort>,
}

impl MapBackend {
    /// Build a backend from its three ports.
    #[must_use]
    pub fn new(
        geocoder: Arc<dyn GeocodePort>,
        router: Arc<dyn RoutePort>,
        locator: Arc<dyn LocatePort>,
    ) -> Self {
        Self {
            geocoder,
            router,
            locator,
        }
    }
}
