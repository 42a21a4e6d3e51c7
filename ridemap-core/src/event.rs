//! Completion events sent from background calls back to the coordinator.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::UnboundedSender;

use crate::model::{Endpoint, Location, RouteSummary, UserLocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// User gesture that produced a picked location.
pub enum PickOrigin {
    /// Click on the map, resolved by reverse geocoding.
    Click,
    /// Submitted search text, resolved by forward geocoding.
    Search,
}

#[derive(Debug, Clone, PartialEq)]
/// Result of an asynchronous call, applied by the coordinator in arrival order.
pub enum BookingEvent {
    /// The device position lookup finished (or fell back).
    UserLocated(UserLocation),
    /// A geocoding call resolved a location for an endpoint.
    LocationPicked {
        /// Endpoint the request was issued for.
        endpoint: Endpoint,
        /// Sequence number of the request.
        seq: u64,
        /// Resolved location.
        location: Location,
        /// Gesture that started the request.
        origin: PickOrigin,
    },
    /// A route computation finished.
    RouteReady {
        /// Generation of the computation.
        generation: u64,
        /// Distance and duration of the found route.
        summary: RouteSummary,
    },
}

/// Channel end used by background tasks.
pub type EventSender = UnboundedSender<BookingEvent>;

#[derive(Debug, Clone, Default)]
/// Shared flag marking a booking session as torn down.
pub struct SessionToken {
    cancelled: Arc<AtomicBool>,
}

impl SessionToken {
    /// Fresh, live token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the session as torn down. Irreversible.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether [`SessionToken::cancel`] was called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Send `event` unless the session is gone.
    pub(crate) fn send(&self, events: &EventSender, event: BookingEvent) {
        if self.is_cancelled() {
            tracing::debug!("session cancelled, dropping completion");
            return;
        }
        if events.send(event).is_err() {
            tracing::debug!("event channel closed, dropping completion");
        }
    }
}
