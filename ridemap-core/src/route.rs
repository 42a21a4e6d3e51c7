//! Route computation that keeps at most one request alive.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::event::{BookingEvent, EventSender, SessionToken};
use crate::model::{Location, RouteSummary};
use crate::ports::RoutePort;

/// Starts route computations and tears down the previous one on every restart.
///
/// Each computation is stamped with a generation number. Only a completion
/// carrying the current generation may be applied, so a result for a stale
/// pickup/destination pair is never used even if it slips past the abort.
pub struct RouteEngine {
    port: Arc<dyn RoutePort>,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
}

impl RouteEngine {
    /// Create an engine bound to a routing backend.
    #[must_use]
    pub fn new(port: Arc<dyn RoutePort>) -> Self {
        Self {
            port,
            generation: 0,
            in_flight: None,
        }
    }

    /// Whether a completion stamped with `generation` may still be applied.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.in_flight.is_some() && generation == self.generation
    }

    /// Whether a computation is running.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Start computing the route from `from` to `to`, aborting any computation
    /// still in flight. Returns the new generation.
    ///
    /// On success a [`BookingEvent::RouteReady`] is sent; failures are logged
    /// and produce no event.
    pub fn compute(
        &mut self,
        from: &Location,
        to: &Location,
        events: &EventSender,
        session: &SessionToken,
    ) -> u64 {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let port = Arc::clone(&self.port);
        let (start, end) = (from.point(), to.point());
        let events = events.clone();
        let session = session.clone();

        debug!(generation, %start, %end, "computing route");
        self.in_flight = Some(tokio::spawn(async move {
            match port.route(start, end).await {
                Ok(metrics) => {
                    let summary = RouteSummary::from(metrics);
                    session.send(&events, BookingEvent::RouteReady { generation, summary });
                }
                Err(err) => warn!(generation, error = %err, "route computation failed"),
            }
        }));
        generation
    }

    /// Abort the computation in flight, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if !handle.is_finished() {
                debug!(generation = self.generation, "aborting route computation");
            }
            handle.abort();
        }
    }

    /// Mark the current computation as delivered.
    pub(crate) fn finish(&mut self) {
        self.in_flight = None;
    }
}

impl Drop for RouteEngine {
    fn drop(&mut self) {
        self.cancel();
    }
}
