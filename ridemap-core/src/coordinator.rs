//! Booking coordinator: the single owner of all booking-session state.
//!
//! User gestures arrive as method calls. Each external call runs as a spawned
//! task that reports back through a typed [`BookingEvent`] channel; the owner
//! of the coordinator applies those events one at a time, so no state is ever
//! shared between tasks.
//!
//! Concurrent geocoding requests are neither cancelled nor serialized. Every
//! request gets a sequence number per endpoint and only the completion carrying
//! the latest-issued number for that endpoint is applied, so the most recent
//! gesture wins regardless of arrival order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::MapBackend;
use crate::event::{BookingEvent, EventSender, PickOrigin, SessionToken};
use crate::fare::FareConfig;
use crate::model::{
    Endpoint, FareBreakdown, LatLng, Location, MarkerRole, RouteSummary, UserLocation,
};
use crate::ports::{Clock, MapSurface};
use crate::route::RouteEngine;
use crate::selection::{SelectionMode, SelectionStateMachine};

/// Zoom level for the initial view and "center on my location".
pub const DEFAULT_ZOOM: u8 = 13;
/// Zoom level after jumping to a search result.
pub const SEARCH_ZOOM: u8 = 16;
/// How long the one-shot device position lookup may take.
pub const LOCATE_TIMEOUT: Duration = Duration::from_secs(5);

const CURRENT_LOCATION_LABEL: &str = "Your Location";

/// Wires selection, geocoding, routing and fares to a map surface.
///
/// Background work needs a running tokio runtime. Dropping the coordinator
/// disposes it.
pub struct BookingCoordinator<S: MapSurface> {
    backend: MapBackend,
    surface: S,
    clock: Arc<dyn Clock>,
    fares: FareConfig,

    selection: SelectionStateMachine,
    pickup: Option<Location>,
    destination: Option<Location>,
    summary: Option<RouteSummary>,
    fare: Option<FareBreakdown>,
    user_location: Option<UserLocation>,

    route: RouteEngine,
    next_seq: u64,
    latest_seq: HashMap<Endpoint, u64>,
    tasks: Vec<JoinHandle<()>>,

    events: EventSender,
    inbox: UnboundedReceiver<BookingEvent>,
    session: SessionToken,
}

impl<S: MapSurface> BookingCoordinator<S> {
    /// Create a coordinator with the default fare rules.
    #[must_use]
    pub fn new(backend: MapBackend, surface: S, clock: Arc<dyn Clock>) -> Self {
        Self::with_fares(backend, surface, clock, FareConfig::default())
    }

    /// Create a coordinator with custom fare rules.
    #[must_use]
    pub fn with_fares(
        backend: MapBackend,
        surface: S,
        clock: Arc<dyn Clock>,
        fares: FareConfig,
    ) -> Self {
        let (events, inbox) = mpsc::unbounded_channel();
        let route = RouteEngine::new(Arc::clone(&backend.router));
        Self {
            backend,
            surface,
            clock,
            fares,
            selection: SelectionStateMachine::new(),
            pickup: None,
            destination: None,
            summary: None,
            fare: None,
            user_location: None,
            route,
            next_seq: 0,
            latest_seq: HashMap::new(),
            tasks: Vec::new(),
            events,
            inbox,
            session: SessionToken::new(),
        }
    }

    /// Look up the device position once. Falls back to the default city centre
    /// when the lookup fails or exceeds [`LOCATE_TIMEOUT`].
    pub fn start(&mut self) {
        let locator = Arc::clone(&self.backend.locator);
        let events = self.events.clone();
        let session = self.session.clone();

        self.track(tokio::spawn(async move {
            let lookup = tokio::time::timeout(LOCATE_TIMEOUT, locator.current_position());
            let located = match lookup.await {
                Ok(Ok(position)) => UserLocation::device(position),
                Ok(Err(err)) => {
                    warn!(error = %err, "device position unavailable, using fallback");
                    UserLocation::fallback()
                }
                Err(_elapsed) => {
                    warn!(timeout = ?LOCATE_TIMEOUT, "device position timed out, using fallback");
                    UserLocation::fallback()
                }
            };
            session.send(&events, BookingEvent::UserLocated(located));
        }));
    }

    /// Press the selection button for `endpoint`.
    pub fn toggle(&mut self, endpoint: Endpoint) -> SelectionMode {
        let mode = self.selection.toggle(endpoint);
        debug!(?mode, "selection mode changed");
        mode
    }

    /// Handle a click on the map. Ignored unless an endpoint is being selected.
    pub fn map_clicked(&mut self, point: LatLng) {
        let Some(endpoint) = self.selection.target() else {
            debug!(%point, "click ignored, no selection mode");
            return;
        };

        let seq = self.issue(endpoint);
        let geocoder = Arc::clone(&self.backend.geocoder);
        let events = self.events.clone();
        let session = self.session.clone();

        self.track(tokio::spawn(async move {
            match geocoder.reverse(point).await {
                Ok(location) => session.send(
                    &events,
                    BookingEvent::LocationPicked {
                        endpoint,
                        seq,
                        location,
                        origin: PickOrigin::Click,
                    },
                ),
                Err(err) => warn!(%endpoint, %point, error = %err, "reverse geocoding failed"),
            }
        }));
    }

    /// Handle a submitted search. Ignored for blank text or without a selection mode.
    pub fn search(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        let Some(endpoint) = self.selection.target() else {
            debug!(query, "search ignored, no selection mode");
            return;
        };

        let seq = self.issue(endpoint);
        let geocoder = Arc::clone(&self.backend.geocoder);
        let events = self.events.clone();
        let session = self.session.clone();
        let query = query.to_owned();

        self.track(tokio::spawn(async move {
            match geocoder.forward(&query).await {
                Ok(location) => session.send(
                    &events,
                    BookingEvent::LocationPicked {
                        endpoint,
                        seq,
                        location,
                        origin: PickOrigin::Search,
                    },
                ),
                Err(err) => warn!(%endpoint, %query, error = %err, "forward geocoding failed"),
            }
        }));
    }

    /// Reset one endpoint to empty and drop the route derived from it.
    pub fn clear(&mut self, endpoint: Endpoint) {
        let slot = match endpoint {
            Endpoint::Pickup => &mut self.pickup,
            Endpoint::Destination => &mut self.destination,
        };
        if slot.take().is_some() {
            info!(%endpoint, "endpoint cleared");
        }
        self.surface.clear_marker(endpoint.into());
        self.refresh_route();
    }

    /// Center the map on the user's position, once it is known.
    pub fn center_on_user(&mut self) {
        if let Some(user) = self.user_location {
            self.surface.center_on(user.position, DEFAULT_ZOOM);
        }
    }

    /// Apply one completion event.
    ///
    /// Returns `false` when the event was discarded: the session is disposed,
    /// the event is stale, or no endpoint is being selected any more.
    pub fn apply(&mut self, event: BookingEvent) -> bool {
        if self.session.is_cancelled() {
            debug!("session disposed, ignoring completion");
            return false;
        }

        match event {
            BookingEvent::UserLocated(user) => self.apply_user_location(user),
            BookingEvent::LocationPicked {
                endpoint,
                seq,
                location,
                origin,
            } => self.apply_pick(endpoint, seq, location, origin),
            BookingEvent::RouteReady {
                generation,
                summary,
            } => self.apply_route(generation, summary),
        }
    }

    /// Wait for the next completion event and apply it.
    pub async fn process_next(&mut self) -> bool {
        match self.inbox.recv().await {
            Some(event) => self.apply(event),
            None => false,
        }
    }

    /// Apply every completion that has already arrived. Returns how many changed state.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.inbox.try_recv() {
            if self.apply(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Tear the session down: cancel every pending call and reset all fields.
    ///
    /// Completions that arrive afterwards are discarded. Calling it twice is harmless.
    pub fn dispose(&mut self) {
        if self.session.is_cancelled() {
            return;
        }
        self.session.cancel();
        self.route.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.inbox.close();

        self.selection.reset();
        self.pickup = None;
        self.destination = None;
        self.summary = None;
        self.fare = None;

        self.surface.clear_route();
        for role in [MarkerRole::Pickup, MarkerRole::Destination, MarkerRole::Current] {
            self.surface.clear_marker(role);
        }
        info!("booking session disposed");
    }

    /// Current selection mode.
    #[must_use]
    pub fn mode(&self) -> SelectionMode {
        self.selection.mode()
    }

    /// Resolved pickup location.
    #[must_use]
    pub fn pickup(&self) -> Option<&Location> {
        self.pickup.as_ref()
    }

    /// Resolved destination location.
    #[must_use]
    pub fn destination(&self) -> Option<&Location> {
        self.destination.as_ref()
    }

    /// Summary of the current route.
    #[must_use]
    pub fn route_summary(&self) -> Option<&RouteSummary> {
        self.summary.as_ref()
    }

    /// Fare estimate for the current route.
    #[must_use]
    pub fn fare(&self) -> Option<&FareBreakdown> {
        self.fare.as_ref()
    }

    /// The user's position, once the lookup finished.
    #[must_use]
    pub fn user_location(&self) -> Option<&UserLocation> {
        self.user_location.as_ref()
    }

    /// Whether a route computation is in flight.
    #[must_use]
    pub fn is_routing(&self) -> bool {
        self.route.is_pending()
    }

    /// Whether [`BookingCoordinator::dispose`] has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.session.is_cancelled()
    }

    /// The map surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The map surface, for view-only changes such as panning.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn issue(&mut self, endpoint: Endpoint) -> u64 {
        self.next_seq += 1;
        self.latest_seq.insert(endpoint, self.next_seq);
        debug!(%endpoint, seq = self.next_seq, "geocoding request issued");
        self.next_seq
    }

    fn track(&mut self, task: JoinHandle<()>) {
        self.tasks.retain(|pending| !pending.is_finished());
        self.tasks.push(task);
    }

    fn apply_user_location(&mut self, user: UserLocation) -> bool {
        if self.user_location.is_some() {
            return false;
        }
        info!(position = %user.position, source = ?user.source, "user located");
        self.user_location = Some(user);
        self.surface.set_marker(
            MarkerRole::Current,
            &Location::new(user.position, CURRENT_LOCATION_LABEL),
        );
        self.surface.center_on(user.position, DEFAULT_ZOOM);
        true
    }

    fn apply_pick(
        &mut self,
        endpoint: Endpoint,
        seq: u64,
        location: Location,
        origin: PickOrigin,
    ) -> bool {
        if self.latest_seq.get(&endpoint) != Some(&seq) {
            debug!(%endpoint, seq, "stale geocoding result dropped");
            return false;
        }
        if !self.selection.deliver(endpoint) {
            debug!(%endpoint, seq, "no longer selecting this endpoint, result dropped");
            return false;
        }

        info!(%endpoint, address = %location.address, "endpoint set");
        self.surface.set_marker(endpoint.into(), &location);
        if origin == PickOrigin::Search {
            self.surface.center_on(location.point(), SEARCH_ZOOM);
        }
        match endpoint {
            Endpoint::Pickup => self.pickup = Some(location),
            Endpoint::Destination => self.destination = Some(location),
        }
        self.refresh_route();
        true
    }

    fn apply_route(&mut self, generation: u64, summary: RouteSummary) -> bool {
        if !self.route.is_current(generation) {
            debug!(generation, "stale route dropped");
            return false;
        }
        let (Some(pickup), Some(destination)) = (&self.pickup, &self.destination) else {
            return false;
        };
        self.route.finish();

        let fare = self.fares.for_route(&summary, self.clock.hour());
        info!(
            distance_km = summary.distance_km,
            duration_min = summary.duration_min,
            total_fare = fare.total_fare,
            "route ready"
        );
        self.surface.draw_route(pickup, destination);
        self.surface.fit_bounds(pickup.point(), destination.point());
        self.summary = Some(summary);
        self.fare = Some(fare);
        true
    }

    /// Invalidate the route and restart it when both endpoints are known.
    fn refresh_route(&mut self) {
        self.summary = None;
        self.fare = None;
        self.surface.clear_route();

        match (&self.pickup, &self.destination) {
            (Some(pickup), Some(destination)) => {
                self.route
                    .compute(pickup, destination, &self.events, &self.session);
            }
            _ => self.route.cancel(),
        }
    }
}

impl<S: MapSurface> Drop for BookingCoordinator<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::model::{PositionSource, RouteMetrics};
    use crate::ports::{FixedClock, GeocodePort, LocatePort, PortError, RoutePort};

    #[derive(Default)]
    struct RecordingSurface {
        markers: HashMap<MarkerRole, Location>,
        route: Option<(Location, Location)>,
        centers: Vec<(LatLng, u8)>,
        fits: usize,
    }

    impl MapSurface for RecordingSurface {
        fn set_marker(&mut self, role: MarkerRole, location: &Location) {
            self.markers.insert(role, location.clone());
        }

        fn clear_marker(&mut self, role: MarkerRole) {
            self.markers.remove(&role);
        }

        fn draw_route(&mut self, from: &Location, to: &Location) {
            self.route = Some((from.clone(), to.clone()));
        }

        fn clear_route(&mut self) {
            self.route = None;
        }

        fn center_on(&mut self, point: LatLng, zoom: u8) {
            self.centers.push((point, zoom));
        }

        fn fit_bounds(&mut self, _corner: LatLng, _opposite: LatLng) {
            self.fits += 1;
        }
    }

    /// Geocoder answering from fixed data; requests for `slow_point` wait on `gate`.
    #[derive(Default)]
    struct FakeGeocoder {
        places: HashMap<String, LatLng>,
        slow_point: Option<LatLng>,
        gate: Arc<Notify>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GeocodePort for FakeGeocoder {
        async fn forward(&self, query: &str) -> Result<Location, PortError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.places
                .get(query)
                .map(|point| Location::new(*point, query))
                .ok_or_else(|| PortError::NotFound(query.to_owned()))
        }

        async fn reverse(&self, point: LatLng) -> Result<Location, PortError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.slow_point == Some(point) {
                self.gate.notified().await;
            }
            Ok(Location::new(point, format!("near {point}")))
        }
    }

    /// Router measuring latitude difference; routes starting at `slow_from` wait on `gate`.
    #[derive(Default)]
    struct FakeRouter {
        slow_from: Mutex<Option<LatLng>>,
        gate: Arc<Notify>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RoutePort for FakeRouter {
        async fn route(&self, from: LatLng, to: LatLng) -> Result<RouteMetrics, PortError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let slow = *self.slow_from.lock().expect("lock") == Some(from);
            if slow {
                self.gate.notified().await;
            }
            // Whole 100 m steps keep the fare arithmetic exact.
            let hectometers = ((to.lat - from.lat).abs() * 1_000.0).round();
            Ok(RouteMetrics {
                total_distance_meters: hectometers * 100.0,
                total_time_seconds: 1_200.0,
            })
        }
    }

    struct FakeLocator(Option<LatLng>);

    #[async_trait]
    impl LocatePort for FakeLocator {
        async fn current_position(&self) -> Result<LatLng, PortError> {
            self.0
                .ok_or_else(|| PortError::GeolocationDenied("permission denied".to_owned()))
        }
    }

    const HOME: LatLng = LatLng::new(19.10, 72.85);
    const OFFICE: LatLng = LatLng::new(19.00, 72.83);
    const AIRPORT: LatLng = LatLng::new(19.09, 72.86);

    struct Harness {
        geocoder: Arc<FakeGeocoder>,
        router: Arc<FakeRouter>,
        coordinator: BookingCoordinator<RecordingSurface>,
    }

    fn harness_with(geocoder: FakeGeocoder, locator: FakeLocator, hour: u32) -> Harness {
        let geocoder = Arc::new(geocoder);
        let router = Arc::new(FakeRouter::default());
        let backend = MapBackend::new(
            Arc::clone(&geocoder) as Arc<dyn GeocodePort>,
            Arc::clone(&router) as Arc<dyn RoutePort>,
            Arc::new(locator),
        );
        let clock = Arc::new(FixedClock(hour));
        let coordinator = BookingCoordinator::new(backend, RecordingSurface::default(), clock);
        Harness {
            geocoder,
            router,
            coordinator,
        }
    }

    fn harness() -> Harness {
        let places = HashMap::from([
            ("home".to_owned(), HOME),
            ("office".to_owned(), OFFICE),
            ("airport".to_owned(), AIRPORT),
        ]);
        harness_with(
            FakeGeocoder {
                places,
                ..FakeGeocoder::default()
            },
            FakeLocator(None),
            12,
        )
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    async fn pick_by_search(
        coordinator: &mut BookingCoordinator<RecordingSurface>,
        endpoint: Endpoint,
        query: &str,
    ) {
        coordinator.toggle(endpoint);
        coordinator.search(query);
        assert!(coordinator.process_next().await, "{query} applied");
    }

    #[tokio::test]
    async fn click_without_mode_issues_no_request() {
        let Harness {
            geocoder,
            mut coordinator,
            ..
        } = harness();

        coordinator.map_clicked(HOME);
        coordinator.search("home");
        settle().await;

        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0, "no geocoding call");
        assert_eq!(coordinator.drain(), 0, "nothing to apply");
        assert!(coordinator.pickup().is_none(), "pickup unchanged");
    }

    #[tokio::test]
    async fn click_sets_endpoint_and_resets_mode() {
        let Harness {
            mut coordinator, ..
        } = harness();

        coordinator.toggle(Endpoint::Pickup);
        coordinator.map_clicked(HOME);
        assert!(coordinator.process_next().await, "pick applied");

        let pickup = coordinator.pickup().expect("pickup set");
        assert_eq!(pickup.point(), HOME, "clicked coordinate kept");
        assert!(pickup.address.starts_with("near"), "address from reverse lookup");
        assert_eq!(coordinator.mode(), SelectionMode::None, "mode reset");
        assert!(
            coordinator.surface().markers.contains_key(&MarkerRole::Pickup),
            "pickup marker placed"
        );
        assert!(coordinator.route_summary().is_none(), "no route with one endpoint");
    }

    #[tokio::test]
    async fn search_hit_centers_closer() {
        let Harness {
            mut coordinator, ..
        } = harness();

        pick_by_search(&mut coordinator, Endpoint::Destination, "airport").await;

        assert_eq!(
            coordinator.surface().centers.last(),
            Some(&(AIRPORT, SEARCH_ZOOM)),
            "search centers at zoom 16"
        );
    }

    #[tokio::test]
    async fn both_endpoints_produce_route_and_fare() {
        let Harness {
            mut coordinator, ..
        } = harness();

        pick_by_search(&mut coordinator, Endpoint::Pickup, "home").await;
        pick_by_search(&mut coordinator, Endpoint::Destination, "office").await;
        assert!(coordinator.is_routing(), "route requested");
        assert!(coordinator.process_next().await, "route applied");

        let summary = coordinator.route_summary().expect("summary");
        assert!((summary.distance_km - 10.0).abs() < 1e-6, "0.1 degree apart");
        assert_eq!(summary.duration_min, 20, "1200 s");

        let fare = coordinator.fare().expect("fare");
        assert_eq!(fare.total_fare, 210.0, "50 + 120 + 40 at noon");
        assert!(coordinator.surface().route.is_some(), "overlay drawn");
        assert_eq!(coordinator.surface().fits, 1, "view fitted to route");
    }

    #[tokio::test]
    async fn fare_uses_clock_hour() {
        let places = HashMap::from([("home".to_owned(), HOME), ("office".to_owned(), OFFICE)]);
        let Harness {
            mut coordinator, ..
        } = harness_with(
            FakeGeocoder {
                places,
                ..FakeGeocoder::default()
            },
            FakeLocator(None),
            23,
        );

        pick_by_search(&mut coordinator, Endpoint::Pickup, "home").await;
        pick_by_search(&mut coordinator, Endpoint::Destination, "office").await;
        assert!(coordinator.process_next().await, "route applied");

        let fare = coordinator.fare().expect("fare");
        assert!(fare.night_charge.is_some(), "night charge at 23h");
        assert_eq!(fare.total_fare, 270.0, "210 * 1.25 rounded up");
    }

    #[tokio::test]
    async fn changing_pickup_discards_pending_route() {
        let Harness {
            router,
            mut coordinator,
            ..
        } = harness();
        *router.slow_from.lock().expect("lock") = Some(HOME);

        pick_by_search(&mut coordinator, Endpoint::Pickup, "home").await;
        pick_by_search(&mut coordinator, Endpoint::Destination, "office").await;
        settle().await;
        assert!(coordinator.route_summary().is_none(), "home route still pending");

        pick_by_search(&mut coordinator, Endpoint::Pickup, "airport").await;
        assert!(coordinator.process_next().await, "airport route applied");

        router.gate.notify_waiters();
        settle().await;
        assert_eq!(coordinator.drain(), 0, "stale home route never applies");

        let summary = coordinator.route_summary().expect("summary");
        assert!((summary.distance_km - 9.0).abs() < 1e-6, "airport -> office");
        let (from, _to) = coordinator.surface().route.clone().expect("overlay");
        assert_eq!(from.point(), AIRPORT, "overlay follows latest pickup");
        assert_eq!(router.calls.load(Ordering::SeqCst), 2, "one call per pair");
    }

    #[tokio::test]
    async fn stale_route_generation_is_ignored() {
        let Harness {
            mut coordinator, ..
        } = harness();

        pick_by_search(&mut coordinator, Endpoint::Pickup, "home").await;
        pick_by_search(&mut coordinator, Endpoint::Destination, "office").await;

        let stale = BookingEvent::RouteReady {
            generation: 0,
            summary: RouteSummary {
                distance_km: 999.0,
                duration_min: 999,
            },
        };
        assert!(!coordinator.apply(stale), "generation 0 rejected");
        assert!(coordinator.route_summary().is_none(), "summary untouched");
    }

    #[tokio::test]
    async fn latest_click_wins_over_earlier_slow_click() {
        let Harness {
            geocoder,
            mut coordinator,
            ..
        } = harness_with(
            FakeGeocoder {
                slow_point: Some(OFFICE),
                ..FakeGeocoder::default()
            },
            FakeLocator(None),
            12,
        );

        coordinator.toggle(Endpoint::Pickup);
        coordinator.map_clicked(OFFICE);
        coordinator.map_clicked(HOME);
        assert!(coordinator.process_next().await, "home applied first");

        geocoder.gate.notify_waiters();
        assert!(!coordinator.process_next().await, "late office result dropped");
        assert_eq!(
            coordinator.pickup().map(Location::point),
            Some(HOME),
            "latest gesture kept"
        );
    }

    #[tokio::test]
    async fn pick_after_mode_cancelled_is_noop() {
        let Harness {
            mut coordinator, ..
        } = harness();

        coordinator.toggle(Endpoint::Pickup);
        coordinator.search("home");
        coordinator.toggle(Endpoint::Pickup);
        assert_eq!(coordinator.mode(), SelectionMode::None, "mode cancelled");

        assert!(!coordinator.process_next().await, "delivery in None ignored");
        assert!(coordinator.pickup().is_none(), "pickup unchanged");
    }

    #[tokio::test]
    async fn failed_lookup_keeps_previous_value() {
        let Harness {
            mut coordinator, ..
        } = harness();

        pick_by_search(&mut coordinator, Endpoint::Pickup, "home").await;
        coordinator.toggle(Endpoint::Pickup);
        coordinator.search("nowhere");
        settle().await;

        assert_eq!(coordinator.drain(), 0, "failure sends nothing");
        assert_eq!(
            coordinator.pickup().map(|loc| loc.address.as_str()),
            Some("home"),
            "unchanged"
        );
        assert_eq!(coordinator.mode(), SelectionMode::SelectingPickup, "still selecting");
    }

    #[tokio::test]
    async fn clearing_endpoint_drops_route_and_fare() {
        let Harness {
            mut coordinator, ..
        } = harness();

        pick_by_search(&mut coordinator, Endpoint::Pickup, "home").await;
        pick_by_search(&mut coordinator, Endpoint::Destination, "office").await;
        assert!(coordinator.process_next().await, "route applied");

        coordinator.clear(Endpoint::Destination);
        assert!(coordinator.destination().is_none(), "destination cleared");
        assert!(coordinator.route_summary().is_none(), "summary cleared");
        assert!(coordinator.fare().is_none(), "fare cleared");
        assert!(coordinator.surface().route.is_none(), "overlay removed");
        assert!(
            !coordinator.surface().markers.contains_key(&MarkerRole::Destination),
            "marker removed"
        );
        assert!(!coordinator.is_routing(), "nothing in flight");
    }

    #[tokio::test]
    async fn denied_position_falls_back() {
        let Harness {
            mut coordinator, ..
        } = harness();

        coordinator.start();
        assert!(coordinator.process_next().await, "location applied");

        let user = coordinator.user_location().expect("user location");
        assert_eq!(user.source, PositionSource::Fallback, "fallback used");
        assert_eq!(
            coordinator.surface().centers.last(),
            Some(&(crate::model::FALLBACK_POSITION, DEFAULT_ZOOM)),
            "centered on fallback"
        );
    }

    #[tokio::test]
    async fn device_position_sets_current_marker() {
        let Harness {
            mut coordinator, ..
        } = harness_with(FakeGeocoder::default(), FakeLocator(Some(HOME)), 12);

        coordinator.start();
        assert!(coordinator.process_next().await, "location applied");
        assert_eq!(
            coordinator.user_location().map(|user| user.source),
            Some(PositionSource::Device),
            "device position used"
        );
        assert_eq!(
            coordinator.surface().markers.get(&MarkerRole::Current).map(Location::point),
            Some(HOME),
            "current marker placed"
        );

        assert!(
            !coordinator.apply(BookingEvent::UserLocated(UserLocation::fallback())),
            "user location is set once"
        );

        coordinator.surface_mut().centers.clear();
        coordinator.center_on_user();
        assert_eq!(
            coordinator.surface().centers,
            vec![(HOME, DEFAULT_ZOOM)],
            "recentered on user"
        );
    }

    #[tokio::test]
    async fn disposed_session_ignores_late_results() {
        let Harness {
            mut coordinator, ..
        } = harness();

        pick_by_search(&mut coordinator, Endpoint::Pickup, "home").await;
        coordinator.toggle(Endpoint::Destination);
        coordinator.dispose();

        assert!(coordinator.is_disposed(), "disposed");
        assert!(coordinator.pickup().is_none(), "fields reset");
        assert!(coordinator.surface().markers.is_empty(), "markers cleared");

        let late = BookingEvent::LocationPicked {
            endpoint: Endpoint::Destination,
            seq: 99,
            location: Location::new(OFFICE, "office"),
            origin: PickOrigin::Search,
        };
        assert!(!coordinator.apply(late), "late result dropped");
        assert!(coordinator.destination().is_none(), "destination untouched");
    }
}
