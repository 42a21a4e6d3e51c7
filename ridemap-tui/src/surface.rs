use std::collections::HashMap;

use ratatui::layout::Rect;
use ridemap_core::{DEFAULT_ZOOM, FALLBACK_POSITION, LatLng, Location, MapSurface, MarkerRole};

const MIN_ZOOM: u8 = 3;
const MAX_ZOOM: u8 = 18;
// Extra room around fitted bounds, as a fraction of the span.
const FIT_PADDING: f64 = 0.2;
// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f64 = 2.0;

/// Geographic box currently shown on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Bounds {
    pub south: f64,
    pub north: f64,
    pub west: f64,
    pub east: f64,
}

/// Map state rendered by the terminal canvas.
///
/// Holds nothing but what is on screen: the viewport, one marker per role and
/// at most one route overlay.
#[derive(Debug)]
pub(crate) struct CanvasSurface {
    pub center: LatLng,
    pub zoom: u8,
    pub markers: HashMap<MarkerRole, Location>,
    pub route: Option<(Location, Location)>,
    area: Rect,
}

impl CanvasSurface {
    pub(crate) fn new() -> Self {
        Self {
            center: FALLBACK_POSITION,
            zoom: DEFAULT_ZOOM,
            markers: HashMap::new(),
            route: None,
            area: Rect::new(0, 0, 80, 24),
        }
    }

    pub(crate) fn set_area(&mut self, area: Rect) {
        if area.width > 0 && area.height > 0 {
            self.area = area;
        }
    }

    pub(crate) fn bounds(&self) -> Bounds {
        let (lat_span, lng_span) = spans(self.zoom, self.area);
        Bounds {
            south: self.center.lat - lat_span / 2.0,
            north: self.center.lat + lat_span / 2.0,
            west: self.center.lng - lng_span / 2.0,
            east: self.center.lng + lng_span / 2.0,
        }
    }

    /// Coordinate under a terminal cell, or `None` outside the map area.
    pub(crate) fn screen_to_latlng(&self, column: u16, row: u16) -> Option<LatLng> {
        let area = self.area;
        let inside = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        if !inside {
            return None;
        }

        let bounds = self.bounds();
        // Sample the middle of the cell; rows grow southwards.
        let x_frac = (f64::from(column - area.x) + 0.5) / f64::from(area.width);
        let y_frac = (f64::from(row - area.y) + 0.5) / f64::from(area.height);
        Some(LatLng::new(
            bounds.north - y_frac * (bounds.north - bounds.south),
            bounds.west + x_frac * (bounds.east - bounds.west),
        ))
    }

    /// Move the view by a fraction of its size.
    pub(crate) fn pan(&mut self, east: f64, north: f64) {
        let (lat_span, lng_span) = spans(self.zoom, self.area);
        self.center = LatLng::new(
            (self.center.lat + north * lat_span).clamp(-85.0, 85.0),
            self.center.lng + east * lng_span,
        );
    }

    pub(crate) fn zoom_by(&mut self, delta: i8) {
        self.zoom = self.zoom.saturating_add_signed(delta).clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

impl MapSurface for CanvasSurface {
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
        self.center = point;
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    fn fit_bounds(&mut self, corner: LatLng, opposite: LatLng) {
        self.center = LatLng::new(
            (corner.lat + opposite.lat) / 2.0,
            (corner.lng + opposite.lng) / 2.0,
        );
        let needed_lat = (corner.lat - opposite.lat).abs() * (1.0 + FIT_PADDING);
        let needed_lng = (corner.lng - opposite.lng).abs() * (1.0 + FIT_PADDING);

        // Closest zoom that still shows both points.
        self.zoom = (MIN_ZOOM..=MAX_ZOOM)
            .rev()
            .find(|&zoom| {
                let (lat_span, lng_span) = spans(zoom, self.area);
                lat_span >= needed_lat && lng_span >= needed_lng
            })
            .unwrap_or(MIN_ZOOM);
    }
}

/// Latitude and longitude covered by `area` at `zoom`.
///
/// One zoom step halves the span; zoom 13 shows roughly a city district across
/// an 80-column terminal.
fn spans(zoom: u8, area: Rect) -> (f64, f64) {
    let degrees_per_column = 360.0 / 2_f64.powi(i32::from(zoom)) / 32.0;
    let lng_span = degrees_per_column * f64::from(area.width.max(1));
    let lat_span = degrees_per_column * CELL_ASPECT * f64::from(area.height.max(1));
    (lat_span, lng_span)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> CanvasSurface {
        let mut surface = CanvasSurface::new();
        surface.set_area(Rect::new(2, 1, 80, 20));
        surface
    }

    #[test]
    fn center_cell_maps_near_center() {
        let surface = surface();
        let point = surface.screen_to_latlng(42, 11).expect("inside map");
        let bounds = surface.bounds();
        let cell_lng = (bounds.east - bounds.west) / 80.0;
        let cell_lat = (bounds.north - bounds.south) / 20.0;
        assert!((point.lng - surface.center.lng).abs() <= cell_lng, "column near centre");
        assert!((point.lat - surface.center.lat).abs() <= cell_lat, "row near centre");
    }

    #[test]
    fn top_left_is_north_west() {
        let surface = surface();
        let point = surface.screen_to_latlng(2, 1).expect("inside map");
        assert!(point.lat > surface.center.lat, "north of centre");
        assert!(point.lng < surface.center.lng, "west of centre");
    }

    #[test]
    fn clicks_outside_the_map_are_ignored() {
        let surface = surface();
        assert!(surface.screen_to_latlng(0, 0).is_none(), "border");
        assert!(surface.screen_to_latlng(82, 5).is_none(), "right of map");
        assert!(surface.screen_to_latlng(10, 21).is_none(), "below map");
    }

    #[test]
    fn markers_are_replaced_per_role() {
        let mut surface = surface();
        let first = Location::new(LatLng::new(19.0, 72.8), "first");
        let second = Location::new(LatLng::new(19.1, 72.9), "second");
        surface.set_marker(MarkerRole::Pickup, &first);
        surface.set_marker(MarkerRole::Pickup, &second);
        assert_eq!(surface.markers.len(), 1, "one pickup marker");
        assert_eq!(surface.markers.get(&MarkerRole::Pickup), Some(&second), "latest wins");

        surface.clear_marker(MarkerRole::Pickup);
        assert!(surface.markers.is_empty(), "cleared");
    }

    #[test]
    fn fit_bounds_shows_both_points() {
        let mut surface = surface();
        let home = LatLng::new(19.10, 72.85);
        let office = LatLng::new(19.00, 72.83);
        surface.fit_bounds(home, office);

        let bounds = surface.bounds();
        for point in [home, office] {
            assert!(point.lat > bounds.south && point.lat < bounds.north, "lat visible");
            assert!(point.lng > bounds.west && point.lng < bounds.east, "lng visible");
        }
        let (lat_span, _) = spans(surface.zoom + 1, surface.area);
        assert!(lat_span < 0.12, "one step closer would cut a point off");
    }

    #[test]
    fn zoom_is_clamped() {
        let mut surface = surface();
        surface.center_on(FALLBACK_POSITION, 30);
        assert_eq!(surface.zoom, MAX_ZOOM, "upper bound");
        surface.zoom_by(-20);
        assert_eq!(surface.zoom, MIN_ZOOM, "lower bound");
    }
}
