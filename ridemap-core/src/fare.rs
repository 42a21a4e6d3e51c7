//! Fare estimation from route metrics and the hour of day.

use serde::{Deserialize, Serialize};

use crate::model::{FareBreakdown, RouteSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Inclusive range of hours. `start > end` wraps past midnight.
pub struct HourWindow {
    /// First hour inside the window.
    pub start: u32,
    /// Last hour inside the window.
    pub end: u32,
}

impl HourWindow {
    /// Build a window covering `start..=end` (wrapping when `start > end`).
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Whether `hour` falls inside the window.
    #[must_use]
    pub const fn contains(&self, hour: u32) -> bool {
        if self.start <= self.end {
            self.start <= hour && hour <= self.end
        } else {
            hour >= self.start || hour <= self.end
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Rates and time windows used by [`compute_fare`].
pub struct FareConfig {
    /// Flat charge per ride.
    pub base_fare: f64,
    /// Charge per kilometer.
    pub per_km_rate: f64,
    /// Charge per minute.
    pub per_minute_rate: f64,
    /// Multiplier applied to the subtotal during night windows.
    pub night_multiplier: f64,
    /// Multiplier applied to the subtotal during surge windows.
    pub surge_multiplier: f64,
    /// Lower bound of the total before rounding.
    pub minimum_fare: f64,
    /// Hours (10 PM to 5 AM by default) that carry the night surcharge.
    pub night_windows: Vec<HourWindow>,
    /// Peak hours that carry the surge surcharge.
    pub surge_windows: Vec<HourWindow>,
}

impl Default for FareConfig {
    fn default() -> Self {
        Self {
            base_fare: 50.0,
            per_km_rate: 12.0,
            per_minute_rate: 2.0,
            night_multiplier: 1.25,
            surge_multiplier: 1.2,
            minimum_fare: 100.0,
            night_windows: vec![HourWindow::new(22, 4)],
            surge_windows: vec![HourWindow::new(8, 10), HourWindow::new(17, 20)],
        }
    }
}

impl FareConfig {
    /// Compute the fare for a route under this configuration.
    ///
    /// Night and surge surcharges are evaluated independently; both apply if
    /// the windows are ever configured to overlap.
    #[must_use]
    pub fn compute(&self, distance_km: f64, duration_min: u32, at_hour: u32) -> FareBreakdown {
        let hour = at_hour % 24;

        let base_fare = self.base_fare;
        let distance_fare = (distance_km * self.per_km_rate).max(0.0);
        let time_fare = f64::from(duration_min) * self.per_minute_rate;
        let subtotal = base_fare + distance_fare + time_fare;

        let night_charge = in_any(&self.night_windows, hour)
            .then(|| subtotal * (self.night_multiplier - 1.0));
        let surge_charge = in_any(&self.surge_windows, hour)
            .then(|| subtotal * (self.surge_multiplier - 1.0));

        let total = subtotal + night_charge.unwrap_or(0.0) + surge_charge.unwrap_or(0.0);
        let total = total.max(self.minimum_fare);
        let total_fare = (total / 10.0).ceil() * 10.0;

        FareBreakdown {
            base_fare,
            distance_fare,
            time_fare,
            total_fare,
            night_charge,
            surge_charge,
        }
    }

    /// Compute the fare for a route summary.
    #[must_use]
    pub fn for_route(&self, summary: &RouteSummary, at_hour: u32) -> FareBreakdown {
        self.compute(summary.distance_km, summary.duration_min, at_hour)
    }
}

fn in_any(windows: &[HourWindow], hour: u32) -> bool {
    windows.iter().any(|window| window.contains(hour))
}

/// Compute a fare with the default rates.
#[must_use]
pub fn compute_fare(distance_km: f64, duration_min: u32, at_hour: u32) -> FareBreakdown {
    FareConfig::default().compute(distance_km, duration_min, at_hour)
}
