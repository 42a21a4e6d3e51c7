//! Booking form validation and the record handed to the submission handler.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::{FareBreakdown, Location, RouteSummary};

/// Largest party a single vehicle takes.
pub const MAX_PASSENGERS: u8 = 4;

const QUOTE_BASE_FARE: f64 = 200.0;
const QUOTE_PER_KM_RATE: f64 = 15.0;
const QUOTE_ACCESSIBILITY_SURCHARGE: f64 = 50.0;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

// 10-digit Indian mobile number.
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9]\d{9}$").expect("phone pattern is valid"));

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// User-facing reasons a booking cannot be submitted.
pub enum BookingError {
    /// A required field is empty.
    #[error("Please fill in all required fields (missing {0})")]
    MissingField(&'static str),
    /// The email address is malformed.
    #[error("Please enter a valid email address")]
    InvalidEmail,
    /// The phone number is not a 10-digit mobile number.
    #[error("Please enter a valid 10-digit phone number")]
    InvalidPhone,
    /// The party size is outside `1..=MAX_PASSENGERS`.
    #[error("Please choose between 1 and {MAX_PASSENGERS} passengers (got {0})")]
    InvalidPassengers(u8),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Assistance the rider needs.
pub struct AccessibilityNeeds {
    /// Wheelchair-accessible vehicle.
    pub wheelchair: bool,
    /// Help getting in and out.
    pub boarding: bool,
    /// Room for mobility aids.
    pub extra_space: bool,
    /// A service animal rides along.
    pub service_animal: bool,
}

impl AccessibilityNeeds {
    /// Whether any assistance was requested.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.wheelchair || self.boarding || self.extra_space || self.service_animal
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Booking details as entered by the rider.
pub struct BookingForm {
    /// Pickup point picked on the map.
    pub pickup: Option<Location>,
    /// Destination point picked on the map.
    pub destination: Option<Location>,
    /// Day of the ride.
    pub date: Option<NaiveDate>,
    /// Party size.
    pub passengers: u8,
    /// Rider name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Contact email address.
    pub email: String,
    /// Requested assistance.
    pub requirements: AccessibilityNeeds,
}

impl Default for BookingForm {
    fn default() -> Self {
        Self {
            pickup: None,
            destination: None,
            date: None,
            passengers: 1,
            name: String::new(),
            phone: String::new(),
            email: String::new(),
            requirements: AccessibilityNeeds::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Validated booking, ready for the submission handler.
pub struct BookingRecord {
    /// Pickup point.
    pub pickup: Location,
    /// Destination point.
    pub destination: Location,
    /// Day of the ride.
    pub date: NaiveDate,
    /// Party size.
    pub passengers: u8,
    /// Rider name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Contact email address.
    pub email: String,
    /// Requested assistance.
    pub requirements: AccessibilityNeeds,
    /// Route between the two points, when it was computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteSummary>,
    /// Map fare estimate, when a route was computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fare: Option<FareBreakdown>,
    /// Booking quote including the accessibility surcharge.
    pub estimated_fare: f64,
}

impl BookingForm {
    /// Check the form and build the record for submission.
    ///
    /// Required fields are checked first, then the email, then the phone number.
    ///
    /// # Errors
    ///
    /// Returns the first [`BookingError`] found.
    pub fn validate(
        &self,
        route: Option<&RouteSummary>,
        fare: Option<&FareBreakdown>,
    ) -> Result<BookingRecord, BookingError> {
        let pickup = self.pickup.clone().ok_or(BookingError::MissingField("pickup"))?;
        let destination = self
            .destination
            .clone()
            .ok_or(BookingError::MissingField("destination"))?;
        let date = self.date.ok_or(BookingError::MissingField("date"))?;
        let name = required(&self.name, "name")?;
        let phone = required(&self.phone, "phone")?;
        let email = required(&self.email, "email")?;

        if !EMAIL_PATTERN.is_match(email) {
            return Err(BookingError::InvalidEmail);
        }
        if !PHONE_PATTERN.is_match(phone) {
            return Err(BookingError::InvalidPhone);
        }
        if !(1..=MAX_PASSENGERS).contains(&self.passengers) {
            return Err(BookingError::InvalidPassengers(self.passengers));
        }

        let distance_km = route.map_or(0.0, |summary| summary.distance_km);
        Ok(BookingRecord {
            pickup,
            destination,
            date,
            passengers: self.passengers,
            name: name.to_owned(),
            phone: phone.to_owned(),
            email: email.to_owned(),
            requirements: self.requirements,
            route: route.copied(),
            fare: fare.cloned(),
            estimated_fare: booking_quote(distance_km, self.requirements),
        })
    }
}

fn required<'form>(value: &'form str, field: &'static str) -> Result<&'form str, BookingError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(BookingError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

/// Quote shown on the booking form: flat fee plus distance, with a surcharge
/// when any assistance is requested, rounded up to a whole rupee.
#[must_use]
pub fn booking_quote(distance_km: f64, needs: AccessibilityNeeds) -> f64 {
    let surcharge = if needs.any() {
        QUOTE_ACCESSIBILITY_SURCHARGE
    } else {
        0.0
    };
    (QUOTE_BASE_FARE + distance_km * QUOTE_PER_KM_RATE + surcharge).ceil()
}
