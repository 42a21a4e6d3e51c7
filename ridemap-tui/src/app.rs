use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use ridemap_core::{
    BookingCoordinator, BookingForm, BookingRecord, Endpoint, MAX_PASSENGERS, SelectionMode,
};
use tracing::{info, warn};

use crate::surface::CanvasSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    /// Keys are shortcuts.
    Map,
    /// Keys edit the search line.
    Search,
}

pub(crate) struct App {
    pub coordinator: BookingCoordinator<CanvasSurface>,
    pub form: BookingForm,
    pub booking_out: PathBuf,

    pub input_mode: InputMode,
    pub search_input: String,

    pub status_message: Option<String>,
    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(
        coordinator: BookingCoordinator<CanvasSurface>,
        form: BookingForm,
        booking_out: PathBuf,
    ) -> Self {
        Self {
            coordinator,
            form,
            booking_out,
            input_mode: InputMode::Map,
            search_input: String::new(),
            status_message: None,
            error_message: None,
        }
    }

    pub(crate) fn toggle(&mut self, endpoint: Endpoint) {
        let mode = self.coordinator.toggle(endpoint);
        self.error_message = None;
        self.status_message = Some(match mode {
            SelectionMode::None => "Selection cancelled".to_owned(),
            _ => format!("Click the map or press / to search for the {endpoint}"),
        });
    }

    /// Send the typed search and leave search mode.
    pub(crate) fn submit_search(&mut self) {
        let query = std::mem::take(&mut self.search_input);
        self.input_mode = InputMode::Map;
        if self.coordinator.mode() == SelectionMode::None {
            self.error_message = Some("Press p or d before searching".to_owned());
            return;
        }
        self.coordinator.search(&query);
    }

    pub(crate) fn cycle_passengers(&mut self) {
        self.form.passengers = self.form.passengers % MAX_PASSENGERS + 1;
    }

    /// Validate the booking and write it to `booking_out`.
    pub(crate) fn submit_booking(&mut self) {
        self.form.pickup = self.coordinator.pickup().cloned();
        self.form.destination = self.coordinator.destination().cloned();

        let record = match self
            .form
            .validate(self.coordinator.route_summary(), self.coordinator.fare())
        {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, "booking rejected");
                self.status_message = None;
                self.error_message = Some(err.to_string());
                return;
            }
        };

        match self.write_booking(&record) {
            Ok(()) => {
                info!(
                    path = %self.booking_out.display(),
                    estimated_fare = record.estimated_fare,
                    "booking submitted"
                );
                self.error_message = None;
                self.status_message = Some(format!(
                    "Booking saved to {} (estimate ₹{:.0})",
                    self.booking_out.display(),
                    record.estimated_fare
                ));
            }
            Err(err) => {
                warn!(error = %err, "booking could not be saved");
                self.error_message = Some(format!("{err:#}"));
            }
        }
    }

    fn write_booking(&self, record: &BookingRecord) -> Result<()> {
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&self.booking_out, json)
            .with_context(|| format!("failed to write {}", self.booking_out.display()))
    }
}
