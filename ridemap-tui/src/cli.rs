use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use ridemap_core::{AccessibilityNeeds, BookingForm};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Nominatim base URL used for address search and reverse lookup.
    #[clap(
        long,
        env = "RIDEMAP_GEOCODER_URL",
        default_value = "https://nominatim.openstreetmap.org"
    )]
    pub geocoder_url: String,

    /// OSRM base URL used for routing.
    #[clap(
        long,
        env = "RIDEMAP_ROUTER_URL",
        default_value = "https://router.project-osrm.org"
    )]
    pub router_url: String,

    /// IP geolocation base URL used to find the starting position.
    #[clap(long, env = "RIDEMAP_LOCATOR_URL", default_value = "https://ipapi.co")]
    pub locator_url: String,

    /// Log file; the terminal itself is taken by the UI.
    #[clap(long, env = "RIDEMAP_LOG_FILE", default_value = "ridemap.log")]
    pub log_file: PathBuf,

    /// Where a submitted booking is written as JSON.
    #[clap(long, default_value = "booking.json")]
    pub booking_out: PathBuf,

    #[command(flatten)]
    pub booking: BookingArgs,
}

/// Rider details for the booking form.
#[derive(clap::Args, Debug, Default)]
pub(crate) struct BookingArgs {
    /// Rider name.
    #[clap(long, default_value = "")]
    pub name: String,

    /// 10-digit mobile number.
    #[clap(long, default_value = "")]
    pub phone: String,

    /// Contact email address.
    #[clap(long, default_value = "")]
    pub email: String,

    /// Day of the ride (YYYY-MM-DD); today when omitted.
    #[clap(long)]
    pub date: Option<NaiveDate>,

    /// Party size (1-4).
    #[clap(long, default_value = "1")]
    pub passengers: u8,

    /// Wheelchair-accessible vehicle.
    #[clap(long)]
    pub wheelchair: bool,

    /// Help getting in and out.
    #[clap(long)]
    pub boarding: bool,

    /// Room for mobility aids.
    #[clap(long)]
    pub extra_space: bool,

    /// A service animal rides along.
    #[clap(long)]
    pub service_animal: bool,
}

impl BookingArgs {
    /// Prefill the booking form; endpoints come from the map.
    pub(crate) fn into_form(self, today: NaiveDate) -> BookingForm {
        BookingForm {
            date: Some(self.date.unwrap_or(today)),
            passengers: self.passengers,
            name: self.name,
            phone: self.phone,
            email: self.email,
            requirements: AccessibilityNeeds {
                wheelchair: self.wheelchair,
                boarding: self.boarding,
                extra_space: self.extra_space,
                service_animal: self.service_animal,
            },
            ..BookingForm::default()
        }
    }
}
