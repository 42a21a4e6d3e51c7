//! Terminal UI for ridemap: pick pickup and destination on a map, see the
//! route fare and submit a booking.

mod app;
mod cli;
mod input;
mod logging;
mod surface;
mod ui;

use std::{io, sync::Arc, time::Duration as StdDuration};

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use ridemap_core::{BookingCoordinator, LocalClock, MapBackend};
use ridemap_provider_ipapi::{IpLocator, IpLocatorConfig};
use ridemap_provider_nominatim::{NominatimConfig, NominatimGeocoder};
use ridemap_provider_osrm::{OsrmConfig, OsrmRouter};
use tracing::info;

use crate::app::App;
use crate::cli::Cli;
use crate::input::Action;
use crate::surface::CanvasSurface;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init(&cli.log_file)?;

    // HTTP + backend setup
    let client = Client::builder()
        .user_agent(concat!("ridemap/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let map_backend = MapBackend::new(
        Arc::new(NominatimGeocoder::new(
            client.clone(),
            NominatimConfig {
                base_url: cli.geocoder_url,
            },
        )),
        Arc::new(OsrmRouter::new(
            client.clone(),
            OsrmConfig {
                base_url: cli.router_url,
                ..OsrmConfig::default()
            },
        )),
        Arc::new(IpLocator::new(
            client,
            IpLocatorConfig {
                base_url: cli.locator_url,
                ..IpLocatorConfig::default()
            },
        )),
    );

    // App state
    let mut coordinator =
        BookingCoordinator::new(map_backend, CanvasSurface::new(), Arc::new(LocalClock));
    coordinator.start();
    let form = cli.booking.into_form(Local::now().date_naive());
    let mut app = App::new(coordinator, form, cli.booking_out);
    info!("ridemap started");

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, &mut app);

    app.coordinator.dispose();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Completions from background lookups
        app.coordinator.drain();

        terminal.draw(|frame| ui::draw(frame, app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if !event::poll(StdDuration::from_millis(100))? {
            continue;
        }
        match event::read()? {
            CEvent::Key(key) => {
                if input::handle_key_event(key, app) == Action::Quit {
                    break;
                }
            }
            CEvent::Mouse(mouse) => input::handle_mouse_event(mouse, app),
            _ => {}
        }
    }

    Ok(())
}
