use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        Block, Borders, Paragraph, Wrap,
        canvas::{Canvas, Line as CanvasLine, Map, MapResolution},
    },
};
use ridemap_core::{
    AccessibilityNeeds, Endpoint, FareBreakdown, Location, MarkerRole, PositionSource,
    RouteSummary, SelectionMode,
};

use crate::app::{App, InputMode};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let header = Paragraph::new(header_text(app))
        .block(Block::default().borders(Borders::ALL).title("Ridemap"));
    frame.render_widget(header, *header_area);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(42)])
        .split(*content_area);
    let [map_area, panel_area] = content_chunks.as_ref() else {
        return;
    };

    draw_map(frame, app, *map_area);
    draw_panel(frame, app, *panel_area);
    draw_status(frame, app, *status_area);
}

fn header_text(app: &App) -> String {
    match app.input_mode {
        InputMode::Search => {
            let target = app
                .coordinator
                .mode()
                .target()
                .map_or("nothing".to_owned(), |endpoint| endpoint.to_string());
            format!("Search {target}: {}▏", app.search_input)
        }
        InputMode::Map => match app.coordinator.mode() {
            SelectionMode::None => "Press p / d to choose pickup or destination".to_owned(),
            SelectionMode::SelectingPickup => {
                "Selecting pickup: click the map or press /".to_owned()
            }
            SelectionMode::SelectingDestination => {
                "Selecting destination: click the map or press /".to_owned()
            }
        },
    }
}

fn draw_map(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(format!(
        "Map · zoom {}{}",
        app.coordinator.surface().zoom,
        if app.coordinator.is_routing() { " · routing…" } else { "" }
    ));
    app.coordinator.surface_mut().set_area(block.inner(area));

    let surface = app.coordinator.surface();
    let bounds = surface.bounds();
    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([bounds.west, bounds.east])
        .y_bounds([bounds.south, bounds.north])
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();
            if let Some((from, to)) = &surface.route {
                ctx.draw(&CanvasLine::new(from.lng, from.lat, to.lng, to.lat, Color::Cyan));
            }
            for (role, location) in &surface.markers {
                let (glyph, color) = marker_style(*role);
                ctx.print(location.lng, location.lat, glyph.fg(color).bold());
            }
        });
    frame.render_widget(canvas, area);
}

const fn marker_style(role: MarkerRole) -> (&'static str, Color) {
    match role {
        MarkerRole::Pickup => ("P", Color::Green),
        MarkerRole::Destination => ("D", Color::Red),
        MarkerRole::Current => ("●", Color::Blue),
    }
}

fn draw_panel(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let coordinator = &app.coordinator;
    let mut lines = vec![
        endpoint_line(Endpoint::Pickup, coordinator.pickup(), Color::Green),
        endpoint_line(Endpoint::Destination, coordinator.destination(), Color::Red),
        Line::default(),
    ];

    lines.extend(route_lines(coordinator.route_summary(), coordinator.fare()));
    lines.push(Line::default());

    let form = &app.form;
    lines.push(Line::from("Booking".bold()));
    lines.push(field_line("Name", &form.name));
    lines.push(field_line("Phone", &form.phone));
    lines.push(field_line("Email", &form.email));
    let date = form.date.map(|date| date.format("%Y-%m-%d").to_string()).unwrap_or_default();
    lines.push(field_line("Date", &date));
    lines.push(field_line("Passengers", &form.passengers.to_string()));
    lines.push(field_line("Assistance", &needs_label(form.requirements)));

    if let Some(user) = coordinator.user_location() {
        let source = match user.source {
            PositionSource::Device => "located",
            PositionSource::Fallback => "default",
        };
        lines.push(Line::default());
        lines.push(Line::from(format!("You: {} ({source})", user.position)).dark_gray());
    }

    let panel = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Ride"))
        .wrap(Wrap { trim: true });
    frame.render_widget(panel, area);
}

fn endpoint_line(endpoint: Endpoint, location: Option<&Location>, color: Color) -> Line<'static> {
    let label = match endpoint {
        Endpoint::Pickup => "Pickup: ",
        Endpoint::Destination => "Destination: ",
    };
    let value = location.map_or_else(|| "not set".to_owned(), |location| location.address.clone());
    Line::from(vec![label.fg(color).bold(), Span::raw(value)])
}

fn route_lines(
    summary: Option<&RouteSummary>,
    fare: Option<&FareBreakdown>,
) -> Vec<Line<'static>> {
    let (Some(summary), Some(fare)) = (summary, fare) else {
        return vec![Line::from("No route yet").dark_gray()];
    };

    let mut lines = vec![
        Line::from(format!(
            "Route: {:.1} km · {} min",
            summary.distance_km, summary.duration_min
        )),
        Line::from(format!("  Base fare      ₹{:.0}", fare.base_fare)),
        Line::from(format!("  Distance       ₹{:.0}", fare.distance_fare)),
        Line::from(format!("  Time           ₹{:.0}", fare.time_fare)),
    ];
    if let Some(night) = fare.night_charge {
        lines.push(Line::from(format!("  Night charge   ₹{night:.0}")).yellow());
    }
    if let Some(surge) = fare.surge_charge {
        lines.push(Line::from(format!("  Peak hours     ₹{surge:.0}")).yellow());
    }
    lines.push(Line::from(format!("Total fare: ₹{:.0}", fare.total_fare)).bold());
    lines
}

fn field_line(label: &str, value: &str) -> Line<'static> {
    let shown = if value.is_empty() { "-" } else { value };
    Line::from(format!("  {label:<11}{shown}"))
}

fn needs_label(needs: AccessibilityNeeds) -> String {
    [
        (needs.wheelchair, "wheelchair"),
        (needs.boarding, "boarding"),
        (needs.extra_space, "extra space"),
        (needs.service_animal, "service animal"),
    ]
    .into_iter()
    .filter_map(|(wanted, label)| wanted.then_some(label))
    .collect::<Vec<_>>()
    .join(", ")
}

fn draw_status(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let nav_hint = match app.input_mode {
        InputMode::Search => "Type an address · Enter search · Esc cancel",
        InputMode::Map => {
            "p/d select · / search · x/X clear · c center · arrows pan · +/- zoom · n passengers · b book · q quit"
        }
    };

    let status_text = if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else if let Some(msg) = &app.status_message {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, area);
}
