use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ridemap_core::Endpoint;

use crate::app::{App, InputMode};

// Fraction of the view moved per arrow key.
const PAN_STEP: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Quit,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Down, Enter, Esc, Left, Right, Up};

    // Global quit shortcut
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    match app.input_mode {
        InputMode::Search => match key.code {
            Enter => app.submit_search(),
            Esc => {
                app.search_input.clear();
                app.input_mode = InputMode::Map;
            }
            Backspace => {
                app.search_input.pop();
            }
            Char(character) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                {
                    app.search_input.push(character);
                }
            }
            _ => {}
        },

        InputMode::Map => match key.code {
            Char('q') => return Action::Quit,
            Char('p') => app.toggle(Endpoint::Pickup),
            Char('d') => app.toggle(Endpoint::Destination),
            Char('/') => {
                app.error_message = None;
                app.input_mode = InputMode::Search;
            }
            Char('x') => app.coordinator.clear(Endpoint::Pickup),
            Char('X') => app.coordinator.clear(Endpoint::Destination),
            Char('c') => app.coordinator.center_on_user(),
            Char('n') => app.cycle_passengers(),
            Char('b') => app.submit_booking(),
            Char('+' | '=') => app.coordinator.surface_mut().zoom_by(1),
            Char('-') => app.coordinator.surface_mut().zoom_by(-1),
            Up | Char('k') => app.coordinator.surface_mut().pan(0.0, PAN_STEP),
            Down | Char('j') => app.coordinator.surface_mut().pan(0.0, -PAN_STEP),
            Left | Char('h') => app.coordinator.surface_mut().pan(-PAN_STEP, 0.0),
            Right | Char('l') => app.coordinator.surface_mut().pan(PAN_STEP, 0.0),
            _ => {}
        },
    }
    Action::None
}

/// A left click inside the map picks that point for the endpoint being selected.
pub(crate) fn handle_mouse_event(mouse: MouseEvent, app: &mut App) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }
    if let Some(point) = app
        .coordinator
        .surface()
        .screen_to_latlng(mouse.column, mouse.row)
    {
        app.coordinator.map_clicked(point);
    }
}
