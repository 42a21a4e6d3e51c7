//! Tracks which ride endpoint the user is currently choosing.

use crate::model::Endpoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Which endpoint, if any, the next pick applies to.
pub enum SelectionMode {
    /// Clicks and searches are ignored.
    #[default]
    None,
    /// The next pick sets the pickup point.
    SelectingPickup,
    /// The next pick sets the destination point.
    SelectingDestination,
}

impl SelectionMode {
    /// Mode that selects `endpoint`.
    #[must_use]
    pub const fn selecting(endpoint: Endpoint) -> Self {
        match endpoint {
            Endpoint::Pickup => SelectionMode::SelectingPickup,
            Endpoint::Destination => SelectionMode::SelectingDestination,
        }
    }

    /// Endpoint named by this mode.
    #[must_use]
    pub const fn target(self) -> Option<Endpoint> {
        match self {
            SelectionMode::None => None,
            SelectionMode::SelectingPickup => Some(Endpoint::Pickup),
            SelectionMode::SelectingDestination => Some(Endpoint::Destination),
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Selection state machine behind the "Select Pickup" / "Select Destination" buttons.
pub struct SelectionStateMachine {
    mode: SelectionMode,
}

impl SelectionStateMachine {
    /// Start with no endpoint selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Endpoint currently being chosen.
    #[must_use]
    pub const fn target(&self) -> Option<Endpoint> {
        self.mode.target()
    }

    /// Press the button for `endpoint`. Pressing the active button cancels it.
    pub fn toggle(&mut self, endpoint: Endpoint) -> SelectionMode {
        let pressed = SelectionMode::selecting(endpoint);
        self.mode = if self.mode == pressed {
            SelectionMode::None
        } else {
            pressed
        };
        self.mode
    }

    /// Hand over a resolved location for `endpoint`.
    ///
    /// Returns `true` and resets to [`SelectionMode::None`] when the machine is
    /// choosing that endpoint; otherwise nothing changes and the location must
    /// be discarded.
    pub fn deliver(&mut self, endpoint: Endpoint) -> bool {
        if self.mode.target() == Some(endpoint) {
            self.mode = SelectionMode::None;
            true
        } else {
            false
        }
    }

    /// Drop any active selection.
    pub fn reset(&mut self) {
        self.mode = SelectionMode::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_returns_to_none() {
        let mut machine = SelectionStateMachine::new();
        assert_eq!(machine.toggle(Endpoint::Pickup), SelectionMode::SelectingPickup, "on");
        assert_eq!(machine.toggle(Endpoint::Pickup), SelectionMode::None, "off");

        assert_eq!(
            machine.toggle(Endpoint::Destination),
            SelectionMode::SelectingDestination,
            "on"
        );
        assert_eq!(machine.toggle(Endpoint::Destination), SelectionMode::None, "off");
    }

    #[test]
    fn other_button_switches_mode() {
        let mut machine = SelectionStateMachine::new();
        machine.toggle(Endpoint::Destination);
        assert_eq!(
            machine.toggle(Endpoint::Pickup),
            SelectionMode::SelectingPickup,
            "destination -> pickup"
        );
        assert_eq!(
            machine.toggle(Endpoint::Destination),
            SelectionMode::SelectingDestination,
            "pickup -> destination"
        );
    }

    #[test]
    fn delivery_clears_matching_mode() {
        let mut machine = SelectionStateMachine::new();
        machine.toggle(Endpoint::Pickup);
        assert!(machine.deliver(Endpoint::Pickup), "pickup accepted");
        assert_eq!(machine.mode(), SelectionMode::None, "mode cleared");
    }

    #[test]
    fn delivery_in_none_is_ignored() {
        let mut machine = SelectionStateMachine::new();
        assert!(!machine.deliver(Endpoint::Pickup), "nothing selected");
        assert_eq!(machine.mode(), SelectionMode::None, "still none");
    }

    #[test]
    fn delivery_for_other_endpoint_keeps_mode() {
        let mut machine = SelectionStateMachine::new();
        machine.toggle(Endpoint::Destination);
        assert!(!machine.deliver(Endpoint::Pickup), "wrong endpoint rejected");
        assert_eq!(machine.target(), Some(Endpoint::Destination), "mode unchanged");
    }
}
