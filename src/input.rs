//! Logical controls
//!
//! The input collaborator (keyboard, touch buttons, gamepad) only has to keep
//! a `ControlState` up to date; the simulation never sees raw events.

use serde::{Deserialize, Serialize};

/// A logical control the player can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    MoveLeft,
    MoveRight,
    ThrottleUp,
    ThrottleDown,
    Fire,
    ActivateNuke,
    ToggleShop,
}

impl Control {
    pub const ALL: [Control; 7] = [
        Control::MoveLeft,
        Control::MoveRight,
        Control::ThrottleUp,
        Control::ThrottleDown,
        Control::Fire,
        Control::ActivateNuke,
        Control::ToggleShop,
    ];

    fn index(self) -> usize {
        match self {
            Control::MoveLeft => 0,
            Control::MoveRight => 1,
            Control::ThrottleUp => 2,
            Control::ThrottleDown => 3,
            Control::Fire => 4,
            Control::ActivateNuke => 5,
            Control::ToggleShop => 6,
        }
    }

    /// Map a DOM `KeyboardEvent.code` to a control
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "ArrowLeft" => Some(Control::MoveLeft),
            "ArrowRight" => Some(Control::MoveRight),
            "ArrowUp" => Some(Control::ThrottleUp),
            "ArrowDown" => Some(Control::ThrottleDown),
            "Space" | "KeyZ" => Some(Control::Fire),
            "KeyN" => Some(Control::ActivateNuke),
            "KeyM" => Some(Control::ToggleShop),
            _ => None,
        }
    }
}

/// Which controls are currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    held: [bool; 7],
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a set of held controls
    pub fn holding(controls: &[Control]) -> Self {
        let mut state = Self::default();
        for &c in controls {
            state.set(c, true);
        }
        state
    }

    pub fn set(&mut self, control: Control, held: bool) {
        self.held[control.index()] = held;
    }

    pub fn is_held(&self, control: Control) -> bool {
        self.held[control.index()]
    }

    /// Held now but not in `previous`
    pub fn pressed_since(&self, previous: &ControlState, control: Control) -> bool {
        self.is_held(control) && !previous.is_held(control)
    }

    pub fn release_all(&mut self) {
        self.held = [false; 7];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_codes() {
        assert_eq!(Control::from_key_code("Space"), Some(Control::Fire));
        assert_eq!(Control::from_key_code("KeyZ"), Some(Control::Fire));
        assert_eq!(Control::from_key_code("KeyM"), Some(Control::ToggleShop));
        assert_eq!(Control::from_key_code("KeyQ"), None);
    }

    #[test]
    fn test_rising_edge() {
        let before = ControlState::new();
        let now = ControlState::holding(&[Control::ActivateNuke]);
        assert!(now.pressed_since(&before, Control::ActivateNuke));
        assert!(!now.pressed_since(&now, Control::ActivateNuke));
    }

    #[test]
    fn test_each_control_has_own_slot() {
        let mut state = ControlState::new();
        for c in Control::ALL {
            state.set(c, true);
            assert!(Control::ALL.iter().filter(|&&o| state.is_held(o)).count() == 1);
            state.set(c, false);
        }
        state.set(Control::Fire, true);
        state.release_all();
        assert!(!state.is_held(Control::Fire));
    }
}
