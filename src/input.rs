//! Edge detection over continuously polled key states
//!
//! Each logical binding owns a two-state machine (previously pressed or not)
//! advanced exactly once per tick. Map switching is level-triggered and
//! reported every tick its key is held.

use crate::hotkeys::{Key, KeyPoller};
use crate::types::MapProfile;

/// Previous-sample state of one edge-triggered binding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeState {
    previous: bool,
}

impl EdgeState {
    /// Feed the current sample; true only on a not-pressed -> pressed transition
    pub fn update(&mut self, pressed: bool) -> bool {
        let fired = pressed && !self.previous;
        self.previous = pressed;
        fired
    }
}

/// Discrete actions produced by one tick of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ToggleMaster,
    /// Hide the overlay (only meaningful while visible)
    HideOverlay,
    ToggleVisible,
    /// Level-triggered while the number key is held
    SwitchMap(MapProfile),
    /// Delete + Control + Alt + Shift chord
    HideHovered,
}

/// Keys for each map slot, in map ordinal order
const MAP_KEYS: [Key; 4] = [Key::Digit1, Key::Digit2, Key::Digit3, Key::Digit4];

/// Keys that must all be held for the hide-hovered chord
pub const HIDE_HOVERED_CHORD: [Key; 4] = [Key::Delete, Key::Control, Key::Alt, Key::Shift];

#[derive(Debug, Default)]
pub struct InputEdgeDetector {
    master: EdgeState,
    hide: EdgeState,
    visible: EdgeState,
    hide_hovered: EdgeState,
}

impl InputEdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample every binding once and report what fired, in evaluation order
    ///
    /// All edge states advance unconditionally; gating on master/visibility is
    /// left to the caller.
    pub fn poll(&mut self, keys: &dyn KeyPoller) -> Vec<Action> {
        let mut actions = Vec::new();

        if self.master.update(keys.is_down(Key::Backtick)) {
            actions.push(Action::ToggleMaster);
        }
        if self.hide.update(keys.is_down(Key::H)) {
            actions.push(Action::HideOverlay);
        }
        if self.visible.update(keys.is_down(Key::Tab)) {
            actions.push(Action::ToggleVisible);
        }
        // Lowest number wins when several are held
        if let Some(map) = MAP_KEYS
            .iter()
            .position(|key| keys.is_down(*key))
            .and_then(MapProfile::from_ordinal)
        {
            actions.push(Action::SwitchMap(map));
        }

        let chord = HIDE_HOVERED_CHORD.iter().all(|key| keys.is_down(*key));
        if self.hide_hovered.update(chord) {
            actions.push(Action::HideHovered);
        }

        actions
    }
}
