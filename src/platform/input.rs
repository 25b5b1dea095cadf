//! Keyboard input mapped to logical actions
//!
//! Tracks which keys are held and which actions were newly pressed since the
//! last consumed tick, then hands the simulation a plain `TickInput`.

use std::collections::BTreeSet;

use crate::sim::TickInput;

/// Logical game actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
    Interact,
    RestartLoop,
    ResetAll,
    SkipLevel,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::Jump,
        Action::Interact,
        Action::RestartLoop,
        Action::ResetAll,
        Action::SkipLevel,
    ];

    /// Map a DOM `KeyboardEvent.code` to an action
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "KeyA" | "ArrowLeft" => Some(Action::MoveLeft),
            "KeyD" | "ArrowRight" => Some(Action::MoveRight),
            "KeyW" | "ArrowUp" | "Space" => Some(Action::Jump),
            "KeyE" => Some(Action::Interact),
            "KeyR" => Some(Action::RestartLoop),
            "KeyT" => Some(Action::ResetAll),
            "KeyN" => Some(Action::SkipLevel),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Held keys plus per-tick pressed edges
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held_keys: BTreeSet<String>,
    pressed: [bool; Action::ALL.len()],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a keydown event. Returns true if the key maps to an action.
    pub fn key_down(&mut self, code: &str) -> bool {
        let Some(action) = Action::from_key_code(code) else {
            return false;
        };
        // Auto-repeat keydowns are not new presses
        if self.held_keys.insert(code.to_string()) && !self.is_held_except(action, code) {
            self.pressed[action.index()] = true;
        }
        true
    }

    /// Handle a keyup event. Returns true if the key maps to an action.
    pub fn key_up(&mut self, code: &str) -> bool {
        self.held_keys.remove(code);
        Action::from_key_code(code).is_some()
    }

    /// Whether any key bound to `action` is down
    pub fn is_held(&self, action: Action) -> bool {
        self.held_keys
            .iter()
            .any(|k| Action::from_key_code(k) == Some(action))
    }

    fn is_held_except(&self, action: Action, code: &str) -> bool {
        self.held_keys
            .iter()
            .any(|k| k != code && Action::from_key_code(k) == Some(action))
    }

    /// Whether `action` was newly pressed since the last `end_tick`
    pub fn was_pressed(&self, action: Action) -> bool {
        self.pressed[action.index()]
    }

    /// Snapshot for the next simulation tick
    pub fn snapshot(&self) -> TickInput {
        TickInput {
            move_left: self.is_held(Action::MoveLeft),
            move_right: self.is_held(Action::MoveRight),
            jump: self.was_pressed(Action::Jump),
            interact: self.is_held(Action::Interact),
            restart_loop: self.was_pressed(Action::RestartLoop),
            reset_all: self.was_pressed(Action::ResetAll),
            skip_level: self.was_pressed(Action::SkipLevel),
        }
    }

    /// Clear pressed edges after a tick consumed them
    pub fn end_tick(&mut self) {
        self.pressed = [false; Action::ALL.len()];
    }

    /// Release everything (window lost focus)
    pub fn clear(&mut self) {
        self.held_keys.clear();
        self.end_tick();
    }
}
