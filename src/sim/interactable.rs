//! Puzzle objects: buttons, doors and movable blocks
//!
//! Interactables never look for actors themselves. Each tick the controller
//! clears their activation, calls `interact` for every actor in range, and
//! then lets the level advance their state machines.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::body::PhysicsBody;
use super::geometry::{Rect, Vec2};
use crate::consts::*;

/// Identity of an actor that can trigger interactables
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorId {
    Player,
    /// Ghost replaying the given loop
    Ghost(u32),
}

/// Interactable type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractableType {
    Button,
    Door,
    MovableBlock,
}

impl InteractableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractableType::Button => "button",
            InteractableType::Door => "door",
            InteractableType::MovableBlock => "movable_block",
        }
    }
}

/// How a door combines the buttons wired to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenPolicy {
    /// Open while any connected button is satisfied
    #[default]
    Any,
    /// Open only while every connected button is satisfied
    All,
}

impl OpenPolicy {
    /// Combine button states; `None` when no button drives the door
    pub fn evaluate<I: IntoIterator<Item = bool>>(self, satisfied: I) -> Option<bool> {
        let mut iter = satisfied.into_iter().peekable();
        iter.peek()?;
        Some(match self {
            OpenPolicy::Any => iter.fold(false, |acc, s| acc | s),
            OpenPolicy::All => iter.fold(true, |acc, s| acc & s),
        })
    }
}

/// Pressure button
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub press_depth: f32,
    /// Indices of doors in the owning level's interactables
    pub connected_doors: Vec<usize>,
    pub requires_hold: bool,
    /// Accumulated hold time (ms), reset on release
    pub activation_time: u32,
    pub required_hold_time: u32,
}

/// Sliding door; moves up by its own height when open
#[derive(Debug, Clone, PartialEq)]
pub struct Door {
    pub is_open: bool,
    pub closed_y: f32,
    pub open_y: f32,
    pub target_y: f32,
    pub animation_speed: f32,
    pub policy: OpenPolicy,
}

/// Pushable crate
#[derive(Debug, Clone, PartialEq)]
pub struct MovableBlock {
    pub being_pushed: bool,
    pub push_force: f32,
    /// Authored position, restored on loop reset
    pub home: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractableKind {
    Button(Button),
    Door(Door),
    MovableBlock(MovableBlock),
}

/// Snapshot of activation, stored with recorded interactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionState {
    pub is_active: bool,
    pub activated_by: Vec<ActorId>,
}

/// Render-agnostic view of an interactable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractableView {
    pub kind: InteractableType,
    pub bounds: Rect,
    pub is_active: bool,
    /// Doors only
    pub is_open: bool,
    /// Buttons only, 0..=1
    pub hold_progress: f32,
    /// Blocks only
    pub being_pushed: bool,
    /// How far the button cap is pushed down
    pub press_offset: f32,
}

/// A puzzle object in a level
#[derive(Debug, Clone, PartialEq)]
pub struct Interactable {
    pub body: PhysicsBody,
    pub is_active: bool,
    /// Actors triggering this object during the current tick
    pub activated_by: BTreeSet<ActorId>,
    pub kind: InteractableKind,
}

impl Interactable {
    fn with_kind(body: PhysicsBody, kind: InteractableKind) -> Self {
        Self {
            body,
            is_active: false,
            activated_by: BTreeSet::new(),
            kind,
        }
    }

    /// Button at (x, y) with default hold settings
    pub fn button(x: f32, y: f32) -> Self {
        let mut body = PhysicsBody::new(x, y, BUTTON_WIDTH, BUTTON_HEIGHT);
        body.solid = false;
        Self::with_kind(
            body,
            InteractableKind::Button(Button {
                press_depth: BUTTON_PRESS_DEPTH,
                connected_doors: Vec::new(),
                requires_hold: true,
                activation_time: 0,
                required_hold_time: BUTTON_HOLD_TIME_MS,
            }),
        )
    }

    /// Closed door
    pub fn door(x: f32, y: f32, width: f32, height: f32) -> Self {
        let body = PhysicsBody::new(x, y, width, height);
        Self::with_kind(
            body,
            InteractableKind::Door(Door {
                is_open: false,
                closed_y: y,
                open_y: y - height,
                target_y: y,
                animation_speed: DOOR_SPEED,
                policy: OpenPolicy::Any,
            }),
        )
    }

    pub fn movable_block(x: f32, y: f32, width: f32, height: f32) -> Self {
        let body = PhysicsBody::new(x, y, width, height);
        Self::with_kind(
            body,
            InteractableKind::MovableBlock(MovableBlock {
                being_pushed: false,
                push_force: BLOCK_PUSH_SPEED,
                home: Vec2::new(x, y),
            }),
        )
    }

    /// Builder: hold requirement for a button
    pub fn with_hold(mut self, requires_hold: bool, required_hold_time: u32) -> Self {
        if let InteractableKind::Button(button) = &mut self.kind {
            button.requires_hold = requires_hold;
            button.required_hold_time = required_hold_time;
        }
        self
    }

    /// Builder: open policy for a door
    pub fn with_policy(mut self, policy: OpenPolicy) -> Self {
        if let InteractableKind::Door(door) = &mut self.kind {
            door.policy = policy;
        }
        self
    }

    pub fn kind_type(&self) -> InteractableType {
        match self.kind {
            InteractableKind::Button(_) => InteractableType::Button,
            InteractableKind::Door(_) => InteractableType::Door,
            InteractableKind::MovableBlock(_) => InteractableType::MovableBlock,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.body.bounds()
    }

    pub fn as_button(&self) -> Option<&Button> {
        match &self.kind {
            InteractableKind::Button(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_button_mut(&mut self) -> Option<&mut Button> {
        match &mut self.kind {
            InteractableKind::Button(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_door(&self) -> Option<&Door> {
        match &self.kind {
            InteractableKind::Door(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&MovableBlock> {
        match &self.kind {
            InteractableKind::MovableBlock(b) => Some(b),
            _ => None,
        }
    }

    pub fn is_door(&self) -> bool {
        matches!(self.kind, InteractableKind::Door(_))
    }

    pub fn is_open(&self) -> bool {
        self.as_door().is_some_and(|d| d.is_open)
    }

    /// A button that is pressed and has been held long enough
    pub fn hold_satisfied(&self) -> bool {
        match &self.kind {
            InteractableKind::Button(b) => {
                self.is_active && (!b.requires_hold || b.activation_time >= b.required_hold_time)
            }
            _ => false,
        }
    }

    /// Drop last tick's activation before detection runs
    pub fn clear_interactions(&mut self) {
        self.activated_by.clear();
        if let InteractableKind::MovableBlock(block) = &mut self.kind {
            block.being_pushed = false;
        }
    }

    /// An actor is in range this tick
    pub fn interact(&mut self, actor: ActorId, actor_center: Vec2) {
        let center = self.body.center();
        match &mut self.kind {
            InteractableKind::Button(_) => {
                self.activated_by.insert(actor);
            }
            InteractableKind::Door(_) => {}
            InteractableKind::MovableBlock(block) => {
                self.activated_by.insert(actor);
                block.being_pushed = true;
                // Constant push away from the actor
                self.body.velocity.x = if actor_center.x < center.x {
                    block.push_force
                } else {
                    -block.push_force
                };
            }
        }
    }

    /// Command a door open or closed
    ///
    /// Solidity follows the command immediately; the panel animates after.
    pub fn set_open(&mut self, open: bool) {
        if let InteractableKind::Door(door) = &mut self.kind {
            door.is_open = open;
            door.target_y = if open { door.open_y } else { door.closed_y };
            self.body.solid = !open;
            self.is_active = open;
        }
    }

    /// Advance this object's own state machine by one tick
    pub fn update(&mut self) {
        match &mut self.kind {
            InteractableKind::Button(button) => {
                self.is_active = !self.activated_by.is_empty();
                if self.is_active {
                    button.activation_time = button.activation_time.saturating_add(HOLD_INCREMENT_MS);
                } else {
                    button.activation_time = 0;
                }
            }
            InteractableKind::Door(door) => {
                let y = self.body.position.y;
                if (y - door.target_y).abs() > 1.0 {
                    let direction = if door.target_y > y { 1.0 } else { -1.0 };
                    self.body.position.y += direction * door.animation_speed;
                } else {
                    self.body.position.y = door.target_y;
                }
            }
            InteractableKind::MovableBlock(block) => {
                self.is_active = block.being_pushed;
                if !block.being_pushed {
                    self.body.velocity.x *= BLOCK_DAMPING;
                }
            }
        }
    }

    /// Clear transient state at the start of a loop
    pub fn reset(&mut self) {
        self.activated_by.clear();
        self.is_active = false;
        match &mut self.kind {
            InteractableKind::Button(button) => {
                button.activation_time = 0;
            }
            InteractableKind::Door(door) => {
                let closed_y = door.closed_y;
                self.set_open(false);
                self.body.position.y = closed_y;
            }
            InteractableKind::MovableBlock(block) => {
                block.being_pushed = false;
                self.body.position = block.home;
                self.body.velocity = Vec2::ZERO;
                self.body.on_ground = false;
            }
        }
    }

    /// Activation snapshot for recordings
    pub fn state(&self) -> InteractionState {
        InteractionState {
            is_active: self.is_active,
            activated_by: self.activated_by.iter().copied().collect(),
        }
    }

    pub fn view(&self) -> InteractableView {
        let mut view = InteractableView {
            kind: self.kind_type(),
            bounds: self.bounds(),
            is_active: self.is_active,
            is_open: false,
            hold_progress: 0.0,
            being_pushed: false,
            press_offset: 0.0,
        };
        match &self.kind {
            InteractableKind::Button(b) => {
                if self.is_active {
                    view.press_offset = b.press_depth;
                    view.hold_progress = if b.requires_hold && b.required_hold_time > 0 {
                        (b.activation_time as f32 / b.required_hold_time as f32).min(1.0)
                    } else {
                        1.0
                    };
                }
            }
            InteractableKind::Door(d) => view.is_open = d.is_open,
            InteractableKind::MovableBlock(b) => view.being_pushed = b.being_pushed,
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_evaluate() {
        assert_eq!(OpenPolicy::Any.evaluate([]), None);
        assert_eq!(OpenPolicy::Any.evaluate([false, true]), Some(true));
        assert_eq!(OpenPolicy::All.evaluate([true, false, true]), Some(false));
        assert_eq!(OpenPolicy::All.evaluate([true, true, true]), Some(true));
    }

    #[test]
    fn test_hold_to_activate() {
        let mut button = Interactable::button(0.0, 0.0).with_hold(true, 2000);

        for _ in 0..124 {
            button.clear_interactions();
            button.interact(ActorId::Player, Vec2::ZERO);
            button.update();
            assert!(!button.hold_satisfied());
        }

        // Release at tick 124 resets accumulation
        button.clear_interactions();
        button.update();
        assert!(!button.is_active);
        assert_eq!(button.as_button().unwrap().activation_time, 0);

        for tick in 1..=125 {
            button.clear_interactions();
            button.interact(ActorId::Ghost(1), Vec2::ZERO);
            button.update();
            assert_eq!(button.hold_satisfied(), tick >= 125);
        }
    }

    #[test]
    fn test_instant_button() {
        let mut button = Interactable::button(0.0, 0.0).with_hold(false, 5000);
        button.interact(ActorId::Player, Vec2::ZERO);
        button.update();
        assert!(button.hold_satisfied());
    }

    #[test]
    fn test_door_solidity_flips_before_animation() {
        let mut door = Interactable::door(100.0, 400.0, 20.0, 100.0);
        assert!(door.body.solid);

        door.set_open(true);
        assert!(!door.body.solid);
        assert_eq!(door.body.position.y, 400.0);

        door.update();
        assert_eq!(door.body.position.y, 397.0);

        for _ in 0..40 {
            door.update();
        }
        assert_eq!(door.body.position.y, 300.0);

        door.set_open(false);
        assert!(door.body.solid);
        assert!(door.body.position.y < 400.0);
    }

    #[test]
    fn test_block_push_direction_and_damping() {
        let mut block = Interactable::movable_block(100.0, 100.0, 40.0, 40.0);

        block.interact(ActorId::Player, Vec2::new(50.0, 120.0));
        block.update();
        assert_eq!(block.body.velocity.x, BLOCK_PUSH_SPEED);
        assert!(block.is_active);

        block.clear_interactions();
        block.interact(ActorId::Player, Vec2::new(200.0, 120.0));
        block.update();
        assert_eq!(block.body.velocity.x, -BLOCK_PUSH_SPEED);

        block.clear_interactions();
        block.update();
        assert!((block.body.velocity.x + BLOCK_PUSH_SPEED * BLOCK_DAMPING).abs() < 1e-6);
        assert!(!block.is_active);
    }

    #[test]
    fn test_doors_ignore_interaction() {
        let mut door = Interactable::door(0.0, 0.0, 20.0, 100.0);
        door.interact(ActorId::Player, Vec2::ZERO);
        assert!(door.activated_by.is_empty());
    }

    #[test]
    fn test_reset_restores_authored_state() {
        let mut door = Interactable::door(0.0, 200.0, 20.0, 100.0);
        door.set_open(true);
        for _ in 0..10 {
            door.update();
        }
        door.reset();
        assert!(!door.is_open());
        assert!(door.body.solid);
        assert_eq!(door.body.position.y, 200.0);

        let mut block = Interactable::movable_block(10.0, 20.0, 40.0, 40.0);
        block.body.position = Vec2::new(300.0, 20.0);
        block.body.velocity = Vec2::new(2.0, 0.0);
        block.reset();
        assert_eq!(block.body.position, Vec2::new(10.0, 20.0));
        assert_eq!(block.body.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_view_hold_progress() {
        let mut button = Interactable::button(0.0, 0.0).with_hold(true, 160);
        button.interact(ActorId::Player, Vec2::ZERO);
        for _ in 0..5 {
            button.update();
        }
        let view = button.view();
        assert_eq!(view.kind, InteractableType::Button);
        assert!((view.hold_progress - 0.5).abs() < 1e-6);
        assert_eq!(view.press_offset, BUTTON_PRESS_DEPTH);
    }
}
