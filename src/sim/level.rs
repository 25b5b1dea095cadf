//! Level container
//!
//! Owns platforms and interactables. Interactable order is both hit-test and
//! render order, and buttons refer to doors by index into that list.

use thiserror::Error;

use super::body::PhysicsBody;
use super::collision::{BodyRef, CollisionWorld};
use super::geometry::{Rect, Vec2};
use super::interactable::{ActorId, Interactable, InteractableKind};
use super::recorder::InteractionRecord;
use crate::settings::PhysicsTuning;

pub const DEFAULT_BACKGROUND: &str = "#1a1a2e";
pub const DEFAULT_SPAWN: Vec2 = Vec2::new(50.0, 400.0);

/// Editor wiring errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("no interactable at index {0}")]
    OutOfRange(usize),
    #[error("interactable {0} is not a button")]
    NotAButton(usize),
    #[error("interactable {0} is not a door")]
    NotADoor(usize),
}

/// Result of an editor hit test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Interactable(usize),
    Platform(usize),
    ExitZone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub platforms: Vec<PhysicsBody>,
    pub interactables: Vec<Interactable>,
    pub player_spawn: Vec2,
    pub exit_zone: Option<Rect>,
    pub background_color: String,
    pub completed: bool,
}

impl Default for Level {
    fn default() -> Self {
        Self::new()
    }
}

impl Level {
    pub fn new() -> Self {
        Self {
            platforms: Vec::new(),
            interactables: Vec::new(),
            player_spawn: DEFAULT_SPAWN,
            exit_zone: None,
            background_color: DEFAULT_BACKGROUND.to_string(),
            completed: false,
        }
    }

    /// Empty room: floor, side walls and ceiling
    pub fn new_blank(width: f32, height: f32) -> Self {
        let mut level = Self::new();
        level.add_platform(0.0, height - 50.0, width, 50.0);
        level.add_platform(0.0, 0.0, 20.0, height);
        level.add_platform(width - 20.0, 0.0, 20.0, height);
        level.add_platform(0.0, 0.0, width, 20.0);
        level
    }

    pub fn add_platform(&mut self, x: f32, y: f32, width: f32, height: f32) -> usize {
        self.platforms.push(PhysicsBody::new(x, y, width, height));
        self.platforms.len() - 1
    }

    pub fn add_interactable(&mut self, obj: Interactable) -> usize {
        self.interactables.push(obj);
        self.interactables.len() - 1
    }

    pub fn set_spawn(&mut self, spawn: Vec2) {
        self.player_spawn = spawn;
    }

    pub fn set_exit_zone(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.exit_zone = Some(Rect::new(x, y, width, height));
    }

    pub fn clear_exit_zone(&mut self) {
        self.exit_zone = None;
    }

    pub fn remove_platform(&mut self, index: usize) -> Option<PhysicsBody> {
        (index < self.platforms.len()).then(|| self.platforms.remove(index))
    }

    /// Remove an interactable, pruning and re-indexing button connections
    pub fn remove_interactable(&mut self, index: usize) -> Option<Interactable> {
        if index >= self.interactables.len() {
            return None;
        }
        let removed = self.interactables.remove(index);
        for obj in &mut self.interactables {
            if let Some(button) = obj.as_button_mut() {
                button.connected_doors.retain(|&d| d != index);
                for d in &mut button.connected_doors {
                    if *d > index {
                        *d -= 1;
                    }
                }
            }
        }
        Some(removed)
    }

    /// Wire a button to a door
    pub fn connect(&mut self, button: usize, door: usize) -> Result<(), LevelError> {
        let target = self.interactables.get(door).ok_or(LevelError::OutOfRange(door))?;
        if !target.is_door() {
            return Err(LevelError::NotADoor(door));
        }
        let source = self
            .interactables
            .get_mut(button)
            .ok_or(LevelError::OutOfRange(button))?
            .as_button_mut()
            .ok_or(LevelError::NotAButton(button))?;
        if !source.connected_doors.contains(&door) {
            source.connected_doors.push(door);
        }
        Ok(())
    }

    /// Look up a collision body by handle
    pub fn body(&self, handle: BodyRef) -> Option<&PhysicsBody> {
        match handle {
            BodyRef::Platform(i) => self.platforms.get(i),
            BodyRef::Interactable(i) => self.interactables.get(i).map(|obj| &obj.body),
        }
    }

    /// Player center inside the exit zone with every door open
    pub fn check_win_condition(&mut self, player_center: Vec2) -> bool {
        let Some(exit) = self.exit_zone else {
            return false;
        };
        if !exit.contains(player_center) {
            return false;
        }
        let all_doors_open = self
            .interactables
            .iter()
            .filter(|obj| obj.is_door())
            .all(|door| door.is_open());
        if all_doors_open {
            self.completed = true;
        }
        all_doors_open
    }

    /// Clear transient state between loops; structure is kept
    pub fn reset(&mut self) {
        self.completed = false;
        for obj in &mut self.interactables {
            obj.reset();
        }
    }

    /// Step 1 of the interaction protocol
    pub fn clear_interactions(&mut self) {
        for obj in &mut self.interactables {
            obj.clear_interactions();
        }
    }

    /// Step 2: one actor touches everything its interaction bounds overlap
    pub fn interact_actor(&mut self, actor: ActorId, interaction_bounds: &Rect, actor_center: Vec2) {
        for obj in &mut self.interactables {
            if interaction_bounds.intersects(&obj.bounds()) {
                obj.interact(actor, actor_center);
            }
        }
    }

    /// Step 3: advance every state machine from this tick's activation
    ///
    /// Buttons first, then each driven door takes its policy's verdict over
    /// the buttons wired to it, then doors animate and blocks damp.
    pub fn update_interactables(&mut self) {
        for obj in &mut self.interactables {
            if matches!(obj.kind, InteractableKind::Button(_)) {
                obj.update();
            }
        }

        for door_index in 0..self.interactables.len() {
            let Some(door) = self.interactables[door_index].as_door() else {
                continue;
            };
            let policy = door.policy;
            let verdict = policy.evaluate(
                self.interactables
                    .iter()
                    .filter(|obj| {
                        obj.as_button()
                            .is_some_and(|b| b.connected_doors.contains(&door_index))
                    })
                    .map(|obj| obj.hold_satisfied()),
            );
            if let Some(open) = verdict {
                self.interactables[door_index].set_open(open);
            }
        }

        for obj in &mut self.interactables {
            if !matches!(obj.kind, InteractableKind::Button(_)) {
                obj.update();
            }
        }
    }

    /// Secondary physics for dynamic interactables (movable blocks)
    pub fn update_dynamics(&mut self, world: &CollisionWorld, tuning: &PhysicsTuning) {
        for i in 0..self.interactables.len() {
            if self.interactables[i].as_block().is_none() {
                continue;
            }
            let mut body = self.interactables[i].body;
            world.update_body(&mut body, self, tuning, Some(BodyRef::Interactable(i)));
            self.interactables[i].body = body;
        }
    }

    /// Interactables the given actor is triggering, for recording
    pub fn interactions_of(&self, actor: ActorId) -> Vec<InteractionRecord> {
        self.interactables
            .iter()
            .enumerate()
            .filter(|(_, obj)| obj.activated_by.contains(&actor))
            .map(|(index, obj)| InteractionRecord {
                kind: obj.kind_type(),
                index,
                state: obj.state(),
            })
            .collect()
    }

    /// Editor hit test: topmost interactable, then platforms, then exit zone
    pub fn object_at(&self, point: Vec2) -> Option<Selection> {
        if let Some(i) = self
            .interactables
            .iter()
            .rposition(|obj| obj.bounds().contains(point))
        {
            return Some(Selection::Interactable(i));
        }
        if let Some(i) = self
            .platforms
            .iter()
            .rposition(|p| p.bounds().contains(point))
        {
            return Some(Selection::Platform(i));
        }
        self.exit_zone
            .filter(|zone| zone.contains(point))
            .map(|_| Selection::ExitZone)
    }

    /// Delete whatever a hit test selected
    pub fn remove_selection(&mut self, selection: Selection) {
        match selection {
            Selection::Interactable(i) => {
                self.remove_interactable(i);
            }
            Selection::Platform(i) => {
                self.remove_platform(i);
            }
            Selection::ExitZone => self.clear_exit_zone(),
        }
    }
}
