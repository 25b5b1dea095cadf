//! The live player

use super::body::PhysicsBody;
use super::geometry::{Rect, Vec2};
use super::tick::TickInput;
use crate::consts::*;
use crate::settings::PhysicsTuning;

/// Copy of the player's physical state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSnapshot {
    pub position: Vec2,
    pub velocity: Vec2,
    pub on_ground: bool,
    pub is_active: bool,
}

/// Player-controlled actor
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub body: PhysicsBody,
    pub is_active: bool,
}

impl Player {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            body: PhysicsBody::new(spawn.x, spawn.y, PLAYER_WIDTH, PLAYER_HEIGHT),
            is_active: true,
        }
    }

    /// Put the player back at a spawn point, at rest
    pub fn respawn(&mut self, spawn: Vec2) {
        self.body.position = spawn;
        self.body.velocity = Vec2::ZERO;
        self.body.on_ground = false;
        self.is_active = true;
    }

    /// Apply movement and jump input before physics runs
    pub fn handle_input(&mut self, input: &TickInput, tuning: &PhysicsTuning) {
        if !self.is_active {
            return;
        }

        self.body.velocity.x = input.move_axis() * tuning.player_speed;

        if input.jump && self.body.on_ground {
            self.body.velocity.y = tuning.jump_velocity;
            self.body.on_ground = false;
        }
    }

    pub fn center(&self) -> Vec2 {
        self.body.center()
    }

    /// Hit-test rectangle for interactables
    pub fn interaction_bounds(&self) -> Rect {
        self.body.bounds().expand(INTERACTION_MARGIN)
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.body.position,
            velocity: self.body.velocity,
            on_ground: self.body.on_ground,
            is_active: self.is_active,
        }
    }

    pub fn restore(&mut self, snapshot: &PlayerSnapshot) {
        self.body.position = snapshot.position;
        self.body.velocity = snapshot.velocity;
        self.body.on_ground = snapshot.on_ground;
        self.is_active = snapshot.is_active;
    }
}
