//! Physics body shared by the player, platforms and interactables

use super::geometry::{Rect, Vec2};

/// Axis-aligned physics body
///
/// `size` is fixed at construction; `position`/`velocity` are owned by the
/// resolver while the body is simulated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsBody {
    pub position: Vec2,
    pub velocity: Vec2,
    size: Vec2,
    pub on_ground: bool,
    pub solid: bool,
}

impl PhysicsBody {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            size: Vec2::new(width, height),
            on_ground: false,
            solid: true,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Current bounds (recomputed on every call)
    pub fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.position, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size / 2.0
    }

    pub fn apply_gravity(&mut self, gravity: f32) {
        self.velocity.y += gravity;
    }

    pub fn apply_friction(&mut self, friction: f32) {
        self.velocity.x *= friction;
    }

    /// Integrate velocity; grounding must be re-earned by a contact this tick
    pub fn integrate(&mut self) {
        self.position += self.velocity;
        self.on_ground = false;
    }
}
