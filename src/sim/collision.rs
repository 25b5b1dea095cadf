//! Collision detection and response for axis-aligned boxes
//!
//! Each overlapping static body is resolved independently, in list order, on
//! the axis of least penetration. There is no global solve: a body wedged
//! between several solids in one tick can be pushed into another one. Levels
//! are tuned against this behavior, so it stays.

use super::body::PhysicsBody;
use super::geometry::Rect;
use super::level::Level;
use crate::settings::PhysicsTuning;

/// Axis a contact was resolved on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Result of resolving one overlap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub axis: Axis,
    /// Penetration depth on the resolved axis
    pub penetration: f32,
    /// Moving body came to rest on top of the static body
    pub grounded: bool,
}

/// Handle to a collision body owned by a level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRef {
    Platform(usize),
    Interactable(usize),
}

/// Push `moving` out of `other` along the axis of least penetration
///
/// Ties resolve vertically. Snaps to the boundary and zeroes the velocity
/// component on that axis.
pub fn resolve_collision(moving: &mut PhysicsBody, other: &Rect) -> Option<Contact> {
    let bounds = moving.bounds();
    if !bounds.intersects(other) {
        return None;
    }

    let overlap_x = (bounds.right() - other.left()).min(other.right() - bounds.left());
    let overlap_y = (bounds.bottom() - other.top()).min(other.bottom() - bounds.top());

    if overlap_x < overlap_y {
        if bounds.center_x() < other.center_x() {
            moving.position.x = other.left() - moving.size().x;
        } else {
            moving.position.x = other.right();
        }
        moving.velocity.x = 0.0;
        Some(Contact {
            axis: Axis::Horizontal,
            penetration: overlap_x,
            grounded: false,
        })
    } else {
        let grounded = bounds.center_y() < other.center_y();
        if grounded {
            moving.position.y = other.top() - moving.size().y;
            moving.on_ground = true;
        } else {
            moving.position.y = other.bottom();
        }
        moving.velocity.y = 0.0;
        Some(Contact {
            axis: Axis::Vertical,
            penetration: overlap_y,
            grounded,
        })
    }
}

/// Treat the world edges as solid walls; the floor grounds the body
pub fn clamp_to_world(body: &mut PhysicsBody, world_width: f32, world_height: f32) {
    let size = body.size();

    if body.position.x < 0.0 {
        body.position.x = 0.0;
        body.velocity.x = 0.0;
    }
    if body.position.x + size.x > world_width {
        body.position.x = world_width - size.x;
        body.velocity.x = 0.0;
    }
    if body.position.y < 0.0 {
        body.position.y = 0.0;
        body.velocity.y = 0.0;
    }
    if body.position.y + size.y > world_height {
        body.position.y = world_height - size.y;
        body.velocity.y = 0.0;
        body.on_ground = true;
    }
}

/// Static collision set derived from a level
///
/// Rebuilt whenever the level's structure changes. Every platform and
/// interactable gets a handle; solidity is read at resolve time, so a door
/// that opens or closes later is always current.
#[derive(Debug, Clone, Default)]
pub struct CollisionWorld {
    statics: Vec<BodyRef>,
}

impl CollisionWorld {
    /// Handles for every platform, then every interactable
    pub fn from_level(level: &Level) -> Self {
        let mut statics: Vec<BodyRef> = (0..level.platforms.len()).map(BodyRef::Platform).collect();
        statics.extend((0..level.interactables.len()).map(BodyRef::Interactable));
        log::debug!("Collision world has {} static bodies", statics.len());
        Self { statics }
    }

    pub fn len(&self) -> usize {
        self.statics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statics.is_empty()
    }

    pub fn statics(&self) -> &[BodyRef] {
        &self.statics
    }

    /// Advance one dynamic body by a tick
    ///
    /// Gravity, integration, per-body resolution in list order, world
    /// clamping, then ground friction if a contact grounded the body.
    /// `skip` excludes the body's own entry when it is also a static body.
    pub fn update_body(
        &self,
        body: &mut PhysicsBody,
        level: &Level,
        tuning: &PhysicsTuning,
        skip: Option<BodyRef>,
    ) {
        body.apply_gravity(tuning.gravity);
        body.integrate();

        for &handle in &self.statics {
            if Some(handle) == skip {
                continue;
            }
            let Some(other) = level.body(handle) else {
                continue;
            };
            if other.solid {
                resolve_collision(body, &other.bounds());
            }
        }

        clamp_to_world(body, tuning.world_width, tuning.world_height);

        if body.on_ground {
            body.apply_friction(tuning.friction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::Vec2;
    use proptest::prelude::*;

    fn floor_level() -> Level {
        let mut level = Level::new();
        level.add_platform(0.0, 550.0, 800.0, 50.0);
        level
    }

    #[test]
    fn test_body_lands_on_platform() {
        let level = floor_level();
        let world = CollisionWorld::from_level(&level);
        let tuning = PhysicsTuning::default();

        let mut body = PhysicsBody::new(100.0, 505.0, 30.0, 40.0);
        body.velocity.y = 8.0;
        world.update_body(&mut body, &level, &tuning, None);

        assert!(body.on_ground);
        assert_eq!(body.velocity.y, 0.0);
        assert_eq!(body.bounds().bottom(), 550.0);
    }

    #[test]
    fn test_horizontal_resolution_on_smaller_overlap() {
        let wall = Rect::new(100.0, 0.0, 20.0, 200.0);
        let mut body = PhysicsBody::new(75.0, 50.0, 30.0, 40.0);
        body.velocity = Vec2::new(3.0, 1.0);

        let contact = resolve_collision(&mut body, &wall).unwrap();
        assert_eq!(contact.axis, Axis::Horizontal);
        assert_eq!(body.position.x, 70.0);
        assert_eq!(body.velocity.x, 0.0);
        assert_eq!(body.velocity.y, 1.0);
        assert!(!body.on_ground);
    }

    #[test]
    fn test_equal_overlap_resolves_vertically() {
        let block = Rect::new(0.0, 10.0, 10.0, 10.0);
        let mut body = PhysicsBody::new(-5.0, 5.0, 10.0, 10.0);
        let contact = resolve_collision(&mut body, &block).unwrap();
        assert_eq!(contact.axis, Axis::Vertical);
        assert!(contact.grounded);
        assert_eq!(body.position.y, 0.0);
    }

    #[test]
    fn test_ceiling_hit_does_not_ground() {
        let ceiling = Rect::new(0.0, 0.0, 800.0, 20.0);
        let mut body = PhysicsBody::new(100.0, 15.0, 30.0, 40.0);
        body.velocity.y = -5.0;
        let contact = resolve_collision(&mut body, &ceiling).unwrap();
        assert!(!contact.grounded);
        assert_eq!(body.position.y, 20.0);
        assert!(!body.on_ground);
    }

    #[test]
    fn test_world_floor_grounds_body() {
        let mut body = PhysicsBody::new(-4.0, 590.0, 30.0, 40.0);
        clamp_to_world(&mut body, 800.0, 600.0);
        assert_eq!(body.position, Vec2::new(0.0, 560.0));
        assert!(body.on_ground);
    }

    #[test]
    fn test_friction_only_when_grounded() {
        let level = Level::new();
        let world = CollisionWorld::from_level(&level);
        let tuning = PhysicsTuning::default();

        let mut airborne = PhysicsBody::new(100.0, 100.0, 30.0, 40.0);
        airborne.velocity.x = 2.0;
        world.update_body(&mut airborne, &level, &tuning, None);
        assert_eq!(airborne.velocity.x, 2.0);

        let mut grounded = PhysicsBody::new(100.0, 560.0, 30.0, 40.0);
        grounded.velocity.x = 2.0;
        world.update_body(&mut grounded, &level, &tuning, None);
        assert!(grounded.on_ground);
        assert!((grounded.velocity.x - 2.0 * tuning.friction).abs() < 1e-6);
    }

    #[test]
    fn test_non_solid_statics_are_ignored() {
        let mut level = floor_level();
        level.platforms[0].solid = false;
        let world = CollisionWorld::from_level(&level);
        let tuning = PhysicsTuning::default();

        let mut body = PhysicsBody::new(100.0, 520.0, 30.0, 40.0);
        world.update_body(&mut body, &level, &tuning, None);
        assert!(body.bounds().bottom() > 550.0);
    }

    proptest! {
        #[test]
        fn prop_falling_body_never_rests_inside_floor(
            x in 0.0f32..770.0,
            start_y in 400.0f32..505.0,
            vy in 0.0f32..15.0,
        ) {
            let level = floor_level();
            let world = CollisionWorld::from_level(&level);
            let tuning = PhysicsTuning::default();

            let mut body = PhysicsBody::new(x, start_y, 30.0, 40.0);
            body.velocity.y = vy;
            for _ in 0..120 {
                world.update_body(&mut body, &level, &tuning, None);
                prop_assert!(body.bounds().bottom() <= 550.0 + 1e-3);
            }
            prop_assert!(body.on_ground);
            prop_assert!((body.bounds().bottom() - 550.0).abs() < 1e-3);
        }
    }
}
