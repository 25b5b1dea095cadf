//! Built-in level set
//!
//! Levels are authored through the same editor operations a custom level
//! uses and shipped as documents, so they load exactly like imported ones.

use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};
use crate::persistence::LevelDocument;
use crate::sim::geometry::Vec2;
use crate::sim::interactable::{Interactable, OpenPolicy};
use crate::sim::level::Level;

/// Top of the floor in a blank room
const FLOOR_Y: f32 = WORLD_HEIGHT - 50.0;

fn room(background: &str) -> Level {
    let mut level = Level::new_blank(WORLD_WIDTH, WORLD_HEIGHT);
    level.background_color = background.to_string();
    level.set_spawn(Vec2::new(50.0, FLOOR_Y - 60.0));
    level
}

fn floor_button(level: &mut Level, x: f32, hold_ms: u32) -> usize {
    let button = Interactable::button(x, FLOOR_Y - 20.0).with_hold(hold_ms > 0, hold_ms);
    level.add_interactable(button)
}

fn floor_door(level: &mut Level, x: f32, policy: OpenPolicy) -> usize {
    level.add_interactable(Interactable::door(x, FLOOR_Y - 100.0, 20.0, 100.0).with_policy(policy))
}

fn wire(level: &mut Level, button: usize, door: usize) {
    if let Err(e) = level.connect(button, door) {
        log::warn!("Built-in level wiring {} -> {} failed: {}", button, door, e);
    }
}

/// One button, one door: a ghost holds the button while you walk through
fn first_echo() -> Level {
    let mut level = room("#1a1a2e");
    let button = floor_button(&mut level, 220.0, 100);
    let door = floor_door(&mut level, 520.0, OpenPolicy::Any);
    wire(&mut level, button, door);
    level.set_exit_zone(680.0, FLOOR_Y - 80.0, 60.0, 80.0);
    level
}

/// Three buttons that must be held at once
fn three_hands() -> Level {
    let mut level = room("#1e1a2e");
    let buttons = [
        floor_button(&mut level, 140.0, 0),
        floor_button(&mut level, 300.0, 0),
        floor_button(&mut level, 460.0, 0),
    ];
    let door = floor_door(&mut level, 600.0, OpenPolicy::All);
    for button in buttons {
        wire(&mut level, button, door);
    }
    level.set_exit_zone(690.0, FLOOR_Y - 80.0, 60.0, 80.0);
    level
}

/// A ledge reached by pushing a block, behind a long-hold door
fn long_press() -> Level {
    let mut level = room("#1a2430");
    level.add_platform(560.0, FLOOR_Y - 90.0, 220.0, 20.0);
    level.add_interactable(Interactable::movable_block(300.0, FLOOR_Y - 40.0, 40.0, 40.0));
    let button = floor_button(&mut level, 160.0, 2000);
    let door = floor_door(&mut level, 460.0, OpenPolicy::Any);
    wire(&mut level, button, door);
    level.set_exit_zone(680.0, FLOOR_Y - 170.0, 60.0, 80.0);
    level
}

/// Documents for the shipped levels, in play order
pub fn builtin_levels() -> Vec<LevelDocument> {
    [first_echo(), three_hands(), long_press()]
        .iter()
        .map(LevelDocument::from_level)
        .collect()
}
