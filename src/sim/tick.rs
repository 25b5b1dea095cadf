//! Fixed timestep simulation tick
//!
//! Core game loop that advances the session deterministically. The order of
//! the playing steps is part of the game's behavior: ghosts replay what the
//! recorder captured, so moving a step changes what every later loop sees.

use serde::{Deserialize, Serialize};

use super::interactable::ActorId;
use super::state::{GamePhase, Session};
use crate::ticks_to_ms;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    /// Interact with buttons and blocks in range
    pub interact: bool,
    /// Discard the current loop and start it again
    pub restart_loop: bool,
    /// Drop every ghost and go back to loop 1
    pub reset_all: bool,
    /// Jump to the next level
    pub skip_level: bool,
}

impl TickInput {
    /// Horizontal direction: -1, 0 or 1
    pub fn move_axis(&self) -> f32 {
        let mut axis = 0.0;
        if self.move_left {
            axis -= 1.0;
        }
        if self.move_right {
            axis += 1.0;
        }
        axis
    }
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut Session, input: &TickInput) {
    if input.reset_all {
        if session.phase == GamePhase::GameCompleted {
            session.restart_game();
        } else {
            session.reset_all_loops();
        }
        return;
    }
    if input.restart_loop {
        session.restart_current_loop();
        return;
    }
    if session.phase == GamePhase::GameCompleted {
        return;
    }
    if input.skip_level {
        if session.has_next_level() {
            log::info!("Skipping level {}", session.level_index + 1);
            session.next_level();
            return;
        }
        log::debug!("Skip ignored on the last level");
    }

    session.time_ticks += 1;

    match session.phase {
        GamePhase::Playing => step_loop(session, input),
        GamePhase::LevelCompleted { advance_in_ticks } => {
            if advance_in_ticks <= 1 {
                session.next_level();
            } else {
                session.phase = GamePhase::LevelCompleted {
                    advance_in_ticks: advance_in_ticks - 1,
                };
            }
        }
        GamePhase::GameCompleted => {}
    }
}

/// One tick of a running loop
fn step_loop(session: &mut Session, input: &TickInput) {
    let tuning = session.settings.physics;

    // Live player
    session.player.handle_input(input, &tuning);
    session
        .collision
        .update_body(&mut session.player.body, &session.level, &tuning, None);

    // Interactions: player first, then ghosts oldest to newest
    session.level.clear_interactions();
    if input.interact && session.player.is_active {
        session.level.interact_actor(
            ActorId::Player,
            &session.player.interaction_bounds(),
            session.player.center(),
        );
    }
    for ghost in session.ghosts.iter().filter(|g| g.is_active) {
        session
            .level
            .interact_actor(ghost.id(), &ghost.interaction_bounds(), ghost.center());
    }
    session.level.update_interactables();

    // Blocks
    session.level.update_dynamics(&session.collision, &tuning);

    if session.level.check_win_condition(session.player.center()) {
        session.complete_level();
        return;
    }

    let interactions = session.level.interactions_of(ActorId::Player);
    let timestamp = ticks_to_ms(u64::from(session.loop_ticks));
    session
        .recorder
        .record_frame(&session.player.snapshot(), interactions, timestamp);

    for ghost in &mut session.ghosts {
        ghost.update();
    }

    session.loop_ticks += 1;
    if session.loop_ticks >= session.settings.loop_ticks() {
        session.end_current_loop();
    }
}
