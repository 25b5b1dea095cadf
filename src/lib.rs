//! Paradox Protocol - A time-loop puzzle platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, interactables, recording, ghost replay, loop lifecycle)
//! - `persistence`: Level documents and recording bundles
//! - `platform`: Browser/native platform abstraction (storage, input, clock)
//! - `settings`: Data-driven loop and physics tuning
//! - `progress`: Fewest-loops records per level
//! - `levels`: Built-in level set

pub mod levels;
pub mod persistence;
pub mod platform;
pub mod progress;
pub mod settings;
pub mod sim;

pub use progress::LevelRecords;
pub use settings::{PhysicsTuning, Settings};

/// Game configuration constants
pub mod consts {
    /// Simulation rate (ticks per second)
    pub const SIM_HZ: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World dimensions (canvas edges act as solid walls)
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;

    /// Physics, all per tick
    pub const GRAVITY: f32 = 0.4;
    pub const FRICTION: f32 = 0.85;
    pub const JUMP_VELOCITY: f32 = -10.0;
    pub const PLAYER_SPEED: f32 = 2.5;

    /// Player body
    pub const PLAYER_WIDTH: f32 = 30.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;
    /// Interaction bounds grow by this much on every side
    pub const INTERACTION_MARGIN: f32 = 25.0;

    /// Loop window
    pub const LOOP_DURATION_MS: u32 = 10_000;
    /// Pause between a completed level and the next one
    pub const LEVEL_COMPLETE_DELAY_MS: u32 = 2_000;

    /// Button defaults
    pub const BUTTON_WIDTH: f32 = 40.0;
    pub const BUTTON_HEIGHT: f32 = 20.0;
    pub const BUTTON_PRESS_DEPTH: f32 = 5.0;
    pub const BUTTON_HOLD_TIME_MS: u32 = 100;
    /// Hold time accumulated per activating tick (approximate frame time)
    pub const HOLD_INCREMENT_MS: u32 = 16;

    /// Door defaults
    pub const DOOR_WIDTH: f32 = 20.0;
    pub const DOOR_HEIGHT: f32 = 100.0;
    pub const DOOR_SPEED: f32 = 3.0;

    /// Movable block defaults
    pub const BLOCK_SIZE: f32 = 40.0;
    pub const BLOCK_PUSH_SPEED: f32 = 2.0;
    pub const BLOCK_DAMPING: f32 = 0.9;

    /// Recording and ghost limits
    pub const MAX_RECORDING_FRAMES: usize = 1800;
    pub const MAX_GHOSTS: usize = 15;
    pub const GHOST_ALPHA: f32 = 0.5;
}

/// Convert a duration in milliseconds to whole simulation ticks (rounded up)
#[inline]
pub fn ms_to_ticks(ms: u32) -> u32 {
    (ms as u64 * consts::SIM_HZ as u64).div_ceil(1000) as u32
}

/// Convert a tick count to simulated milliseconds
#[inline]
pub fn ticks_to_ms(ticks: u64) -> u64 {
    ticks * 1000 / consts::SIM_HZ as u64
}

/// Format milliseconds as `MM:SS` for the loop timer
pub fn format_time(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
