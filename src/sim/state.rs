//! Session state and loop lifecycle
//!
//! The session is the single owner of everything a tick mutates: the level,
//! the live player, the ghost roster and the recorder. Hosts drive it with
//! `tick()` and read it back for drawing.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::collision::CollisionWorld;
use super::ghost::Ghost;
use super::level::{DEFAULT_SPAWN, Level};
use super::player::Player;
use super::recorder::ActionRecorder;
use crate::persistence::{self, LevelDocument};
use crate::platform::{Storage, now_ms};
use crate::progress::LevelRecords;
use crate::settings::Settings;
use crate::ticks_to_ms;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Loop running
    Playing,
    /// Level solved, next level loads when the countdown ends
    LevelCompleted { advance_in_ticks: u32 },
    /// Last level solved
    GameCompleted,
}

/// Lifecycle notifications for the host (HUD, sounds, logs)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    LoopStarted { loop_number: u32 },
    LoopEnded { loop_number: u32, ghost_spawned: bool },
    LoopRestarted { loop_number: u32 },
    LoopsReset,
    LevelLoaded { index: usize },
    LevelCompleted { index: usize, loops: u32, new_best: bool },
    GameCompleted,
}

pub struct Session {
    pub settings: Settings,
    levels: Vec<LevelDocument>,
    /// Index of the current level in `levels`
    pub level_index: usize,
    pub level: Level,
    pub collision: CollisionWorld,
    pub player: Player,
    /// Oldest first
    pub ghosts: VecDeque<Ghost>,
    pub recorder: ActionRecorder,
    /// 1-based loop counter
    pub current_loop: u32,
    /// Ticks elapsed in the current loop
    pub loop_ticks: u32,
    /// Ticks elapsed since the session started
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub records: LevelRecords,
    storage: Box<dyn Storage>,
    events: Vec<SessionEvent>,
}

impl Session {
    /// Start a session on the first level
    pub fn new(levels: Vec<LevelDocument>, settings: Settings, storage: Box<dyn Storage>) -> Self {
        let records = LevelRecords::load(storage.as_ref());
        let mut session = Self {
            recorder: ActionRecorder::new(settings.record_interval),
            settings,
            levels,
            level_index: 0,
            level: Level::new(),
            collision: CollisionWorld::default(),
            player: Player::new(DEFAULT_SPAWN),
            ghosts: VecDeque::new(),
            current_loop: 1,
            loop_ticks: 0,
            time_ticks: 0,
            phase: GamePhase::Playing,
            records,
            storage,
            events: Vec::new(),
        };

        if !session.load_level(0) {
            log::warn!("No levels available, starting in a blank room");
            let tuning = session.settings.physics;
            session.apply_level(Level::new_blank(tuning.world_width, tuning.world_height));
        }
        session
    }

    /// Load settings, records and recording history from storage, then start
    pub fn from_storage(levels: Vec<LevelDocument>, storage: Box<dyn Storage>) -> Self {
        let settings = Settings::load(storage.as_ref());
        let mut session = Self::new(levels, settings, storage);
        let history = persistence::load_recordings(session.storage.as_ref());
        session.recorder.restore_history(history);
        session
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn has_next_level(&self) -> bool {
        self.level_index + 1 < self.levels.len()
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn storage_mut(&mut self) -> &mut dyn Storage {
        self.storage.as_mut()
    }

    /// Milliseconds left in the current loop
    pub fn remaining_ms(&self) -> u64 {
        u64::from(self.settings.loop_duration_ms).saturating_sub(ticks_to_ms(u64::from(self.loop_ticks)))
    }

    /// Take queued lifecycle events
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    /// Replace the level wholesale and start over at loop 1
    fn install_level(&mut self, level: Level) {
        self.level = level;
        self.collision = CollisionWorld::from_level(&self.level);
        self.recorder.clear_recordings();
        self.ghosts.clear();
        self.current_loop = 1;
        self.phase = GamePhase::Playing;
        self.start_new_loop();
    }

    /// Switch to a level from the catalogue; false if the index is out of range
    pub fn load_level(&mut self, index: usize) -> bool {
        let Some(doc) = self.levels.get(index) else {
            log::warn!("Level {} does not exist ({} levels)", index, self.levels.len());
            return false;
        };
        let level = doc.to_level();
        self.level_index = index;
        log::info!(
            "Loaded level {} ({} platforms, {} interactables)",
            index + 1,
            level.platforms.len(),
            level.interactables.len()
        );
        self.emit(SessionEvent::LevelLoaded { index });
        self.install_level(level);
        true
    }

    /// Advance to the next level, or finish the game after the last one
    pub fn next_level(&mut self) {
        if !self.load_level(self.level_index + 1) {
            self.finish_game();
        }
    }

    /// Play an edited level in place of the current one
    pub fn apply_level(&mut self, level: Level) {
        log::info!("Applying edited level");
        self.install_level(level);
    }

    /// Reset actors and objects and begin recording a fresh loop
    pub fn start_new_loop(&mut self) {
        self.loop_ticks = 0;
        self.player.respawn(self.level.player_spawn);
        self.level.reset();
        // Stage every ghost on its first frame for the loop's first tick
        for ghost in &mut self.ghosts {
            ghost.reset();
            ghost.update();
        }
        self.recorder.start_recording(ticks_to_ms(self.time_ticks));
        log::info!("Loop {} started with {} ghosts", self.current_loop, self.ghosts.len());
        self.emit(SessionEvent::LoopStarted {
            loop_number: self.current_loop,
        });
    }

    /// Timer expiry: freeze this loop into a ghost and start the next
    pub fn end_current_loop(&mut self) {
        let finished = self.current_loop;
        let recording = self
            .recorder
            .stop_recording()
            .and_then(|index| self.recorder.recording(index))
            .filter(|recording| !recording.is_empty());

        let ghost_spawned = match recording {
            Some(recording) => {
                log::debug!("Ghost of loop {} spawned ({} frames)", finished, recording.len());
                self.ghosts.push_back(Ghost::new(recording, finished));
                true
            }
            None => {
                log::warn!("Loop {} left no recording, no ghost spawned", finished);
                false
            }
        };

        while self.ghosts.len() > self.settings.max_ghosts {
            if let Some(evicted) = self.ghosts.pop_front() {
                log::debug!("Evicted ghost of loop {}", evicted.loop_number);
            }
        }

        self.current_loop += 1;
        persistence::save_recordings(self.storage.as_mut(), self.recorder.recordings(), now_ms());

        log::info!("Loop {} ended", finished);
        self.emit(SessionEvent::LoopEnded {
            loop_number: finished,
            ghost_spawned,
        });
        self.start_new_loop();
    }

    /// Throw away the loop in progress and start it again
    pub fn restart_current_loop(&mut self) {
        self.recorder.discard_recording();
        self.phase = GamePhase::Playing;
        log::info!("Loop {} restarted", self.current_loop);
        self.emit(SessionEvent::LoopRestarted {
            loop_number: self.current_loop,
        });
        self.start_new_loop();
    }

    /// Forget every ghost and recording and go back to loop 1
    pub fn reset_all_loops(&mut self) {
        self.recorder.clear_recordings();
        self.ghosts.clear();
        self.current_loop = 1;
        self.phase = GamePhase::Playing;
        persistence::save_recordings(self.storage.as_mut(), self.recorder.recordings(), now_ms());
        log::info!("All loops reset");
        self.emit(SessionEvent::LoopsReset);
        self.start_new_loop();
    }

    /// Exit reached with every door open
    pub fn complete_level(&mut self) {
        self.recorder.discard_recording();
        let index = self.level_index;
        let loops = self.current_loop;
        let new_best = self.records.record(index, loops);
        if new_best {
            self.records.save(self.storage.as_mut());
        }
        log::info!("Level {} completed in {} loops", index + 1, loops);
        self.emit(SessionEvent::LevelCompleted {
            index,
            loops,
            new_best,
        });

        if self.has_next_level() {
            self.phase = GamePhase::LevelCompleted {
                advance_in_ticks: self.settings.level_complete_ticks(),
            };
        } else {
            self.finish_game();
        }
    }

    fn finish_game(&mut self) {
        self.recorder.discard_recording();
        self.phase = GamePhase::GameCompleted;
        log::info!("All levels completed");
        self.emit(SessionEvent::GameCompleted);
    }

    /// From the completion screen back to the first level
    pub fn restart_game(&mut self) {
        if !self.load_level(0) {
            log::warn!("No first level to restart from");
        }
    }
}
