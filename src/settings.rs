//! Game settings and tuning
//!
//! Persisted separately from recordings in LocalStorage. Every field has a
//! default so older or partial saves still load.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::ms_to_ticks;
use crate::platform::Storage;

/// Physics constants applied by the resolver, all per tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub gravity: f32,
    /// Horizontal velocity multiplier while grounded
    pub friction: f32,
    pub jump_velocity: f32,
    pub player_speed: f32,
    pub world_width: f32,
    pub world_height: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            friction: FRICTION,
            jump_velocity: JUMP_VELOCITY,
            player_speed: PLAYER_SPEED,
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Length of one loop window
    pub loop_duration_ms: u32,
    /// Record every Nth tick (1 = every tick)
    pub record_interval: u32,
    /// Oldest ghosts are discarded beyond this many
    pub max_ghosts: usize,
    /// Pause on the completion screen before the next level loads
    pub level_complete_delay_ms: u32,
    pub physics: PhysicsTuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            loop_duration_ms: LOOP_DURATION_MS,
            record_interval: 1,
            max_ghosts: MAX_GHOSTS,
            level_complete_delay_ms: LEVEL_COMPLETE_DELAY_MS,
            physics: PhysicsTuning::default(),
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "paradox_settings";

    /// Ticks in one loop window
    pub fn loop_ticks(&self) -> u32 {
        ms_to_ticks(self.loop_duration_ms).max(1)
    }

    /// Ticks spent on the completion screen
    pub fn level_complete_ticks(&self) -> u32 {
        ms_to_ticks(self.level_complete_delay_ms)
    }

    /// Load settings, falling back to defaults on missing or corrupt data
    pub fn load(storage: &dyn Storage) -> Self {
        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from storage");
                    return settings;
                }
                Err(e) => log::warn!("Corrupt settings, using defaults: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Settings unavailable: {}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings (best effort)
    pub fn save(&self, storage: &mut dyn Storage) {
        match serde_json::to_string(self) {
            Ok(json) => match storage.set_item(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Failed to save settings: {}", e),
            },
            Err(e) => log::warn!("Failed to encode settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;

    #[test]
    fn test_default_ticks() {
        let settings = Settings::default();
        assert_eq!(settings.loop_ticks(), 600);
        assert_eq!(settings.level_complete_ticks(), 120);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item("paradox_settings", r#"{"loop_duration_ms": 5000}"#)
            .unwrap();
        let settings = Settings::load(&storage);
        assert_eq!(settings.loop_duration_ms, 5000);
        assert_eq!(settings.max_ghosts, MAX_GHOSTS);
        assert_eq!(settings.physics, PhysicsTuning::default());
    }

    #[test]
    fn test_corrupt_settings_fall_back() {
        let mut storage = MemoryStorage::new();
        storage.set_item("paradox_settings", "{not json").unwrap();
        assert_eq!(Settings::load(&storage), Settings::default());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut storage = MemoryStorage::new();
        let settings = Settings {
            record_interval: 2,
            ..Default::default()
        };
        settings.save(&mut storage);
        assert_eq!(Settings::load(&storage), settings);
    }
}
