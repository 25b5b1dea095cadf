//! Level records
//!
//! Persisted to storage, tracks the fewest loops each level was solved in.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::platform::Storage;

/// A single level's best completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelRecord {
    /// Fewest loops needed (1 = solved without ghosts)
    pub best_loops: u32,
    /// Number of times the level was completed
    pub completions: u32,
}

/// Per-level records keyed by level index
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelRecords {
    pub levels: BTreeMap<usize, LevelRecord>,
}

impl LevelRecords {
    /// Storage key
    const STORAGE_KEY: &'static str = "paradox_level_records";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, level: usize) -> Option<&LevelRecord> {
        self.levels.get(&level)
    }

    pub fn best_loops(&self, level: usize) -> Option<u32> {
        self.get(level).map(|r| r.best_loops)
    }

    /// Record a completion; returns true when it beats the previous best
    pub fn record(&mut self, level: usize, loops: u32) -> bool {
        match self.levels.get_mut(&level) {
            Some(record) => {
                record.completions += 1;
                if loops < record.best_loops {
                    record.best_loops = loops;
                    true
                } else {
                    false
                }
            }
            None => {
                self.levels.insert(
                    level,
                    LevelRecord {
                        best_loops: loops,
                        completions: 1,
                    },
                );
                true
            }
        }
    }

    /// Check if no level has been completed yet
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn completed_levels(&self) -> usize {
        self.levels.len()
    }

    /// Load records, starting fresh on missing or corrupt data
    pub fn load(storage: &dyn Storage) -> Self {
        if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
            match serde_json::from_str::<LevelRecords>(&json) {
                Ok(records) => {
                    log::info!("Loaded records for {} levels", records.levels.len());
                    return records;
                }
                Err(e) => log::warn!("Corrupt level records: {}", e),
            }
        }

        log::info!("No level records found, starting fresh");
        Self::new()
    }

    /// Save records (best effort)
    pub fn save(&self, storage: &mut dyn Storage) {
        let Ok(json) = serde_json::to_string(self) else {
            return;
        };
        match storage.set_item(Self::STORAGE_KEY, &json) {
            Ok(()) => log::info!("Level records saved ({} levels)", self.levels.len()),
            Err(e) => log::warn!("Failed to save level records: {}", e),
        }
    }
}
