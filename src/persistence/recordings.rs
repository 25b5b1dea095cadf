//! Recording history bundle
//!
//! Only the most recent recordings are kept on disk. When the bundle grows
//! too large, or the backend runs out of room, history is truncated and
//! finally cleared; the session never sees the failure.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::PersistenceError;
use crate::platform::{Storage, StorageError};
use crate::sim::recorder::Recording;

pub const RECORDINGS_KEY: &str = "paradox_recordings";

/// Recordings kept in a normal save
pub const MAX_PERSISTED_RECORDINGS: usize = 10;
/// Recordings kept once the bundle is oversized
pub const REDUCED_PERSISTED_RECORDINGS: usize = 5;
/// Bundle size that triggers the reduced save
pub const MAX_BUNDLE_BYTES: usize = 4 * 1024 * 1024;

/// Stored shape: `{recordings, timestamp}`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordingBundle {
    pub recordings: Vec<Recording>,
    /// Wall-clock save time (ms since epoch)
    #[serde(default)]
    pub timestamp: f64,
}

#[derive(Serialize)]
struct BundleRef<'a> {
    recordings: Vec<&'a Recording>,
    timestamp: f64,
}

fn encode_tail(recordings: &[Rc<Recording>], keep: usize, timestamp: f64) -> Result<String, serde_json::Error> {
    let start = recordings.len().saturating_sub(keep);
    serde_json::to_string(&BundleRef {
        recordings: recordings[start..].iter().map(|r| r.as_ref()).collect(),
        timestamp,
    })
}

/// Write the newest recordings, shrinking the bundle if it is oversized
pub fn try_save_recordings(
    storage: &mut dyn Storage,
    recordings: &[Rc<Recording>],
    keep: usize,
    timestamp: f64,
) -> Result<usize, PersistenceError> {
    let mut kept = keep.min(recordings.len());
    let mut json = encode_tail(recordings, kept, timestamp)?;
    if json.len() > MAX_BUNDLE_BYTES && kept > REDUCED_PERSISTED_RECORDINGS {
        log::warn!(
            "Recording bundle is {} bytes, keeping only the last {}",
            json.len(),
            REDUCED_PERSISTED_RECORDINGS
        );
        kept = REDUCED_PERSISTED_RECORDINGS.min(recordings.len());
        json = encode_tail(recordings, kept, timestamp)?;
    }
    storage.set_item(RECORDINGS_KEY, &json)?;
    Ok(kept)
}

/// Persist recording history, degrading instead of failing
///
/// Returns how many recordings ended up stored.
pub fn save_recordings(
    storage: &mut dyn Storage,
    recordings: &[Rc<Recording>],
    timestamp: f64,
) -> usize {
    match try_save_recordings(storage, recordings, MAX_PERSISTED_RECORDINGS, timestamp) {
        Ok(kept) => return kept,
        Err(e) => log::warn!("Failed to save recordings, retrying smaller: {}", e),
    }

    match try_save_recordings(storage, recordings, REDUCED_PERSISTED_RECORDINGS, timestamp) {
        Ok(kept) => return kept,
        Err(e) => log::error!("Failed to save reduced recordings, clearing: {}", e),
    }

    if let Err(e) = clear_recordings(storage) {
        log::error!("Failed to clear recordings: {}", e);
    }
    0
}

pub fn try_load_recordings(storage: &dyn Storage) -> Result<Option<RecordingBundle>, PersistenceError> {
    let Some(json) = storage.get_item(RECORDINGS_KEY)? else {
        return Ok(None);
    };
    Ok(Some(serde_json::from_str(&json)?))
}

/// Load saved recordings; anything unreadable counts as none
pub fn load_recordings(storage: &dyn Storage) -> Vec<Recording> {
    match try_load_recordings(storage) {
        Ok(Some(bundle)) => {
            log::info!("Loaded {} saved recordings", bundle.recordings.len());
            bundle.recordings
        }
        Ok(None) => Vec::new(),
        Err(e) => {
            log::warn!("Ignoring saved recordings: {}", e);
            Vec::new()
        }
    }
}

/// Drop persisted history
pub fn clear_recordings(storage: &mut dyn Storage) -> Result<(), StorageError> {
    storage.remove_item(RECORDINGS_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;
    use crate::sim::geometry::Vec2;
    use crate::sim::recorder::Frame;

    fn recording(start_time: u64, frames: usize) -> Rc<Recording> {
        let mut rec = Recording::new(start_time);
        for i in 0..frames {
            rec.push(Frame {
                timestamp: i as u64 * 16,
                position: Vec2::new(i as f32, 500.0),
                velocity: Vec2::ZERO,
                on_ground: true,
                is_active: true,
                interactions: Vec::new(),
            });
        }
        Rc::new(rec)
    }

    #[test]
    fn test_keeps_last_ten() {
        let mut storage = MemoryStorage::new();
        let history: Vec<_> = (0..12).map(|i| recording(i, 3)).collect();

        assert_eq!(save_recordings(&mut storage, &history, 1.0), 10);
        let loaded = load_recordings(&storage);
        assert_eq!(loaded.len(), 10);
        assert_eq!(loaded[0].start_time, 2);
        assert_eq!(loaded[9].start_time, 11);
    }

    #[test]
    fn test_quota_truncates_then_clears() {
        let history: Vec<_> = (0..10).map(|i| recording(i, 20)).collect();
        let five = encode_tail(&history, 5, 1.0).unwrap();
        let ten = encode_tail(&history, 10, 1.0).unwrap();

        // Room for five recordings but not ten
        let quota = RECORDINGS_KEY.len() + (five.len() + ten.len()) / 2;
        let mut storage = MemoryStorage::with_quota(quota);
        assert_eq!(save_recordings(&mut storage, &history, 1.0), 5);
        assert_eq!(load_recordings(&storage).len(), 5);

        // No room at all: storage ends up without a bundle
        let mut storage = MemoryStorage::with_quota(8);
        assert_eq!(save_recordings(&mut storage, &history, 1.0), 0);
        assert!(load_recordings(&storage).is_empty());
    }

    #[test]
    fn test_corrupt_bundle_loads_empty() {
        let mut storage = MemoryStorage::new();
        storage.set_item(RECORDINGS_KEY, "{\"recordings\": [1, 2").unwrap();
        assert!(load_recordings(&storage).is_empty());
        assert!(try_load_recordings(&storage).is_err());
    }

    #[test]
    fn test_bundle_shape() {
        let mut storage = MemoryStorage::new();
        save_recordings(&mut storage, &[recording(0, 1)], 42.0);
        let json: serde_json::Value =
            serde_json::from_str(&storage.get_item(RECORDINGS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(json["timestamp"], 42.0);
        assert_eq!(json["recordings"][0]["frames"][0]["onGround"], true);
        assert_eq!(json["recordings"][0]["startTime"], 0);
    }
}
