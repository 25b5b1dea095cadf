//! Save/load persistence
//!
//! Features:
//! - Portable level documents (editor export/import format)
//! - Recording history bundle with size-based truncation
//! - A single custom level slot
//!
//! Everything the session calls inline degrades and logs instead of
//! returning errors; the `try_*` variants report what went wrong.

pub mod document;
pub mod recordings;

use thiserror::Error;

use crate::platform::{Storage, StorageError};

pub use document::{DOCUMENT_VERSION, InteractableDoc, LevelDocument};
pub use recordings::{RecordingBundle, load_recordings, save_recordings};

/// Storage key of the custom level slot
pub const CUSTOM_LEVEL_KEY: &str = "customLevel";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Store a level in the custom slot
pub fn save_custom_level(storage: &mut dyn Storage, doc: &LevelDocument) -> Result<(), PersistenceError> {
    storage.set_item(CUSTOM_LEVEL_KEY, &doc.to_json()?)?;
    log::info!("Custom level saved");
    Ok(())
}

/// Read the custom slot; missing or corrupt data counts as empty
pub fn load_custom_level(storage: &dyn Storage) -> Option<LevelDocument> {
    let json = match storage.get_item(CUSTOM_LEVEL_KEY) {
        Ok(json) => json?,
        Err(e) => {
            log::warn!("Custom level unavailable: {}", e);
            return None;
        }
    };
    match LevelDocument::from_json(&json) {
        Ok(doc) => Some(doc),
        Err(e) => {
            log::warn!("Ignoring corrupt custom level: {}", e);
            None
        }
    }
}
