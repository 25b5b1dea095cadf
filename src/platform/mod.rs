//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (LocalStorage on web, in-memory elsewhere)
//! - Keyboard input mapped to logical actions
//! - Wall-clock time for persistence metadata

pub mod input;
pub mod storage;
pub mod time;

pub use input::{Action, InputState};
pub use storage::{MemoryStorage, Storage, StorageError};
pub use time::now_ms;

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
