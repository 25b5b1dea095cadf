//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (platforms, then interactables by index; player, then ghosts oldest first)
//! - Recorded time is simulated time, never the wall clock
//! - No rendering or platform dependencies beyond the storage trait

pub mod body;
pub mod collision;
pub mod geometry;
pub mod ghost;
pub mod interactable;
pub mod level;
pub mod player;
pub mod recorder;
pub mod state;
pub mod tick;

pub use body::PhysicsBody;
pub use collision::{Axis, BodyRef, CollisionWorld, Contact, clamp_to_world, resolve_collision};
pub use geometry::{Rect, Vec2};
pub use ghost::Ghost;
pub use interactable::{
    ActorId, Interactable, InteractableKind, InteractableType, InteractableView, InteractionState,
    OpenPolicy,
};
pub use level::{Level, LevelError, Selection};
pub use player::{Player, PlayerSnapshot};
pub use recorder::{ActionRecorder, Frame, InteractionRecord, Recording};
pub use state::{GamePhase, Session, SessionEvent};
pub use tick::{TickInput, tick};
