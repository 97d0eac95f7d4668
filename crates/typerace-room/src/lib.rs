//! Room lifecycle for TypeRace.
//!
//! Each room runs as an isolated Tokio task (actor model) owning its
//! [`RoomState`](typerace_core::RoomState). All mutations funnel through
//! the pure [`coordinator`] state machine, which returns side-effect
//! intents the actor executes: persisting through the store, extending
//! the race text, recording finished sessions.
//!
//! # Key types
//!
//! - [`coordinator`] — the state machine (events in, effects out)
//! - [`score`] — live ranking and winner selection
//! - [`RoomManager`] — creates/destroys rooms, routes players
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`RoomError`] — rejected operations

mod error;
mod manager;
mod room;

pub mod coordinator;
pub mod score;

pub use error::RoomError;
pub use manager::RoomManager;
pub use room::{LeaveOutcome, RoomHandle, RoomInfo};
