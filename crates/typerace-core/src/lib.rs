//! Shared data model for the TypeRace core.
//!
//! Everything that describes a race lives here: identities, game modes,
//! per-player typing sessions, the room aggregate, and the pure typing
//! metrics. The coordinator crate mutates these types; this crate only
//! defines them and their invariants.
//!
//! # Key types
//!
//! - [`PlayerId`] / [`RoomCode`] — identity newtypes
//! - [`GameMode`] / [`RoomConfig`] — race configuration
//! - [`PlayerSession`] — one player's live typing progress
//! - [`RoomState`] / [`RoomStatus`] — the room aggregate and its lifecycle
//! - [`metrics`] — words-per-minute and accuracy

mod ids;
pub mod metrics;
mod mode;
mod player;
mod room;

pub use ids::{InvalidRoomCode, PlayerId, RoomCode};
pub use mode::{GameMode, Language, RoomConfig};
pub use player::PlayerSession;
pub use room::{RoomState, RoomStatus};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// The coordinator never calls this itself — callers sample the clock and
/// pass the timestamp in, so every state transition is replayable in tests.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
