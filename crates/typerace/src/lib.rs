//! # TypeRace
//!
//! The core of a multiplayer typing-race game: shared rooms, live
//! keystroke progress, deterministic ranking and winner selection, and
//! persisted session records — everything except the pixels.
//!
//! Rooms run as isolated Tokio tasks owning their state; all mutations go
//! through a pure coordinator state machine, and storage only ever sees
//! well-formed snapshots through the [`KvStore`] boundary.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use typerace::prelude::*;
//!
//! # async fn run() -> Result<(), TypeRaceError> {
//! let store = Arc::new(MemoryStore::new());
//! let mut rooms = RoomManager::new(store);
//!
//! let code = rooms.create_room(
//!     PlayerId::new("alice"),
//!     "Alice",
//!     "",
//!     RoomConfig::default(),
//! )?;
//! rooms.join_room(PlayerId::new("bob"), "Bob", &code).await?;
//! rooms.start_game(&PlayerId::new("alice")).await?;
//! // ...route each player's keystrokes with rooms.apply_keystroke(...)
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::TypeRaceError;

pub use typerace_core::{
    metrics, now_ms, GameMode, InvalidRoomCode, Language, PlayerId, PlayerSession, RoomCode,
    RoomConfig, RoomState, RoomStatus,
};
pub use typerace_records::{LeaderboardEntry, SessionRecorder, TypingSessionRecord, UserStats};
pub use typerace_room::{
    coordinator, score, LeaveOutcome, RoomError, RoomHandle, RoomInfo, RoomManager,
};
pub use typerace_store::{KvStore, MemoryStore, StoreError, Subscription};
pub use typerace_text::{completed_words, TextStream, EXTEND_BATCH_WORDS};

/// The most commonly used types, in one import.
pub mod prelude {
    pub use crate::{
        GameMode, KvStore, Language, LeaveOutcome, MemoryStore, PlayerId, RoomCode, RoomConfig,
        RoomError, RoomManager, RoomState, RoomStatus, TypeRaceError,
    };
}
