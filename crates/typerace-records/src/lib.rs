//! Session records and leaderboards for TypeRace.
//!
//! The boundary component between a finished race and durable storage:
//! converts a finished [`PlayerSession`](typerace_core::PlayerSession)
//! into a [`TypingSessionRecord`], folds it into the player's running
//! [`UserStats`], and publishes [`LeaderboardEntry`] rows.

mod record;
mod recorder;

pub use record::{LeaderboardEntry, TypingSessionRecord, UserStats};
pub use recorder::SessionRecorder;
