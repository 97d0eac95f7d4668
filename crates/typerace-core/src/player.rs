//! Per-player typing progress within a room.

use serde::{Deserialize, Serialize};

use crate::PlayerId;

/// One player's live progress through the current race.
///
/// Reset to zero-state between rounds; `id`, `name`, and `joined_at`
/// survive the reset. Two invariants hold at all times:
///
/// - `finish_time` is `Some` if and only if `is_finished` is true, and it
///   is written exactly once per round ([`finish`](Self::finish) is
///   idempotent).
/// - `is_finished` is monotonic within a round: once true it never reverts
///   until an explicit reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSession {
    pub id: PlayerId,

    /// Display name; never empty (defaulted at join when absent).
    pub name: String,

    /// When the player joined the room (ms). Drives deterministic
    /// ownership transfer: the earliest joiner inherits the room.
    pub joined_at: u64,

    /// Total characters typed so far.
    #[serde(default)]
    pub input_chars: u32,

    /// How many of the typed characters match the race text.
    #[serde(default)]
    pub correct_chars: u32,

    /// Share of the race text typed, in `[0, 100]`.
    pub progress: f64,

    pub wpm: u32,

    /// Integer percentage in `[0, 100]`.
    pub accuracy: u8,

    pub is_finished: bool,

    /// Set once, on the first keystroke of the round.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<u64>,

    /// Set once, when `is_finished` flips to true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_time: Option<u64>,

    /// Fully-typed word count. Only tracked in sudden-death mode, where it
    /// is the ranking key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_words: Option<u32>,
}

impl PlayerSession {
    /// A fresh session with zero progress and perfect accuracy.
    pub fn new(id: PlayerId, name: impl Into<String>, joined_at: u64) -> Self {
        Self {
            id,
            name: name.into(),
            joined_at,
            input_chars: 0,
            correct_chars: 0,
            progress: 0.0,
            wpm: 0,
            accuracy: 100,
            is_finished: false,
            start_time: None,
            finish_time: None,
            completed_words: None,
        }
    }

    /// Clears all progress for a new round, keeping identity and join order.
    pub fn reset(&mut self) {
        *self = Self::new(self.id.clone(), self.name.clone(), self.joined_at);
    }

    /// Records the start of typing. Only the first call sticks.
    pub fn mark_started(&mut self, now: u64) {
        if self.start_time.is_none() {
            self.start_time = Some(now);
        }
    }

    /// Marks the player finished. Idempotent: a second call (a timer racing
    /// a final keystroke, or a duplicate observer) changes nothing.
    pub fn finish(&mut self, now: u64) {
        if !self.is_finished {
            self.is_finished = true;
            self.finish_time = Some(now);
        }
    }

    /// Seconds of typing so far, or 0 before the first keystroke.
    pub fn elapsed_secs(&self, now: u64) -> f64 {
        match self.start_time {
            Some(start) => now.saturating_sub(start) as f64 / 1000.0,
            None => 0.0,
        }
    }
}
