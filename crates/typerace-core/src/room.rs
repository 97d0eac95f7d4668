//! The room aggregate and its lifecycle state machine.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{PlayerId, PlayerSession, RoomCode, RoomConfig};

// ---------------------------------------------------------------------------
// RoomStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// The cycle is strict — no skipping states:
///
/// ```text
/// waiting → playing → finished → waiting (restart, looping)
/// ```
///
/// - **Waiting**: room exists, players gather, nobody types yet.
/// - **Playing**: the race is live; keystrokes and (in time mode) the
///   countdown mutate player sessions.
/// - **Finished**: every player is done and a winner is recorded. Only an
///   owner restart leaves this state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

impl RoomStatus {
    /// The single legal successor in the cycle.
    pub fn next(self) -> Self {
        match self {
            Self::Waiting => Self::Playing,
            Self::Playing => Self::Finished,
            Self::Finished => Self::Waiting,
        }
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == target
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Playing => write!(f, "playing"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The full state of one room: race text, configuration, membership, and
/// lifecycle. This is the unit of persistence — the whole struct is the
/// value stored at `rooms/<code>`.
///
/// Invariants maintained by the coordinator:
///
/// - `text` is append-only while a round is in progress: player character
///   offsets index into it, so the prefix never changes under them.
/// - `winner` is `Some` iff `status == Finished`.
/// - `created_by` names a present player whenever `players` is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomState {
    pub code: RoomCode,

    /// Display name, e.g. `"Alice's Room"`.
    pub name: String,

    /// The shared race text: words separated by single spaces.
    pub text: String,

    #[serde(flatten)]
    pub config: RoomConfig,

    pub status: RoomStatus,

    #[serde(default)]
    pub players: HashMap<PlayerId, PlayerSession>,

    /// Current room owner. Transfers when the owner leaves.
    pub created_by: PlayerId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<PlayerId>,

    pub created_at: u64,

    /// Seconds left on the countdown. Meaningful only in time mode while
    /// `status == Playing`.
    #[serde(default)]
    pub remaining_secs: u32,
}

impl RoomState {
    /// Builds a fresh room in `Waiting` with the owner already seated.
    /// Seeding the owner keeps the `created_by ∈ players` invariant
    /// unconditional.
    pub fn create(
        code: RoomCode,
        name: impl Into<String>,
        owner: PlayerSession,
        config: RoomConfig,
        text: String,
        now: u64,
    ) -> Self {
        let created_by = owner.id.clone();
        let mut players = HashMap::new();
        players.insert(owner.id.clone(), owner);
        Self {
            code,
            name: name.into(),
            text,
            config,
            status: RoomStatus::Waiting,
            players,
            created_by,
            winner: None,
            created_at: now,
            remaining_secs: 0,
        }
    }

    pub fn player(&self, id: &PlayerId) -> Option<&PlayerSession> {
        self.players.get(id)
    }

    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut PlayerSession> {
        self.players.get_mut(id)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.config.max_players
    }

    /// True when the room is non-empty and every player is done — the
    /// predicate behind the `playing → finished` transition.
    pub fn all_finished(&self) -> bool {
        !self.players.is_empty() && self.players.values().all(|p| p.is_finished)
    }

    /// Appends a chunk of words to the race text. Append-only by
    /// construction: the existing prefix is untouched.
    pub fn extend_text(&mut self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        self.text.push(' ');
        self.text.push_str(chunk);
    }

    /// Replaces the race text wholesale. Legal only between rounds
    /// (restart); the coordinator never calls this mid-race.
    pub fn reset_text(&mut self, text: String) {
        self.text = text;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> RoomState {
        let owner = PlayerSession::new(PlayerId::new("owner"), "Owner", 0);
        RoomState::create(
            RoomCode::parse("AAAAAA").unwrap(),
            "Owner's Room",
            owner,
            RoomConfig::default(),
            "alpha beta gamma".to_owned(),
            0,
        )
    }

    #[test]
    fn test_status_cycle() {
        assert_eq!(RoomStatus::Waiting.next(), RoomStatus::Playing);
        assert_eq!(RoomStatus::Playing.next(), RoomStatus::Finished);
        assert_eq!(RoomStatus::Finished.next(), RoomStatus::Waiting);
    }

    #[test]
    fn test_can_transition_to() {
        assert!(RoomStatus::Waiting.can_transition_to(RoomStatus::Playing));
        assert!(!RoomStatus::Waiting.can_transition_to(RoomStatus::Finished));
        assert!(RoomStatus::Finished.can_transition_to(RoomStatus::Waiting));
        assert!(!RoomStatus::Playing.can_transition_to(RoomStatus::Waiting));
    }

    #[test]
    fn test_create_seats_owner() {
        let room = room();
        assert_eq!(room.status, RoomStatus::Waiting);
        assert_eq!(room.players.len(), 1);
        assert!(room.players.contains_key(&room.created_by));
        assert_eq!(room.winner, None);
    }

    #[test]
    fn test_extend_text_is_append_only() {
        let mut room = room();
        let before = room.text.clone();
        room.extend_text("delta epsilon");
        assert!(room.text.starts_with(&before));
        assert_eq!(room.text, "alpha beta gamma delta epsilon");

        // Empty chunk must not introduce a trailing space.
        let before = room.text.clone();
        room.extend_text("");
        assert_eq!(room.text, before);
    }

    #[test]
    fn test_all_finished() {
        let mut room = room();
        assert!(!room.all_finished());
        for p in room.players.values_mut() {
            p.finish(10);
        }
        assert!(room.all_finished());

        room.players.clear();
        assert!(!room.all_finished(), "empty room is never all-finished");
    }

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&RoomStatus::Waiting).unwrap(),
            "\"waiting\""
        );
    }

    #[test]
    fn test_room_serializes_flat_config() {
        let room = room();
        let json = serde_json::to_value(&room).unwrap();
        // Config fields sit at the top level of the persisted record.
        assert_eq!(json["mode"], serde_json::json!("time"));
        assert_eq!(json["maxPlayers"], serde_json::json!(5));
        assert_eq!(json["createdBy"], serde_json::json!("owner"));
        assert_eq!(json["status"], serde_json::json!("waiting"));
    }
}
