//! Identity newtypes: players and room codes.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PlayerId
// ---------------------------------------------------------------------------

/// A stable, opaque player identifier.
///
/// Supplied by the external identity layer (an account id); the core never
/// inspects it beyond equality, hashing, and ordering. Ordering matters: it
/// is the final tie-break wherever the coordinator must pick one player
/// deterministically (ownership transfer, winner ties).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// RoomCode
// ---------------------------------------------------------------------------

/// Characters a room code may contain. No lowercase: codes are shouted
/// across a room or pasted into chat, so they normalize to uppercase.
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of every room code.
const CODE_LEN: usize = 6;

/// A short, human-shareable room identifier (6 uppercase alphanumerics).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

/// Error returned when parsing a malformed room code.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid room code {0:?}: expected {CODE_LEN} letters or digits")]
pub struct InvalidRoomCode(pub String);

impl RoomCode {
    /// Generates a fresh random code. Uniqueness is the caller's problem —
    /// the room manager retries until the code is unused.
    pub fn generate(rng: &mut impl Rng) -> Self {
        let code: String = (0..CODE_LEN)
            .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
            .collect();
        Self(code)
    }

    /// Parses user input into a code, trimming whitespace and normalizing
    /// to uppercase so `"ab12cd "` and `"AB12CD"` name the same room.
    pub fn parse(input: &str) -> Result<Self, InvalidRoomCode> {
        let code = input.trim().to_ascii_uppercase();
        if code.len() == CODE_LEN && code.bytes().all(|b| CODE_CHARSET.contains(&b)) {
            Ok(Self(code))
        } else {
            Err(InvalidRoomCode(input.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
