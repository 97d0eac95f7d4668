//! Error types for the room layer.

use typerace_core::{PlayerId, RoomCode};

/// Errors that can occur during room operations.
///
/// All of these are local, recoverable conditions: the operation is
/// rejected and the room state is left exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist (or was deleted concurrently).
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The room is full — no more player slots available.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// The player is already in a room (one room at a time).
    #[error("player {0} is already in a room")]
    AlreadyInRoom(PlayerId),

    /// The player is not in the room this operation targets.
    #[error("player {0} is not in the room")]
    NotInRoom(PlayerId),

    /// A non-owner attempted an owner-only action.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The room is in a state that doesn't allow this operation.
    /// For example, starting a room that's already playing.
    #[error("invalid room state for this operation: {0}")]
    InvalidState(String),

    /// The room's command channel is full or closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}
