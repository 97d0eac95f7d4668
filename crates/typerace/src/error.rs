//! Unified error type for the TypeRace core.

use typerace_room::RoomError;
use typerace_store::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `typerace` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute auto-generates `From` impls, so the `?` operator converts
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TypeRaceError {
    /// A room-level error (full, not found, permission, invalid state).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A storage-level error (bad path, bad merge target).
    #[error(transparent)]
    Store(#[from] StoreError),
}
