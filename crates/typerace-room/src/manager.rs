//! Room manager: creates, tracks, and routes players to rooms.

use std::collections::HashMap;
use std::sync::Arc;

use typerace_core::{now_ms, PlayerId, PlayerSession, RoomCode, RoomConfig, RoomState};
use typerace_store::KvStore;

use crate::room::{spawn_room, LeaveOutcome, RoomHandle, RoomInfo};
use crate::RoomError;

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Manages all active rooms and tracks which player is in which room.
///
/// This is the entry point for room operations from the client-facing
/// layer. One invariant does the heavy lifting: a player is in at most
/// ONE room at a time.
pub struct RoomManager<S> {
    store: Arc<S>,

    /// Active rooms, keyed by their shareable code.
    rooms: HashMap<RoomCode, RoomHandle>,

    /// Maps each player to the room they're currently in.
    player_rooms: HashMap<PlayerId, RoomCode>,
}

impl<S: KvStore + 'static> RoomManager<S> {
    /// Creates a new, empty room manager writing through `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
        }
    }

    /// Creates a room owned by `owner`, seats them, and returns the code.
    ///
    /// The room name defaults to `"<owner>'s Room"` when blank.
    pub fn create_room(
        &mut self,
        owner: PlayerId,
        owner_name: &str,
        room_name: &str,
        config: RoomConfig,
    ) -> Result<RoomCode, RoomError> {
        if self.player_rooms.contains_key(&owner) {
            return Err(RoomError::AlreadyInRoom(owner));
        }

        let code = self.fresh_code();
        let owner_name = if owner_name.trim().is_empty() {
            "Player".to_owned()
        } else {
            owner_name.trim().to_owned()
        };
        let room_name = if room_name.trim().is_empty() {
            format!("{owner_name}'s Room")
        } else {
            room_name.trim().to_owned()
        };

        let session = PlayerSession::new(owner.clone(), owner_name, now_ms());
        let handle = spawn_room(
            code.clone(),
            room_name,
            session,
            config,
            self.store.clone(),
            DEFAULT_CHANNEL_SIZE,
        );
        self.rooms.insert(code.clone(), handle);
        self.player_rooms.insert(owner, code.clone());
        tracing::info!(room = %code, "room created");
        Ok(code)
    }

    /// Adds a player to the room with the given code, enforcing the
    /// one-room-at-a-time invariant. Returns the snapshot to render.
    pub async fn join_room(
        &mut self,
        player_id: PlayerId,
        name: &str,
        code: &RoomCode,
    ) -> Result<RoomState, RoomError> {
        // Rejoining the same room (a reconnecting client) is allowed.
        if let Some(current) = self.player_rooms.get(&player_id) {
            if current != code {
                return Err(RoomError::AlreadyInRoom(player_id));
            }
        }

        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        let state = handle.join(player_id.clone(), name.to_owned()).await?;
        self.player_rooms.insert(player_id, code.clone());
        Ok(state)
    }

    /// Removes a player from their current room. When the last player
    /// leaves, the room is destroyed and forgotten.
    pub async fn leave_room(&mut self, player_id: &PlayerId) -> Result<LeaveOutcome, RoomError> {
        let code = self
            .player_rooms
            .get(player_id)
            .cloned()
            .ok_or_else(|| RoomError::NotInRoom(player_id.clone()))?;

        let outcome = match self.rooms.get(&code) {
            Some(handle) => handle.leave(player_id.clone()).await?,
            None => LeaveOutcome::RoomDestroyed,
        };
        self.player_rooms.remove(player_id);

        if outcome == LeaveOutcome::RoomDestroyed {
            self.rooms.remove(&code);
            self.player_rooms.retain(|_, c| *c != code);
            tracing::info!(room = %code, "room destroyed");
        }
        Ok(outcome)
    }

    /// Owner-only: removes `target` from the requester's room (waiting
    /// rooms only).
    pub async fn kick(
        &mut self,
        requester: &PlayerId,
        target: &PlayerId,
    ) -> Result<(), RoomError> {
        let handle = self.handle_for(requester)?;
        handle.kick(requester.clone(), target.clone()).await?;
        self.player_rooms.remove(target);
        Ok(())
    }

    /// Owner-only: starts the race in the requester's room.
    pub async fn start_game(&self, requester: &PlayerId) -> Result<(), RoomError> {
        self.handle_for(requester)?.start(requester.clone()).await
    }

    /// Owner-only: resets the requester's room for another round.
    pub async fn restart(&self, requester: &PlayerId) -> Result<(), RoomError> {
        self.handle_for(requester)?
            .restart(requester.clone())
            .await
    }

    /// Routes a progress report to the player's room (fire-and-forget).
    pub async fn apply_keystroke(
        &self,
        player_id: &PlayerId,
        input_chars: u32,
        correct_chars: u32,
    ) -> Result<(), RoomError> {
        self.handle_for(player_id)?
            .keystroke(player_id.clone(), input_chars, correct_chars)
            .await
    }

    /// The current snapshot of a room.
    pub async fn room_state(&self, code: &RoomCode) -> Result<RoomState, RoomError> {
        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        handle.state().await
    }

    /// Lists rooms still gathering players, for the lobby. Rooms that
    /// fail to respond (shutting down) are silently skipped.
    pub async fn list_rooms(&self) -> Vec<RoomInfo> {
        let mut infos = Vec::with_capacity(self.rooms.len());
        for handle in self.rooms.values() {
            if let Ok(info) = handle.info().await {
                if info.status == typerace_core::RoomStatus::Waiting {
                    infos.push(info);
                }
            }
        }
        infos
    }

    /// The room a player is currently in, if any.
    pub fn player_room(&self, player_id: &PlayerId) -> Option<&RoomCode> {
        self.player_rooms.get(player_id)
    }

    /// Number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Shuts down a room and removes all its players from the index.
    pub async fn destroy_room(&mut self, code: &RoomCode) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .remove(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let _ = handle.shutdown().await;
        self.player_rooms.retain(|_, c| c != code);
        tracing::info!(room = %code, "room destroyed");
        Ok(())
    }

    fn handle_for(&self, player_id: &PlayerId) -> Result<&RoomHandle, RoomError> {
        let code = self
            .player_rooms
            .get(player_id)
            .ok_or_else(|| RoomError::NotInRoom(player_id.clone()))?;
        self.rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))
    }

    /// Draws codes until one is unused. Collisions are vanishingly rare
    /// (36^6 codes), so this almost never loops.
    fn fresh_code(&self) -> RoomCode {
        let mut rng = rand::rng();
        loop {
            let code = RoomCode::generate(&mut rng);
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }
}
