//! Room actor: an isolated Tokio task that owns one room's state.
//!
//! Every mutation of a room flows through its actor's command channel, so
//! the coordinator always sees a consistent snapshot and is the single
//! writer of room-level fields — which is what makes text extension and
//! the finished transition race-free without locks. The actor also runs
//! the 1 Hz countdown for time-mode races and executes the coordinator's
//! side-effect intents: persisting through the store, generating text,
//! recording finished sessions.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map, Value};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};
use typerace_core::{
    now_ms, GameMode, PlayerId, PlayerSession, RoomCode, RoomConfig, RoomState, RoomStatus,
};
use typerace_records::SessionRecorder;
use typerace_store::KvStore;
use typerace_text::TextStream;

use crate::coordinator::{self, Effect};
use crate::RoomError;

/// What happened when a player left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The player left; nothing else changed.
    Left,
    /// The departing player owned the room; this player inherited it.
    OwnershipTransferred(PlayerId),
    /// The last player left; the room was deleted.
    RoomDestroyed,
}

/// A snapshot of room metadata for lobby listings.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub name: String,
    pub status: RoomStatus,
    pub player_count: usize,
    pub max_players: usize,
}

/// Commands sent to a room actor through its channel.
///
/// Operations with results carry a `oneshot` reply channel. Keystrokes
/// don't: progress reports are fire-and-forget, and rejected ones are
/// logged rather than surfaced.
pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        name: String,
        reply: oneshot::Sender<Result<RoomState, RoomError>>,
    },
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<LeaveOutcome, RoomError>>,
    },
    Kick {
        requester: PlayerId,
        target: PlayerId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Start {
        requester: PlayerId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Restart {
        requester: PlayerId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Keystroke {
        player_id: PlayerId,
        input_chars: u32,
        correct_chars: u32,
    },
    State {
        reply: oneshot::Sender<RoomState>,
    },
    Info {
        reply: oneshot::Sender<RoomInfo>,
    },
    Shutdown,
}

/// Handle to a running room actor. Cheap to clone — an `mpsc::Sender`
/// wrapper. The `RoomManager` holds one per room.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Joins a player, returning the room snapshot they should render.
    pub async fn join(&self, player_id: PlayerId, name: String) -> Result<RoomState, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            player_id,
            name,
            reply: reply_tx,
        })
        .await?;
        self.recv(reply_rx).await?
    }

    pub async fn leave(&self, player_id: PlayerId) -> Result<LeaveOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Leave {
            player_id,
            reply: reply_tx,
        })
        .await?;
        self.recv(reply_rx).await?
    }

    pub async fn kick(&self, requester: PlayerId, target: PlayerId) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Kick {
            requester,
            target,
            reply: reply_tx,
        })
        .await?;
        self.recv(reply_rx).await?
    }

    pub async fn start(&self, requester: PlayerId) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Start {
            requester,
            reply: reply_tx,
        })
        .await?;
        self.recv(reply_rx).await?
    }

    pub async fn restart(&self, requester: PlayerId) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Restart {
            requester,
            reply: reply_tx,
        })
        .await?;
        self.recv(reply_rx).await?
    }

    /// Reports a player's typing progress (fire-and-forget).
    pub async fn keystroke(
        &self,
        player_id: PlayerId,
        input_chars: u32,
        correct_chars: u32,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Keystroke {
            player_id,
            input_chars,
            correct_chars,
        })
        .await
    }

    /// The current full room snapshot.
    pub async fn state(&self) -> Result<RoomState, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::State { reply: reply_tx }).await?;
        self.recv(reply_rx).await
    }

    /// Lightweight metadata for lobby listings.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Info { reply: reply_tx }).await?;
        self.recv(reply_rx).await
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    async fn recv<T>(&self, rx: oneshot::Receiver<T>) -> Result<T, RoomError> {
        rx.await.map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

/// The internal room actor. Runs inside a Tokio task.
struct RoomActor<S> {
    state: RoomState,
    stream: TextStream,
    store: Arc<S>,
    recorder: SessionRecorder<S>,
    receiver: mpsc::Receiver<RoomCommand>,
    destroyed: bool,
}

impl<S: KvStore + 'static> RoomActor<S> {
    async fn run(mut self) {
        tracing::info!(room = %self.state.code, "room actor started");
        self.persist_room().await;

        let mut clock = time::interval(Duration::from_secs(1));
        clock.set_missed_tick_behavior(MissedTickBehavior::Delay);
        clock.reset();

        loop {
            // Evaluated before the select borrows the receiver.
            let ticking = self.ticking();
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => {
                        if self.handle_command(cmd, &mut clock).await {
                            break;
                        }
                    }
                    None => break,
                },
                _ = clock.tick(), if ticking => {
                    self.handle_tick().await;
                }
            }
        }

        tracing::info!(room = %self.state.code, "room actor stopped");
    }

    /// The countdown only runs for a time-mode race in flight.
    fn ticking(&self) -> bool {
        self.state.config.mode == GameMode::Time && self.state.status == RoomStatus::Playing
    }

    /// Processes one command. Returns `true` when the actor should stop.
    async fn handle_command(
        &mut self,
        cmd: RoomCommand,
        clock: &mut time::Interval,
    ) -> bool {
        let now = now_ms();
        match cmd {
            RoomCommand::Join {
                player_id,
                name,
                reply,
            } => {
                let result = coordinator::join(&mut self.state, player_id.clone(), &name, now);
                let result = match result {
                    Ok(effects) => {
                        self.run_effects(effects).await;
                        tracing::info!(
                            room = %self.state.code,
                            player = %player_id,
                            players = self.state.players.len(),
                            "player joined"
                        );
                        Ok(self.state.clone())
                    }
                    Err(err) => {
                        tracing::debug!(room = %self.state.code, player = %player_id, %err, "join rejected");
                        Err(err)
                    }
                };
                let _ = reply.send(result);
            }
            RoomCommand::Leave { player_id, reply } => {
                let owner_before = self.state.created_by.clone();
                let result = match coordinator::leave(&mut self.state, &player_id, now) {
                    Ok(effects) => {
                        let outcome = if effects.contains(&Effect::DeleteRoom) {
                            LeaveOutcome::RoomDestroyed
                        } else if self.state.created_by != owner_before {
                            LeaveOutcome::OwnershipTransferred(self.state.created_by.clone())
                        } else {
                            LeaveOutcome::Left
                        };
                        self.run_effects(effects).await;
                        tracing::info!(
                            room = %self.state.code,
                            player = %player_id,
                            players = self.state.players.len(),
                            outcome = ?outcome,
                            "player left"
                        );
                        Ok(outcome)
                    }
                    Err(err) => Err(err),
                };
                let _ = reply.send(result);
            }
            RoomCommand::Kick {
                requester,
                target,
                reply,
            } => {
                let result = match coordinator::kick(&mut self.state, &requester, &target, now) {
                    Ok(effects) => {
                        self.run_effects(effects).await;
                        tracing::info!(room = %self.state.code, player = %target, by = %requester, "player kicked");
                        Ok(())
                    }
                    Err(err) => Err(err),
                };
                let _ = reply.send(result);
            }
            RoomCommand::Start { requester, reply } => {
                let result = match coordinator::start_game(&mut self.state, &requester, now) {
                    Ok(effects) => {
                        self.run_effects(effects).await;
                        // A full first second on the countdown.
                        clock.reset();
                        tracing::info!(room = %self.state.code, mode = %self.state.config.mode, "race started");
                        Ok(())
                    }
                    Err(err) => Err(err),
                };
                let _ = reply.send(result);
            }
            RoomCommand::Restart { requester, reply } => {
                let result = match coordinator::restart(&mut self.state, &requester, now) {
                    Ok(effects) => {
                        self.run_effects(effects).await;
                        tracing::info!(room = %self.state.code, "room reset for a new round");
                        Ok(())
                    }
                    Err(err) => Err(err),
                };
                let _ = reply.send(result);
            }
            RoomCommand::Keystroke {
                player_id,
                input_chars,
                correct_chars,
            } => {
                let was_finished = self.state.status == RoomStatus::Finished;
                match coordinator::apply_keystroke(
                    &mut self.state,
                    &player_id,
                    input_chars,
                    correct_chars,
                    now,
                ) {
                    Ok(effects) => {
                        let finished =
                            !was_finished && self.state.status == RoomStatus::Finished;
                        self.run_effects(effects).await;
                        if finished {
                            tracing::info!(
                                room = %self.state.code,
                                winner = ?self.state.winner,
                                "race finished"
                            );
                        }
                    }
                    Err(err) => {
                        tracing::debug!(
                            room = %self.state.code,
                            player = %player_id,
                            %err,
                            "keystroke rejected"
                        );
                    }
                }
            }
            RoomCommand::State { reply } => {
                let _ = reply.send(self.state.clone());
            }
            RoomCommand::Info { reply } => {
                let _ = reply.send(RoomInfo {
                    code: self.state.code.clone(),
                    name: self.state.name.clone(),
                    status: self.state.status,
                    player_count: self.state.players.len(),
                    max_players: self.state.config.max_players,
                });
            }
            RoomCommand::Shutdown => {
                tracing::info!(room = %self.state.code, "room shutting down");
                // The room ceases to exist: drop the persisted record so
                // subscribers see the deletion.
                if let Err(err) = self.store.remove(&self.room_path()).await {
                    tracing::warn!(room = %self.state.code, %err, "failed to delete room");
                }
                return true;
            }
        }
        self.destroyed
    }

    async fn handle_tick(&mut self) {
        let was_finished = self.state.status == RoomStatus::Finished;
        match coordinator::tick(&mut self.state, now_ms()) {
            Ok(effects) => {
                let finished = !was_finished && self.state.status == RoomStatus::Finished;
                self.run_effects(effects).await;
                if finished {
                    tracing::info!(
                        room = %self.state.code,
                        winner = ?self.state.winner,
                        "time up, race finished"
                    );
                }
            }
            Err(err) => {
                tracing::warn!(room = %self.state.code, %err, "tick rejected");
            }
        }
    }

    /// Executes the coordinator's side-effect intents, in order. Storage
    /// failures are logged, not propagated: the in-memory state machine
    /// stays authoritative and the next write converges.
    async fn run_effects(&mut self, effects: Vec<Effect>) {
        let now = now_ms();
        for effect in effects {
            match effect {
                Effect::PersistRoom => self.persist_room().await,
                Effect::PersistPlayer(id) => self.persist_player(&id).await,
                Effect::ExtendText => {
                    let chunk = self.stream.batch();
                    self.state.extend_text(&chunk);
                    tracing::debug!(
                        room = %self.state.code,
                        text_len = self.state.text.len(),
                        "race text extended"
                    );
                    let mut fields = Map::new();
                    fields.insert("text".to_owned(), Value::String(self.state.text.clone()));
                    if let Err(err) = self.store.update(&self.room_path(), fields).await {
                        tracing::warn!(room = %self.state.code, %err, "failed to persist text");
                    }
                }
                Effect::RegenerateText { word_count } => {
                    let text = self.stream.generate(word_count);
                    self.state.reset_text(text);
                }
                Effect::RecordSession(id) => {
                    if let Some(player) = self.state.player(&id) {
                        let mode = self.state.config.mode;
                        if let Err(err) = self.recorder.record(player, mode, now).await {
                            tracing::warn!(
                                room = %self.state.code,
                                player = %id,
                                %err,
                                "failed to record session"
                            );
                        }
                    }
                }
                Effect::DeleteRoom => {
                    if let Err(err) = self.store.remove(&self.room_path()).await {
                        tracing::warn!(room = %self.state.code, %err, "failed to delete room");
                    }
                    self.destroyed = true;
                }
            }
        }
    }

    fn room_path(&self) -> String {
        format!("rooms/{}", self.state.code)
    }

    async fn persist_room(&self) {
        let value = match serde_json::to_value(&self.state) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(room = %self.state.code, %err, "failed to serialize room");
                return;
            }
        };
        if let Err(err) = self.store.set(&self.room_path(), value).await {
            tracing::warn!(room = %self.state.code, %err, "failed to persist room");
        }
    }

    /// Persists one player's progress as a merge-patch — the same write
    /// shape clients of the original schema expect to watch.
    async fn persist_player(&self, id: &PlayerId) {
        let Some(p) = self.state.player(id) else {
            return;
        };
        let mut fields = Map::new();
        fields.insert("progress".to_owned(), json!(p.progress));
        fields.insert("wpm".to_owned(), json!(p.wpm));
        fields.insert("accuracy".to_owned(), json!(p.accuracy));
        fields.insert("isFinished".to_owned(), json!(p.is_finished));
        if let Some(t) = p.start_time {
            fields.insert("startTime".to_owned(), json!(t));
        }
        if let Some(t) = p.finish_time {
            fields.insert("finishTime".to_owned(), json!(t));
        }
        if let Some(w) = p.completed_words {
            fields.insert("completedWords".to_owned(), json!(w));
        }
        let path = format!("{}/players/{}", self.room_path(), id);
        if let Err(err) = self.store.update(&path, fields).await {
            tracing::warn!(room = %self.state.code, player = %id, %err, "failed to persist player");
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
///
/// The owner is seated immediately; the initial race text is generated
/// here, sized by the room's mode.
pub(crate) fn spawn_room<S: KvStore + 'static>(
    code: RoomCode,
    name: String,
    owner: PlayerSession,
    config: RoomConfig,
    store: Arc<S>,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let mut stream = TextStream::new(config.language);
    let text = stream.generate(config.initial_word_count());
    let now = owner.joined_at;
    let state = RoomState::create(code.clone(), name, owner, config, text, now);
    let recorder = SessionRecorder::new(store.clone());

    let actor = RoomActor {
        state,
        stream,
        store,
        recorder,
        receiver: rx,
        destroyed: false,
    };
    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
