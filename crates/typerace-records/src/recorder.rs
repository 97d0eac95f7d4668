//! Writes finished sessions through the store: session log, running
//! aggregates, leaderboards.

use std::sync::Arc;

use serde_json::{Map, Value};
use typerace_core::{GameMode, PlayerSession};
use typerace_store::{KvStore, StoreError};

use crate::{LeaderboardEntry, TypingSessionRecord, UserStats};

/// Persists the results of finished player sessions.
///
/// Three effects per recorded session:
/// 1. append the record to `userStats/<id>/sessions`,
/// 2. merge the recomputed aggregates into `userStats/<id>`,
/// 3. publish a leaderboard entry — always to the rolling daily board,
///    and to the all-time board only when the new competitive score beats
///    the player's stored best.
pub struct SessionRecorder<S> {
    store: Arc<S>,
}

impl<S: KvStore> SessionRecorder<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Records one finished session. Returns the record, or `None` for a
    /// player who never typed this round.
    pub async fn record(
        &self,
        player: &PlayerSession,
        mode: GameMode,
        now: u64,
    ) -> Result<Option<TypingSessionRecord>, StoreError> {
        let Some(record) = TypingSessionRecord::from_session(player, mode, now) else {
            tracing::debug!(player = %player.id, "no keystrokes this round, skipping record");
            return Ok(None);
        };

        let stats_path = format!("userStats/{}", player.id);

        self.store
            .push(&format!("{stats_path}/sessions"), to_json(&record))
            .await?;

        let mut stats: UserStats = self
            .store
            .get(&stats_path)
            .await?
            .map(|v| serde_json::from_value(v).unwrap_or_default())
            .unwrap_or_default();
        stats.fold(&record);
        let mut fields = to_fields(&stats);
        fields.insert("username".to_owned(), Value::String(player.name.clone()));
        self.store.update(&stats_path, fields).await?;

        let entry = LeaderboardEntry::new(player, &record);
        self.store
            .push("leaderboard/daily", to_json(&entry))
            .await?;
        self.publish_all_time(&entry).await?;

        tracing::info!(
            player = %player.id,
            wpm = record.wpm,
            accuracy = record.accuracy,
            words = record.word_count,
            "session recorded"
        );
        Ok(Some(record))
    }

    /// The all-time board keeps one entry per player: their best run by
    /// competitive score.
    async fn publish_all_time(&self, entry: &LeaderboardEntry) -> Result<(), StoreError> {
        let path = format!("leaderboard/alltime/{}", entry.player_id);
        let previous_best = self
            .store
            .get(&path)
            .await?
            .and_then(|v| serde_json::from_value::<LeaderboardEntry>(v).ok())
            .map(|e| e.competitive_score());

        match previous_best {
            Some(best) if entry.competitive_score() <= best => Ok(()),
            _ => self.store.set(&path, to_json(entry)).await,
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn to_fields<T: serde::Serialize>(value: &T) -> Map<String, Value> {
    match to_json(value) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
