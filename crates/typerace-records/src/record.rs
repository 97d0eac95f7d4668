//! Persisted record types: one finished session, per-user aggregates,
//! and leaderboard entries.

use serde::{Deserialize, Serialize};
use typerace_core::{GameMode, PlayerId, PlayerSession};

/// The durable result of one finished race, appended to the player's
/// session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingSessionRecord {
    pub wpm: u32,
    pub accuracy: u8,
    pub duration_seconds: f64,
    pub word_count: u32,
    pub mode: GameMode,
    pub timestamp: u64,
}

impl TypingSessionRecord {
    /// Builds a record from a finished session, or `None` for a player who
    /// never typed (force-finished at zero input — nothing worth keeping).
    pub fn from_session(player: &PlayerSession, mode: GameMode, now: u64) -> Option<Self> {
        let start = player.start_time?;
        let end = player.finish_time.unwrap_or(now);
        Some(Self {
            wpm: player.wpm,
            accuracy: player.accuracy,
            duration_seconds: end.saturating_sub(start) as f64 / 1000.0,
            // Sudden-death tracks whole words; elsewhere fall back to the
            // 5-chars-per-word convention over what was typed correctly.
            word_count: player.completed_words.unwrap_or(player.correct_chars / 5),
            mode,
            timestamp: now,
        })
    }

    /// Speed weighted by accuracy and by how much text was actually
    /// covered. The square root dampens the reward for racing a short
    /// burst fast versus typing more text accurately.
    pub fn competitive_score(&self) -> f64 {
        self.wpm as f64 * (self.accuracy as f64 / 100.0) * (self.word_count as f64).sqrt()
    }
}

/// Running aggregates over all of a player's recorded sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    pub total_tests: u64,
    pub average_wpm: f64,
    pub best_wpm: u32,
    pub average_accuracy: f64,
    pub best_accuracy: u8,
    pub total_words: u64,
    /// Seconds spent typing, summed across sessions.
    pub total_time_typing: f64,
    pub last_played: u64,
}

impl UserStats {
    /// Folds one more session into the running aggregates.
    pub fn fold(&mut self, record: &TypingSessionRecord) {
        self.total_tests += 1;
        let n = self.total_tests as f64;
        self.average_wpm += (record.wpm as f64 - self.average_wpm) / n;
        self.average_accuracy += (record.accuracy as f64 - self.average_accuracy) / n;
        self.best_wpm = self.best_wpm.max(record.wpm);
        self.best_accuracy = self.best_accuracy.max(record.accuracy);
        self.total_words += record.word_count as u64;
        self.total_time_typing += record.duration_seconds;
        self.last_played = record.timestamp;
    }
}

/// One row on a leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(rename = "userId")]
    pub player_id: PlayerId,
    #[serde(rename = "username")]
    pub name: String,
    pub wpm: u32,
    pub accuracy: u8,
    #[serde(rename = "wordCount")]
    pub word_count: u32,
    pub timestamp: u64,
}

impl LeaderboardEntry {
    pub fn new(player: &PlayerSession, record: &TypingSessionRecord) -> Self {
        Self {
            player_id: player.id.clone(),
            name: player.name.clone(),
            wpm: record.wpm,
            accuracy: record.accuracy,
            word_count: record.word_count,
            timestamp: record.timestamp,
        }
    }

    pub fn competitive_score(&self) -> f64 {
        self.wpm as f64 * (self.accuracy as f64 / 100.0) * (self.word_count as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished_player(wpm: u32, accuracy: u8) -> PlayerSession {
        let mut p = PlayerSession::new(PlayerId::new("p1"), "Alice", 0);
        p.mark_started(1_000);
        p.input_chars = 125;
        p.correct_chars = 125;
        p.wpm = wpm;
        p.accuracy = accuracy;
        p.finish(31_000);
        p
    }

    #[test]
    fn test_from_session() {
        let record =
            TypingSessionRecord::from_session(&finished_player(50, 96), GameMode::Words, 31_000)
                .unwrap();
        assert_eq!(record.wpm, 50);
        assert_eq!(record.accuracy, 96);
        assert_eq!(record.duration_seconds, 30.0);
        assert_eq!(record.word_count, 25);
        assert_eq!(record.timestamp, 31_000);
    }

    #[test]
    fn test_from_session_skips_idle_player() {
        let p = PlayerSession::new(PlayerId::new("p2"), "Idle", 0);
        assert!(TypingSessionRecord::from_session(&p, GameMode::Time, 5_000).is_none());
    }

    #[test]
    fn test_from_session_prefers_completed_words() {
        let mut p = finished_player(50, 96);
        p.completed_words = Some(17);
        let record =
            TypingSessionRecord::from_session(&p, GameMode::SuddenDeath, 31_000).unwrap();
        assert_eq!(record.word_count, 17);
    }

    #[test]
    fn test_competitive_score() {
        let record = TypingSessionRecord {
            wpm: 60,
            accuracy: 100,
            duration_seconds: 30.0,
            word_count: 50,
            mode: GameMode::Words,
            timestamp: 0,
        };
        let expected = 60.0 * (50.0_f64).sqrt();
        assert!((record.competitive_score() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_fold_running_aggregates() {
        let mut stats = UserStats::default();
        let mut record = TypingSessionRecord {
            wpm: 40,
            accuracy: 90,
            duration_seconds: 30.0,
            word_count: 20,
            mode: GameMode::Time,
            timestamp: 1_000,
        };
        stats.fold(&record);
        record.wpm = 60;
        record.accuracy = 100;
        record.timestamp = 2_000;
        stats.fold(&record);

        assert_eq!(stats.total_tests, 2);
        assert_eq!(stats.average_wpm, 50.0);
        assert_eq!(stats.average_accuracy, 95.0);
        assert_eq!(stats.best_wpm, 60);
        assert_eq!(stats.best_accuracy, 100);
        assert_eq!(stats.total_words, 40);
        assert_eq!(stats.total_time_typing, 60.0);
        assert_eq!(stats.last_played, 2_000);
    }

    #[test]
    fn test_stats_serde_field_names() {
        let stats = UserStats::default();
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("totalTests").is_some());
        assert!(json.get("bestWpm").is_some());
        assert!(json.get("totalTimeTyping").is_some());
    }
}
