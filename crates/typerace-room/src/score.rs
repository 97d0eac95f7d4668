//! Scoring and ranking: the live leaderboard order and final winner
//! selection.
//!
//! Both computations are deterministic over a room snapshot, so two
//! observers racing to evaluate the same finished room always produce the
//! same winner — duplicate writes converge instead of conflicting.

use std::cmp::Ordering;

use typerace_core::{GameMode, PlayerId, PlayerSession, RoomState};

/// The live leaderboard order for a room.
///
/// Sudden-death ranks by completed words, descending, with ties left in
/// join order. Every other mode puts finished players first (earlier
/// finish ranks higher) and orders the rest by progress, descending.
pub fn live_ranking(room: &RoomState) -> Vec<&PlayerSession> {
    let mut players: Vec<&PlayerSession> = room.players.values().collect();
    // Stable base order, so "ties unbroken" still means the same thing on
    // every client: join order, then id.
    players.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then_with(|| a.id.cmp(&b.id)));

    match room.config.mode {
        GameMode::SuddenDeath => {
            players.sort_by(|a, b| {
                b.completed_words
                    .unwrap_or(0)
                    .cmp(&a.completed_words.unwrap_or(0))
            });
        }
        GameMode::Time | GameMode::Words => {
            players.sort_by(|a, b| match (a.is_finished, b.is_finished) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (true, true) => a.finish_time.cmp(&b.finish_time),
                (false, false) => b
                    .progress
                    .partial_cmp(&a.progress)
                    .unwrap_or(Ordering::Equal),
            });
        }
    }
    players
}

/// The final score used once, at the `playing → finished` transition.
///
/// `wpm * (accuracy / 100) * sqrt(effective_words)`: sustained speed and
/// accuracy over more text beats a short cherry-picked burst — the square
/// root dampens the short-text incentive without erasing the difference.
/// When completed words weren't tracked, `progress / 10` (at least 1)
/// stands in as a rough word-coverage estimate.
pub fn final_score(player: &PlayerSession) -> f64 {
    let effective_words = player
        .completed_words
        .unwrap_or_else(|| ((player.progress / 10.0).floor() as u32).max(1));
    player.wpm as f64 * (player.accuracy as f64 / 100.0) * (effective_words as f64).sqrt()
}

/// Picks the winner among finished players: highest score, ties broken by
/// earliest finish, then lowest id. Returns `None` if nobody finished.
pub fn select_winner(room: &RoomState) -> Option<PlayerId> {
    room.players
        .values()
        .filter(|p| p.is_finished)
        .max_by(|a, b| {
            final_score(a)
                .partial_cmp(&final_score(b))
                .unwrap_or(Ordering::Equal)
                // max_by keeps the greater element, so the *earlier*
                // finish and the *smaller* id must compare greater.
                .then_with(|| b.finish_time.cmp(&a.finish_time))
                .then_with(|| b.id.cmp(&a.id))
        })
        .map(|p| p.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use typerace_core::{PlayerId, RoomCode, RoomConfig};

    fn player(id: &str, joined_at: u64) -> PlayerSession {
        PlayerSession::new(PlayerId::new(id), id.to_owned(), joined_at)
    }

    fn room_with(mode: GameMode, players: Vec<PlayerSession>) -> RoomState {
        let mut iter = players.into_iter();
        let owner = iter.next().expect("at least one player");
        let mut room = RoomState::create(
            RoomCode::parse("SCORES").unwrap(),
            "scores",
            owner,
            RoomConfig {
                mode,
                ..RoomConfig::default()
            },
            "one two three".to_owned(),
            0,
        );
        for p in iter {
            room.players.insert(p.id.clone(), p);
        }
        room
    }

    #[test]
    fn test_live_ranking_finished_above_unfinished() {
        let mut a = player("a", 1);
        a.progress = 90.0;
        let mut b = player("b", 2);
        b.progress = 40.0;
        b.finish(5_000);
        let mut c = player("c", 3);
        c.progress = 70.0;

        let room = room_with(GameMode::Words, vec![a, b, c]);
        let order: Vec<&str> = live_ranking(&room).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_live_ranking_finishers_by_finish_time() {
        let mut a = player("a", 1);
        a.finish(9_000);
        let mut b = player("b", 2);
        b.finish(4_000);

        let room = room_with(GameMode::Time, vec![a, b]);
        let order: Vec<&str> = live_ranking(&room).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn test_live_ranking_sudden_death_by_completed_words() {
        let mut a = player("a", 1);
        a.completed_words = Some(3);
        let mut b = player("b", 2);
        b.completed_words = Some(9);
        let c = player("c", 3); // never typed: no completed words

        let room = room_with(GameMode::SuddenDeath, vec![a, b, c]);
        let order: Vec<&str> = live_ranking(&room).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_final_score_fallback_estimate() {
        let mut p = player("a", 1);
        p.wpm = 60;
        p.accuracy = 100;
        p.progress = 54.0;
        // floor(54 / 10) = 5 effective words.
        assert!((final_score(&p) - 60.0 * 5.0_f64.sqrt()).abs() < 1e-9);

        p.progress = 3.0;
        // Estimate never drops below one word.
        assert!((final_score(&p) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_winner_accuracy_beats_raw_speed() {
        // A: 60 wpm at 100% over 50 words ≈ 424.3.
        // B: 80 wpm at  70% over 50 words ≈ 395.9.
        let mut a = player("a", 1);
        a.wpm = 60;
        a.accuracy = 100;
        a.completed_words = Some(50);
        a.finish(9_000);
        let mut b = player("b", 2);
        b.wpm = 80;
        b.accuracy = 70;
        b.completed_words = Some(50);
        b.finish(8_000);

        let room = room_with(GameMode::SuddenDeath, vec![a, b]);
        assert_eq!(select_winner(&room), Some(PlayerId::new("a")));
    }

    #[test]
    fn test_winner_tie_broken_by_earlier_finish() {
        let mut a = player("a", 1);
        a.wpm = 60;
        a.accuracy = 100;
        a.completed_words = Some(50);
        a.finish(9_000);
        let mut b = player("b", 2);
        b.wpm = 60;
        b.accuracy = 100;
        b.completed_words = Some(50);
        b.finish(8_000);

        let room = room_with(GameMode::SuddenDeath, vec![a, b]);
        assert_eq!(select_winner(&room), Some(PlayerId::new("b")));
    }

    #[test]
    fn test_winner_ignores_unfinished() {
        let mut a = player("a", 1);
        a.wpm = 200;
        a.accuracy = 100;
        a.progress = 99.0;
        let mut b = player("b", 2);
        b.wpm = 10;
        b.accuracy = 50;
        b.finish(5_000);

        let room = room_with(GameMode::Words, vec![a, b]);
        assert_eq!(select_winner(&room), Some(PlayerId::new("b")));
    }

    #[test]
    fn test_no_winner_without_finishers() {
        let room = room_with(GameMode::Words, vec![player("a", 1)]);
        assert_eq!(select_winner(&room), None);
    }
}
