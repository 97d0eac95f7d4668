//! The room state machine: every mutation of a [`RoomState`] funnels
//! through here.
//!
//! Each operation takes the current state, an explicit `now` timestamp
//! (milliseconds), and returns the [`Effect`]s the caller must execute —
//! persistence, text generation, session recording. The functions never
//! touch a clock, a store, or a random source themselves, which keeps
//! every transition replayable in tests.
//!
//! Failures are all-or-nothing: an `Err` means the state was not touched.
//! Two races deserve care and get it here rather than in callers:
//!
//! - The `playing → finished` transition is guarded by a check on the
//!   current status, and winner selection is deterministic over the
//!   snapshot, so duplicate concurrent evaluations write the same value.
//! - A keystroke arriving after a player was force-finished (or after the
//!   whole room finished) is a silent no-op — the earlier finish is
//!   authoritative.

use typerace_core::{metrics, GameMode, PlayerId, PlayerSession, RoomState, RoomStatus};

use crate::RoomError;

/// When a player has typed past this share of the text, another batch of
/// words is appended (modes with open-ended text only).
pub const EXTEND_THRESHOLD: f64 = 0.8;

/// A side effect the caller must carry out after a successful transition.
///
/// The room actor is the single executor, which is what makes text
/// extension at-most-once per threshold crossing: nobody else appends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Persist the whole room snapshot.
    PersistRoom,
    /// Persist one player's progress fields (merge-patch).
    PersistPlayer(PlayerId),
    /// Append one batch of words to the race text.
    ExtendText,
    /// Replace the race text for a new round.
    RegenerateText { word_count: u32 },
    /// Record this player's finished session.
    RecordSession(PlayerId),
    /// The last player left: delete the room from storage.
    DeleteRoom,
}

/// Adds a player with a fresh session. Allowed in any status — a
/// late joiner starts at zero progress and cannot affect an already
/// finished round. Rejoining replaces the old session.
pub fn join(
    room: &mut RoomState,
    id: PlayerId,
    name: &str,
    now: u64,
) -> Result<Vec<Effect>, RoomError> {
    if room.is_full() && !room.players.contains_key(&id) {
        return Err(RoomError::RoomFull(room.code.clone()));
    }

    let name = if name.trim().is_empty() {
        default_name(&id)
    } else {
        name.trim().to_owned()
    };
    room.players
        .insert(id.clone(), PlayerSession::new(id.clone(), name, now));

    // First player in (or a vacated owner slot): the seat is theirs.
    if !room.players.contains_key(&room.created_by) {
        room.created_by = id;
    }

    Ok(vec![Effect::PersistRoom])
}

/// Removes a player. The last player out deletes the room; a departing
/// owner hands the room to the earliest remaining joiner.
pub fn leave(room: &mut RoomState, id: &PlayerId, _now: u64) -> Result<Vec<Effect>, RoomError> {
    if room.players.remove(id).is_none() {
        return Err(RoomError::NotInRoom(id.clone()));
    }

    if room.players.is_empty() {
        return Ok(vec![Effect::DeleteRoom]);
    }

    if room.created_by == *id {
        room.created_by = next_owner(room);
    }

    // A departing straggler must not strand the rest in `playing`.
    let mut effects = maybe_finish(room);
    if !effects.contains(&Effect::PersistRoom) {
        effects.push(Effect::PersistRoom);
    }
    Ok(effects)
}

/// Owner-only removal of another player, allowed only before the race
/// starts.
pub fn kick(
    room: &mut RoomState,
    requester: &PlayerId,
    target: &PlayerId,
    now: u64,
) -> Result<Vec<Effect>, RoomError> {
    if *requester != room.created_by {
        return Err(RoomError::PermissionDenied(
            "only the room owner can kick players".to_owned(),
        ));
    }
    if target == requester {
        return Err(RoomError::InvalidState(
            "the owner cannot kick themselves".to_owned(),
        ));
    }
    if room.status != RoomStatus::Waiting {
        return Err(RoomError::InvalidState(
            "cannot kick while a race is in progress".to_owned(),
        ));
    }
    leave(room, target, now)
}

/// Owner-only `waiting → playing` transition. Arms the countdown in time
/// mode.
pub fn start_game(
    room: &mut RoomState,
    requester: &PlayerId,
    _now: u64,
) -> Result<Vec<Effect>, RoomError> {
    if *requester != room.created_by {
        return Err(RoomError::PermissionDenied(
            "only the room owner can start the race".to_owned(),
        ));
    }
    if room.status != RoomStatus::Waiting {
        return Err(RoomError::InvalidState(format!(
            "cannot start a {} room",
            room.status
        )));
    }

    room.status = RoomStatus::Playing;
    room.remaining_secs = match room.config.mode {
        GameMode::Time => room.config.time_limit,
        GameMode::Words | GameMode::SuddenDeath => 0,
    };
    Ok(vec![Effect::PersistRoom])
}

/// Applies one progress report from a player: `input_chars` characters
/// typed so far, `correct_chars` of them matching the race text.
///
/// The first report starts the player's clock. Derived metrics come from
/// [`typerace_core::metrics`]. Mode rules:
///
/// - words: finished once the whole text is typed;
/// - sudden-death: finished the instant a character mismatches;
/// - time: never self-finishes — only the countdown ends it.
pub fn apply_keystroke(
    room: &mut RoomState,
    id: &PlayerId,
    input_chars: u32,
    correct_chars: u32,
    now: u64,
) -> Result<Vec<Effect>, RoomError> {
    match room.status {
        RoomStatus::Waiting => {
            return Err(RoomError::InvalidState(
                "the race has not started".to_owned(),
            ));
        }
        // A keystroke racing the end of the round loses quietly.
        RoomStatus::Finished => return Ok(Vec::new()),
        RoomStatus::Playing => {}
    }
    if !room.players.contains_key(id) {
        return Err(RoomError::NotInRoom(id.clone()));
    }

    let mode = room.config.mode;
    let text_len = room.text.len() as u32;
    let correct = correct_chars.min(input_chars);
    let completed = match mode {
        GameMode::SuddenDeath => Some(typerace_text::completed_words(
            &room.text,
            correct as usize,
        )),
        GameMode::Time | GameMode::Words => None,
    };

    let player = room.player_mut(id).expect("membership checked above");
    if player.is_finished {
        // Forced finishes (timer, first mistake) are authoritative.
        return Ok(Vec::new());
    }

    player.mark_started(now);
    player.input_chars = input_chars;
    player.correct_chars = correct;
    player.progress = (input_chars as f64 / text_len.max(1) as f64 * 100.0).clamp(0.0, 100.0);
    let elapsed = player.elapsed_secs(now);
    player.wpm = metrics::wpm(correct, elapsed);
    player.accuracy = metrics::accuracy(correct, input_chars);

    match mode {
        GameMode::SuddenDeath => {
            player.completed_words = completed;
            if correct < input_chars {
                player.finish(now);
            }
        }
        GameMode::Words => {
            if input_chars >= text_len {
                player.finish(now);
            }
        }
        GameMode::Time => {}
    }
    let finished_now = player.is_finished;

    let mut effects = vec![Effect::PersistPlayer(id.clone())];
    if finished_now {
        effects.extend(maybe_finish(room));
    }
    if room.status == RoomStatus::Playing
        && mode.extends_text()
        && input_chars as f64 / text_len.max(1) as f64 > EXTEND_THRESHOLD
    {
        effects.push(Effect::ExtendText);
    }
    Ok(effects)
}

/// One second of countdown, time mode only. At zero, everyone still
/// typing is force-finished and the round closes.
///
/// A tick against a room that isn't playing is a no-op: redundant timers
/// on a finished room must not move `winner` or `status`.
pub fn tick(room: &mut RoomState, now: u64) -> Result<Vec<Effect>, RoomError> {
    if room.config.mode != GameMode::Time {
        return Err(RoomError::InvalidState(
            "only time mode has a countdown".to_owned(),
        ));
    }
    if room.status != RoomStatus::Playing {
        return Ok(Vec::new());
    }

    room.remaining_secs = room.remaining_secs.saturating_sub(1);
    if room.remaining_secs > 0 {
        return Ok(vec![Effect::PersistRoom]);
    }

    for player in room.players.values_mut() {
        player.finish(now);
    }
    let mut effects = maybe_finish(room);
    if !effects.contains(&Effect::PersistRoom) {
        effects.push(Effect::PersistRoom);
    }
    Ok(effects)
}

/// Owner-only reset for another round: every session back to zero-state
/// (identity kept), fresh text, winner cleared, back to `waiting`.
pub fn restart(
    room: &mut RoomState,
    requester: &PlayerId,
    _now: u64,
) -> Result<Vec<Effect>, RoomError> {
    if *requester != room.created_by {
        return Err(RoomError::PermissionDenied(
            "only the room owner can restart".to_owned(),
        ));
    }

    for player in room.players.values_mut() {
        player.reset();
    }
    room.winner = None;
    room.status = RoomStatus::Waiting;
    room.remaining_secs = 0;

    Ok(vec![
        Effect::RegenerateText {
            word_count: room.config.initial_word_count(),
        },
        Effect::PersistRoom,
    ])
}

/// The `playing → finished` transition, run after any mutation that can
/// complete the field. Idempotent: once `status` is `finished` the guard
/// fails and neither `winner` nor the records are touched again.
fn maybe_finish(room: &mut RoomState) -> Vec<Effect> {
    if room.status != RoomStatus::Playing || !room.all_finished() {
        return Vec::new();
    }
    let Some(winner) = crate::score::select_winner(room) else {
        return Vec::new();
    };

    room.winner = Some(winner);
    room.status = RoomStatus::Finished;

    let mut ids: Vec<PlayerId> = room.players.keys().cloned().collect();
    ids.sort();
    let mut effects: Vec<Effect> = ids.into_iter().map(Effect::RecordSession).collect();
    effects.push(Effect::PersistRoom);
    effects
}

/// Deterministic ownership transfer: earliest joiner, ties by id. Every
/// observer of the same snapshot picks the same successor.
fn next_owner(room: &RoomState) -> PlayerId {
    room.players
        .values()
        .min_by(|a, b| a.joined_at.cmp(&b.joined_at).then_with(|| a.id.cmp(&b.id)))
        .map(|p| p.id.clone())
        .expect("caller ensures the room is non-empty")
}

fn default_name(id: &PlayerId) -> String {
    let tag: String = id.as_str().chars().take(4).collect();
    format!("Player {tag}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use typerace_core::{Language, RoomCode, RoomConfig};

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id)
    }

    fn config(mode: GameMode) -> RoomConfig {
        RoomConfig {
            mode,
            time_limit: 3,
            word_limit: 2,
            language: Language::English,
            max_players: 3,
        }
    }

    /// A room with a fixed text and "owner" seated, in `Waiting`.
    fn room(mode: GameMode, text: &str) -> RoomState {
        let owner = PlayerSession::new(pid("owner"), "Owner", 100);
        RoomState::create(
            RoomCode::parse("ABC123").unwrap(),
            "Owner's Room",
            owner,
            config(mode),
            text.to_owned(),
            100,
        )
    }

    /// A playing room with the owner plus `extra` players joined.
    fn playing(mode: GameMode, text: &str, extra: &[&str]) -> RoomState {
        let mut r = room(mode, text);
        for (i, name) in extra.iter().enumerate() {
            join(&mut r, pid(name), name, 200 + i as u64).unwrap();
        }
        start_game(&mut r, &pid("owner"), 300).unwrap();
        r
    }

    // -----------------------------------------------------------------
    // join / leave / kick
    // -----------------------------------------------------------------

    #[test]
    fn test_join_enforces_capacity() {
        let mut r = room(GameMode::Words, "cat dog");
        join(&mut r, pid("b"), "B", 200).unwrap();
        join(&mut r, pid("c"), "C", 201).unwrap();
        let err = join(&mut r, pid("d"), "D", 202).unwrap_err();
        assert!(matches!(err, RoomError::RoomFull(_)));
        assert_eq!(r.players.len(), 3);
    }

    #[test]
    fn test_rejoin_replaces_session_even_when_full() {
        let mut r = room(GameMode::Words, "cat dog");
        join(&mut r, pid("b"), "B", 200).unwrap();
        join(&mut r, pid("c"), "C", 201).unwrap();
        // Full, but "b" is already seated — rejoin resets their session.
        r.player_mut(&pid("b")).unwrap().progress = 50.0;
        join(&mut r, pid("b"), "B", 400).unwrap();
        assert_eq!(r.player(&pid("b")).unwrap().progress, 0.0);
    }

    #[test]
    fn test_join_defaults_blank_name() {
        let mut r = room(GameMode::Words, "cat dog");
        join(&mut r, pid("u-42x"), "  ", 200).unwrap();
        assert_eq!(r.player(&pid("u-42x")).unwrap().name, "Player u-42");
    }

    #[test]
    fn test_late_join_while_playing_starts_at_zero() {
        let mut r = playing(GameMode::Words, "cat dog", &[]);
        join(&mut r, pid("late"), "Late", 500).unwrap();
        let late = r.player(&pid("late")).unwrap();
        assert_eq!(late.progress, 0.0);
        assert!(!late.is_finished);
        assert_eq!(r.status, RoomStatus::Playing);
    }

    #[test]
    fn test_leave_unknown_player() {
        let mut r = room(GameMode::Words, "cat dog");
        let err = leave(&mut r, &pid("ghost"), 200).unwrap_err();
        assert!(matches!(err, RoomError::NotInRoom(_)));
    }

    #[test]
    fn test_owner_leave_transfers_to_earliest_joiner() {
        let mut r = room(GameMode::Words, "cat dog");
        join(&mut r, pid("b"), "B", 200).unwrap();
        join(&mut r, pid("c"), "C", 150).unwrap();

        leave(&mut r, &pid("owner"), 400).unwrap();
        // "c" joined earliest among the remaining players.
        assert_eq!(r.created_by, pid("c"));
        assert!(r.players.contains_key(&r.created_by));
    }

    #[test]
    fn test_owner_transfer_tie_breaks_by_id() {
        let mut r = room(GameMode::Words, "cat dog");
        join(&mut r, pid("z"), "Z", 500).unwrap();
        join(&mut r, pid("a"), "A", 500).unwrap();
        leave(&mut r, &pid("owner"), 600).unwrap();
        assert_eq!(r.created_by, pid("a"));
    }

    #[test]
    fn test_last_leave_deletes_room() {
        let mut r = room(GameMode::Words, "cat dog");
        let effects = leave(&mut r, &pid("owner"), 400).unwrap();
        assert_eq!(effects, vec![Effect::DeleteRoom]);
        assert!(r.players.is_empty());
    }

    #[test]
    fn test_leaving_straggler_finishes_the_round() {
        let mut r = playing(GameMode::Words, "cat dog", &["b"]);
        apply_keystroke(&mut r, &pid("owner"), 7, 7, 1_000).unwrap();
        assert_eq!(r.status, RoomStatus::Playing, "b is still typing");

        let effects = leave(&mut r, &pid("b"), 2_000).unwrap();
        assert_eq!(r.status, RoomStatus::Finished);
        assert_eq!(r.winner, Some(pid("owner")));
        assert!(effects.contains(&Effect::RecordSession(pid("owner"))));
    }

    #[test]
    fn test_kick_requires_owner() {
        let mut r = room(GameMode::Words, "cat dog");
        join(&mut r, pid("b"), "B", 200).unwrap();
        let err = kick(&mut r, &pid("b"), &pid("owner"), 300).unwrap_err();
        assert!(matches!(err, RoomError::PermissionDenied(_)));
        assert!(r.players.contains_key(&pid("owner")));
    }

    #[test]
    fn test_kick_rejects_self_and_mid_race() {
        let mut r = room(GameMode::Words, "cat dog");
        join(&mut r, pid("b"), "B", 200).unwrap();

        let err = kick(&mut r, &pid("owner"), &pid("owner"), 300).unwrap_err();
        assert!(matches!(err, RoomError::InvalidState(_)));

        start_game(&mut r, &pid("owner"), 300).unwrap();
        let err = kick(&mut r, &pid("owner"), &pid("b"), 400).unwrap_err();
        assert!(matches!(err, RoomError::InvalidState(_)));
        assert!(r.players.contains_key(&pid("b")));
    }

    #[test]
    fn test_kick_removes_target_in_waiting() {
        let mut r = room(GameMode::Words, "cat dog");
        join(&mut r, pid("b"), "B", 200).unwrap();
        kick(&mut r, &pid("owner"), &pid("b"), 300).unwrap();
        assert!(!r.players.contains_key(&pid("b")));
    }

    // -----------------------------------------------------------------
    // start_game
    // -----------------------------------------------------------------

    #[test]
    fn test_start_by_non_owner_denied_and_state_unchanged() {
        let mut r = room(GameMode::Words, "cat dog");
        join(&mut r, pid("b"), "B", 200).unwrap();
        let err = start_game(&mut r, &pid("b"), 300).unwrap_err();
        assert!(matches!(err, RoomError::PermissionDenied(_)));
        assert_eq!(r.status, RoomStatus::Waiting);
    }

    #[test]
    fn test_start_twice_is_invalid_state() {
        let mut r = room(GameMode::Words, "cat dog");
        start_game(&mut r, &pid("owner"), 300).unwrap();
        let err = start_game(&mut r, &pid("owner"), 301).unwrap_err();
        assert!(matches!(err, RoomError::InvalidState(_)));
        assert_eq!(r.status, RoomStatus::Playing);
    }

    #[test]
    fn test_start_arms_countdown_in_time_mode() {
        let mut r = room(GameMode::Time, "cat dog");
        start_game(&mut r, &pid("owner"), 300).unwrap();
        assert_eq!(r.remaining_secs, 3);
    }

    // -----------------------------------------------------------------
    // apply_keystroke
    // -----------------------------------------------------------------

    #[test]
    fn test_keystroke_before_start_is_invalid() {
        let mut r = room(GameMode::Words, "cat dog");
        let err = apply_keystroke(&mut r, &pid("owner"), 1, 1, 400).unwrap_err();
        assert!(matches!(err, RoomError::InvalidState(_)));
    }

    #[test]
    fn test_first_keystroke_starts_the_clock_once() {
        let mut r = playing(GameMode::Words, "cat dog", &[]);
        apply_keystroke(&mut r, &pid("owner"), 1, 1, 1_000).unwrap();
        apply_keystroke(&mut r, &pid("owner"), 2, 2, 2_000).unwrap();
        assert_eq!(r.player(&pid("owner")).unwrap().start_time, Some(1_000));
    }

    #[test]
    fn test_progress_and_metrics() {
        // Text is 7 bytes. 5 correct of 5 typed after 6 seconds.
        let mut r = playing(GameMode::Words, "cat dog", &[]);
        apply_keystroke(&mut r, &pid("owner"), 1, 1, 1_000).unwrap();
        apply_keystroke(&mut r, &pid("owner"), 5, 5, 7_000).unwrap();

        let p = r.player(&pid("owner")).unwrap();
        assert!((p.progress - 5.0 / 7.0 * 100.0).abs() < 1e-9);
        // 5 chars = 1 word in 6 s → 10 wpm.
        assert_eq!(p.wpm, 10);
        assert_eq!(p.accuracy, 100);
    }

    #[test]
    fn test_progress_monotonic_and_clamped() {
        let mut r = playing(GameMode::Words, "cat dog", &["b"]);
        let mut last = 0.0;
        for (i, len) in [1u32, 3, 5, 7, 9].iter().enumerate() {
            apply_keystroke(&mut r, &pid("b"), *len, *len, 1_000 + i as u64).unwrap();
            let p = r.player(&pid("b")).unwrap();
            assert!(p.progress >= last);
            assert!(p.progress <= 100.0);
            last = p.progress;
        }
    }

    #[test]
    fn test_words_mode_finishes_at_text_end() {
        let mut r = playing(GameMode::Words, "cat dog", &["b"]);
        let effects = apply_keystroke(&mut r, &pid("owner"), 7, 7, 5_000).unwrap();

        let p = r.player(&pid("owner")).unwrap();
        assert!(p.is_finished);
        assert_eq!(p.finish_time, Some(5_000));
        // "b" hasn't finished, so the round stays open.
        assert_eq!(r.status, RoomStatus::Playing);
        assert_eq!(effects, vec![Effect::PersistPlayer(pid("owner"))]);
    }

    #[test]
    fn test_time_mode_never_self_finishes() {
        let mut r = playing(GameMode::Time, "cat dog", &[]);
        apply_keystroke(&mut r, &pid("owner"), 7, 7, 5_000).unwrap();
        assert!(!r.player(&pid("owner")).unwrap().is_finished);
        assert_eq!(r.status, RoomStatus::Playing);
    }

    #[test]
    fn test_sudden_death_first_mistake_is_fatal() {
        // Typing "cap" against "cat dog": mismatch at index 2.
        let mut r = playing(GameMode::SuddenDeath, "cat dog", &["b"]);
        let effects = apply_keystroke(&mut r, &pid("owner"), 3, 2, 4_444).unwrap();

        let p = r.player(&pid("owner")).unwrap();
        assert!(p.is_finished);
        assert_eq!(p.finish_time, Some(4_444));
        assert_eq!(p.completed_words, Some(0));
        assert!(effects.contains(&Effect::PersistPlayer(pid("owner"))));
    }

    #[test]
    fn test_sudden_death_tracks_completed_words() {
        let mut r = playing(GameMode::SuddenDeath, "cat dog fox", &[]);
        apply_keystroke(&mut r, &pid("owner"), 7, 7, 1_000).unwrap();
        let p = r.player(&pid("owner")).unwrap();
        assert_eq!(p.completed_words, Some(2));
        assert!(!p.is_finished);
    }

    #[test]
    fn test_keystroke_after_player_finished_is_ignored() {
        let mut r = playing(GameMode::Words, "cat dog", &["b"]);
        apply_keystroke(&mut r, &pid("owner"), 7, 7, 5_000).unwrap();

        // Late report for an already-finished player: nothing moves.
        let effects = apply_keystroke(&mut r, &pid("owner"), 7, 6, 6_000).unwrap();
        assert!(effects.is_empty());
        let p = r.player(&pid("owner")).unwrap();
        assert_eq!(p.finish_time, Some(5_000));
        assert_eq!(p.accuracy, 100);
    }

    #[test]
    fn test_all_finished_sets_winner_once() {
        let mut r = playing(GameMode::Words, "cat dog", &["b"]);
        apply_keystroke(&mut r, &pid("owner"), 7, 7, 5_000).unwrap();
        let effects = apply_keystroke(&mut r, &pid("b"), 7, 7, 6_000).unwrap();

        assert_eq!(r.status, RoomStatus::Finished);
        assert_eq!(r.winner, Some(pid("owner")));
        assert!(effects.contains(&Effect::RecordSession(pid("owner"))));
        assert!(effects.contains(&Effect::RecordSession(pid("b"))));
        assert!(effects.contains(&Effect::PersistRoom));
    }

    #[test]
    fn test_finished_room_is_inert() {
        let mut r = playing(GameMode::Words, "cat dog", &["b"]);
        apply_keystroke(&mut r, &pid("owner"), 7, 7, 5_000).unwrap();
        apply_keystroke(&mut r, &pid("b"), 7, 5, 6_000).unwrap();
        let winner = r.winner.clone();
        assert_eq!(r.status, RoomStatus::Finished);

        // Neither late keystrokes nor anything else recomputes the result.
        let effects = apply_keystroke(&mut r, &pid("b"), 7, 7, 7_000).unwrap();
        assert!(effects.is_empty());
        assert_eq!(r.winner, winner);
        assert_eq!(r.status, RoomStatus::Finished);
    }

    // -----------------------------------------------------------------
    // tick
    // -----------------------------------------------------------------

    #[test]
    fn test_tick_rejected_outside_time_mode() {
        let mut r = playing(GameMode::Words, "cat dog", &[]);
        assert!(matches!(
            tick(&mut r, 1_000),
            Err(RoomError::InvalidState(_))
        ));
    }

    #[test]
    fn test_tick_counts_down_then_forces_finish() {
        let mut r = playing(GameMode::Time, "cat dog", &["b"]);
        apply_keystroke(&mut r, &pid("owner"), 2, 2, 1_000).unwrap();
        apply_keystroke(&mut r, &pid("owner"), 4, 4, 2_000).unwrap();

        tick(&mut r, 2_000).unwrap();
        tick(&mut r, 3_000).unwrap();
        assert_eq!(r.remaining_secs, 1);
        assert_eq!(r.status, RoomStatus::Playing);

        let effects = tick(&mut r, 4_000).unwrap();
        assert_eq!(r.remaining_secs, 0);
        assert_eq!(r.status, RoomStatus::Finished);
        assert!(r.players.values().all(|p| p.is_finished));
        assert!(r.players.values().all(|p| p.finish_time == Some(4_000)));
        assert!(effects.contains(&Effect::PersistRoom));
        // Only the owner typed, so only the owner can win.
        assert_eq!(r.winner, Some(pid("owner")));
    }

    #[test]
    fn test_tick_on_finished_room_is_noop() {
        let mut r = playing(GameMode::Time, "cat dog", &[]);
        for t in 1..=3 {
            tick(&mut r, t * 1_000).unwrap();
        }
        assert_eq!(r.status, RoomStatus::Finished);
        let winner = r.winner.clone();

        let effects = tick(&mut r, 9_000).unwrap();
        assert!(effects.is_empty());
        assert_eq!(r.winner, winner);
    }

    #[test]
    fn test_keystroke_after_timer_expiry_is_ignored() {
        let mut r = playing(GameMode::Time, "cat dog", &["b"]);
        apply_keystroke(&mut r, &pid("owner"), 4, 4, 1_000).unwrap();
        for t in 2..=4 {
            tick(&mut r, t * 1_000).unwrap();
        }
        assert_eq!(r.status, RoomStatus::Finished);

        // The forced finish is authoritative over the in-flight keystroke.
        let effects = apply_keystroke(&mut r, &pid("b"), 6, 6, 4_001).unwrap();
        assert!(effects.is_empty());
        assert_eq!(r.player(&pid("b")).unwrap().input_chars, 0);
    }

    // -----------------------------------------------------------------
    // text extension
    // -----------------------------------------------------------------

    #[test]
    fn test_extension_requested_past_threshold() {
        let mut r = playing(GameMode::Time, "cat dog fox", &[]);
        // 10 of 11 bytes > 80%.
        let effects = apply_keystroke(&mut r, &pid("owner"), 10, 10, 1_000).unwrap();
        assert!(effects.contains(&Effect::ExtendText));

        // Below the threshold, no request.
        let mut r = playing(GameMode::Time, "cat dog fox", &[]);
        let effects = apply_keystroke(&mut r, &pid("owner"), 5, 5, 1_000).unwrap();
        assert!(!effects.contains(&Effect::ExtendText));
    }

    #[test]
    fn test_words_mode_never_extends() {
        let mut r = playing(GameMode::Words, "cat dog fox", &["b"]);
        let effects = apply_keystroke(&mut r, &pid("owner"), 10, 10, 1_000).unwrap();
        assert!(!effects.contains(&Effect::ExtendText));
    }

    #[test]
    fn test_sudden_death_extends_past_threshold() {
        let mut r = playing(GameMode::SuddenDeath, "cat dog fox", &["b"]);
        let effects = apply_keystroke(&mut r, &pid("owner"), 10, 10, 1_000).unwrap();
        assert!(effects.contains(&Effect::ExtendText));
    }

    // -----------------------------------------------------------------
    // restart
    // -----------------------------------------------------------------

    #[test]
    fn test_restart_requires_owner() {
        let mut r = playing(GameMode::Words, "cat dog", &["b"]);
        let err = restart(&mut r, &pid("b"), 9_000).unwrap_err();
        assert!(matches!(err, RoomError::PermissionDenied(_)));
    }

    #[test]
    fn test_restart_resets_round() {
        let mut r = playing(GameMode::Words, "cat dog", &["b"]);
        apply_keystroke(&mut r, &pid("owner"), 7, 7, 5_000).unwrap();
        apply_keystroke(&mut r, &pid("b"), 7, 7, 6_000).unwrap();
        assert_eq!(r.status, RoomStatus::Finished);

        let effects = restart(&mut r, &pid("owner"), 9_000).unwrap();
        assert_eq!(r.status, RoomStatus::Waiting);
        assert_eq!(r.winner, None);
        assert_eq!(r.players.len(), 2);
        for p in r.players.values() {
            assert!(!p.is_finished);
            assert_eq!(p.progress, 0.0);
            assert_eq!(p.finish_time, None);
        }
        assert!(effects.contains(&Effect::RegenerateText { word_count: 2 }));
    }
}
