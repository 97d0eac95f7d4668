//! Typing metrics: pure, total functions over character counts and time.
//!
//! Both live display and the authoritative session record use these, so
//! they live in the shared crate rather than the coordinator.

/// Words per minute, using the standard 5-characters-per-word convention.
///
/// Non-positive elapsed time yields 0 rather than dividing by zero — a
/// keystroke processed in the same millisecond the timer started is not
/// infinite speed.
pub fn wpm(correct_chars: u32, elapsed_secs: f64) -> u32 {
    if elapsed_secs <= 0.0 {
        return 0;
    }
    let words = correct_chars as f64 / 5.0;
    let minutes = elapsed_secs / 60.0;
    (words / minutes).round() as u32
}

/// Accuracy as an integer percentage. An empty input is 100% accurate.
pub fn accuracy(correct_chars: u32, total_chars: u32) -> u8 {
    if total_chars == 0 {
        return 100;
    }
    let pct = 100.0 * correct_chars as f64 / total_chars as f64;
    pct.round().clamp(0.0, 100.0) as u8
}
