//! Race configuration: game modes, languages, and room settings.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GameMode
// ---------------------------------------------------------------------------

/// How a race ends.
///
/// - **Time**: a shared countdown; when it hits zero everyone still typing
///   is force-finished. The text grows on demand so nobody runs out.
/// - **Words**: the text is the finish line — first to type it all wins on
///   the score formula. The text never grows.
/// - **SuddenDeath**: one wrong character and you are out, on the spot.
///   Ranked by completed words; the text grows on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    Time,
    Words,
    SuddenDeath,
}

impl GameMode {
    /// Whether the race text is extended when a player nears its end.
    /// Words mode never extends — its text length is the finish line.
    pub fn extends_text(&self) -> bool {
        matches!(self, Self::Time | Self::SuddenDeath)
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Time => write!(f, "time"),
            Self::Words => write!(f, "words"),
            Self::SuddenDeath => write!(f, "sudden-death"),
        }
    }
}

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Which word bank the race text draws from. Opaque to the state machine;
/// only the text generator cares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "id")]
    Indonesian,
}

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Settings chosen when a room is created. Flattened into the persisted
/// room record, so field names match the stored schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomConfig {
    pub mode: GameMode,

    /// Countdown length in seconds. Only meaningful in time mode.
    pub time_limit: u32,

    /// Number of words in the race text. Only meaningful in words mode.
    pub word_limit: u32,

    pub language: Language,

    /// Capacity bound, enforced at join time.
    pub max_players: usize,
}

impl RoomConfig {
    /// Words in the initial race text for modes whose text grows on
    /// demand. Sized so extension is infrequent relative to typing speed.
    pub const STREAM_WORDS: u32 = 80;

    /// How many words the initial race text should contain.
    pub fn initial_word_count(&self) -> u32 {
        match self.mode {
            GameMode::Words => self.word_limit,
            GameMode::Time | GameMode::SuddenDeath => Self::STREAM_WORDS,
        }
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::Time,
            time_limit: 30,
            word_limit: 25,
            language: Language::default(),
            max_players: 5,
        }
    }
}
