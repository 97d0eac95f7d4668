//! Race-text generation for TypeRace.
//!
//! A [`TextStream`] produces the shared race text: random words from a
//! language-specific bank, joined by single spaces. For modes where the
//! text must outlast the fastest typist, [`TextStream::batch`] produces
//! the fixed-size chunks appended by the extension policy.
//!
//! Generation always succeeds — there are no error cases here, only a
//! random source.

mod words;

use rand::rngs::StdRng;
use rand::SeedableRng;
use typerace_core::Language;

/// Words appended per extension. Large enough that extension is rare
/// relative to typing speed, small enough not to bloat the stored text.
pub const EXTEND_BATCH_WORDS: u32 = 60;

/// A language-bound source of race text.
pub struct TextStream {
    language: Language,
    rng: StdRng,
}

impl TextStream {
    /// A stream seeded from the operating system.
    pub fn new(language: Language) -> Self {
        Self {
            language,
            rng: StdRng::from_os_rng(),
        }
    }

    /// A deterministic stream for tests.
    pub fn with_seed(language: Language, seed: u64) -> Self {
        Self {
            language,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// `word_count` words drawn uniformly (with replacement) from the
    /// bank, joined by single spaces.
    pub fn generate(&mut self, word_count: u32) -> String {
        let mut text = String::new();
        for i in 0..word_count {
            if i > 0 {
                text.push(' ');
            }
            text.push_str(words::pick(self.language, &mut self.rng));
        }
        text
    }

    /// One extension chunk of [`EXTEND_BATCH_WORDS`] words.
    pub fn batch(&mut self) -> String {
        self.generate(EXTEND_BATCH_WORDS)
    }
}

/// Counts the words of `text` that lie entirely within its first
/// `prefix_len` bytes.
///
/// This is the sudden-death ranking key: given the correctly-typed prefix
/// length, how many whole words did the player get through? A word counts
/// once its last character is inside the prefix; a partial word does not.
pub fn completed_words(text: &str, prefix_len: usize) -> u32 {
    let mut count = 0;
    let mut offset = 0;
    for word in text.split(' ') {
        let end = offset + word.len();
        if end > prefix_len {
            break;
        }
        if !word.is_empty() {
            count += 1;
        }
        offset = end + 1; // skip the separating space
    }
    count
}
