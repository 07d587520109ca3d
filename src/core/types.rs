// src/core/types.rs
use serde::{Deserialize, Serialize};

/// A unique identifier for a canonical word: its index in the
/// [`FrequencyModel`](crate::core::model::FrequencyModel) word store.
pub type WordId = usize;

/// Metadata associated with a single known word.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordMeta {
    pub text: String,
    /// Current ranking weight. Seeded to 1 from the vocabulary, bumped by
    /// corpus training, and adjusted sharply up / gently down by feedback.
    pub weight: u32,
}

/// Number of candidate completions cached on each trie node.
pub const CACHE_LIMIT: usize = 10;

/// Maximum entries per bigram/trigram inner map.
pub const NGRAM_LIMIT: usize = 50;

/// Weight added when a guess is accepted.
pub const REWARD: u32 = 50;

/// Weight removed (clamped at zero) when a guess is rejected.
pub const PENALTY: u32 = 2;

/// Candidates pulled from the trie before context re-ranking.
pub const CANDIDATE_POOL: usize = 10;

/// Guess slots returned per keystroke.
pub const GUESS_SLOTS: usize = 3;

/// The only token shape the learned structures accept: non-empty, all
/// ASCII lowercase letters.
pub fn is_lowercase_word(word: &str) -> bool {
    !word.is_empty() && word.bytes().all(|b| b.is_ascii_lowercase())
}
