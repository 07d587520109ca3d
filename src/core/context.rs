// File: src/core/context.rs
use crate::core::types::WordId;
use serde::{Deserialize, Serialize};

/// Per-session typing state: the letters of the word in flight, the trie
/// cursor tracking them, and the rolling two-word context that feeds
/// bigram/trigram ranking.
///
/// The buffer and cursor are ephemeral and skipped by serialization; the
/// rolling context is part of the learned state and survives a save/load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionContext {
    /// Letters typed so far for the current word.
    #[serde(skip)]
    pub buffer: String,
    /// Trie node for the current prefix. `None` means the cursor is dead:
    /// an invalid letter or a failed traversal happened, and guesses stay
    /// empty until the next word boundary.
    #[serde(skip)]
    pub cursor: Option<usize>,
    /// Most recently resolved word.
    pub last_word: Option<WordId>,
    /// The word resolved before that.
    pub second_last_word: Option<WordId>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Word boundary: fresh buffer, cursor back at the trie root.
    pub fn reset_word(&mut self, root: usize) {
        self.buffer.clear();
        self.cursor = Some(root);
    }

    pub fn kill_cursor(&mut self) {
        self.cursor = None;
    }

    /// Rolls the context window after a word resolves.
    pub fn rotate(&mut self, word: WordId) {
        self.second_last_word = self.last_word;
        self.last_word = Some(word);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_keeps_a_two_word_window() {
        let mut session = SessionContext::new();
        assert_eq!(session.last_word, None);
        session.rotate(7);
        session.rotate(9);
        assert_eq!((session.last_word, session.second_last_word), (Some(9), Some(7)));
        session.rotate(4);
        assert_eq!((session.last_word, session.second_last_word), (Some(4), Some(9)));
    }

    #[test]
    fn reset_revives_a_dead_cursor() {
        let mut session = SessionContext::new();
        session.kill_cursor();
        session.buffer.push('x');
        session.reset_word(0);
        assert_eq!(session.cursor, Some(0));
        assert!(session.buffer.is_empty());
    }
}
