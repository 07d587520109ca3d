use crate::core::context::SessionContext;
use crate::core::model::FrequencyModel;
use crate::core::trie::Trie;
use crate::core::types::{WordId, CANDIDATE_POOL, GUESS_SLOTS};
use crate::learning::LearningEngine;
use crate::persistence::{load_from_disk, save_to_disk, PersistError};
use std::cmp::Reverse;
use std::path::Path;
use tracing::{debug, trace};

/// The autofill engine: prefix trie, frequency/context model, and one
/// typing session's rolling state, composed behind the per-keystroke API.
///
/// One instance owns one typing session; construct an engine per session
/// and pass it explicitly. Every call takes `&mut self` and runs to
/// completion, so exclusive access is enforced by the borrow checker
/// in-process; callers sharing an instance across threads wrap it in a
/// `Mutex` held for the whole call.
pub struct AutofillEngine {
    pub(crate) trie: Trie,
    pub(crate) model: FrequencyModel,
    pub(crate) session: SessionContext,
    learning: LearningEngine,
    dictionary_path: Option<String>,
}

impl AutofillEngine {
    /// Builds an engine from a stream of pre-validated vocabulary tokens
    /// (trimmed, lowercase, non-empty).
    pub fn new<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut engine = Self::empty();
        engine.seed_vocabulary(vocabulary);
        engine
    }

    fn empty() -> Self {
        Self {
            trie: Trie::new(),
            model: FrequencyModel::new(),
            session: SessionContext::new(),
            learning: LearningEngine::new(),
            dictionary_path: None,
        }
    }

    pub(crate) fn from_parts(trie: Trie, model: FrequencyModel, session: SessionContext) -> Self {
        Self {
            trie,
            model,
            session,
            learning: LearningEngine::new(),
            dictionary_path: None,
        }
    }

    /// Loads a previously saved dictionary, or starts fresh if the file
    /// is missing or unreadable. Either way the engine will save back to
    /// `path`.
    pub fn from_file_or_new(path: &str) -> Self {
        let mut engine = match load_from_disk(Path::new(path)) {
            Ok(engine) => engine,
            Err(err) => {
                debug!(path, %err, "no usable dictionary, starting fresh");
                Self::empty()
            }
        };
        engine.dictionary_path = Some(path.to_string());
        engine
    }

    /// Adds vocabulary words: each enters the trie at weight 1.
    pub fn seed_vocabulary<I, S>(&mut self, vocabulary: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut count = 0usize;
        for word in vocabulary {
            let word = word.as_ref();
            let id = self.model.get_or_intern(word);
            self.model.seed(id);
            self.trie.insert(word, id, &self.model);
            count += 1;
        }
        debug!(count, "vocabulary seeded");
    }

    /// Consumes a corpus token stream (already split on non-letter
    /// boundaries and lowercased), updating unigram weights, the n-gram
    /// tables, and the trie. The rolling context here is local to the
    /// call; it never touches the live typing session.
    pub fn train<I, S>(&mut self, corpus: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut prev: Option<WordId> = None;
        let mut prev_prev: Option<WordId> = None;
        let mut tokens = 0usize;
        for token in corpus {
            let token = token.as_ref();
            let id = self.model.get_or_intern(token);
            self.model.observe(id, prev, prev_prev);
            self.trie.insert(token, id, &self.model);
            prev_prev = prev;
            prev = Some(id);
            tokens += 1;
        }
        debug!(tokens, words = self.model.len(), "corpus training pass finished");
    }

    /// One keystroke of the current word. Always returns exactly three
    /// slots; `None` means "no further suggestion", never failure.
    ///
    /// `letter_position == 0` starts a new word from any prior state. A
    /// letter outside a-z, or any traversal miss, kills the cursor for
    /// the remainder of the word. Nothing on this path mutates the model
    /// or the trie.
    pub fn guess(
        &mut self,
        letter: char,
        letter_position: usize,
        word_position: usize,
    ) -> [Option<String>; GUESS_SLOTS] {
        if letter_position == 0 {
            self.session.reset_word(self.trie.root());
        }
        self.session.buffer.push(letter);

        let cursor = match self.session.cursor {
            Some(cursor) if letter.is_ascii_lowercase() => cursor,
            _ => {
                self.session.kill_cursor();
                return empty_guesses();
            }
        };
        let cursor = match self.trie.child(cursor, letter) {
            Some(next) => next,
            None => {
                trace!(prefix = %self.session.buffer, word_position, "prefix left the known tree");
                self.session.kill_cursor();
                return empty_guesses();
            }
        };
        self.session.cursor = Some(cursor);

        let mut candidates = self.trie.completions(cursor, CANDIDATE_POOL, &self.model);
        let last = self.session.last_word;
        let second_last = self.session.second_last_word;
        let key = |id: WordId| {
            (
                Reverse(self.model.context_score(id, last, second_last)),
                Reverse(self.model.weight(id)),
                self.model.text(id),
            )
        };
        candidates.sort_by(|&a, &b| key(a).cmp(&key(b)));

        let mut guesses = empty_guesses();
        for (slot, id) in guesses.iter_mut().zip(candidates) {
            *slot = Some(self.model.text(id).to_string());
        }
        guesses
    }

    /// Resolves the word just typed. `accepted` reports whether one of
    /// the emitted guesses matched; `correct_word` is what the user
    /// actually meant, when known.
    pub fn feedback(&mut self, accepted: bool, correct_word: Option<&str>) {
        let Self {
            trie,
            model,
            session,
            learning,
            ..
        } = self;
        learning.learn(trie, model, session, accepted, correct_word);
    }

    /// Number of distinct words the engine knows.
    pub fn word_count(&self) -> usize {
        self.model.len()
    }

    /// The rolling context as text, most recent first.
    pub fn recent_words(&self) -> (Option<&str>, Option<&str>) {
        let text = |id: Option<WordId>| id.map(|id| self.model.text(id));
        (text(self.session.last_word), text(self.session.second_last_word))
    }

    /// Saves the learned state to the dictionary path this engine was
    /// loaded from; quietly does nothing when there is none.
    pub fn save_dictionary(&self) -> Result<(), PersistError> {
        if let Some(path) = &self.dictionary_path {
            save_to_disk(self, Path::new(path))
        } else {
            Ok(())
        }
    }
}

fn empty_guesses() -> [Option<String>; GUESS_SLOTS] {
    std::array::from_fn(|_| None)
}
