// File: src/learning.rs
use crate::core::context::SessionContext;
use crate::core::model::FrequencyModel;
use crate::core::trie::Trie;
use crate::core::types::is_lowercase_word;
use tracing::debug;

/// Applies accept/reject feedback for a resolved word across the learned
/// state: weight adjustment, completion-cache refresh along the word's
/// path, n-gram update against the pre-feedback context, then context
/// rotation.
#[derive(Debug, Default)]
pub struct LearningEngine;

impl LearningEngine {
    pub fn new() -> Self {
        Self
    }

    /// Feedback with no usable word (`None`, or anything that is not a
    /// plain lowercase token) is a routine call shape and a no-op, not an
    /// error.
    pub fn learn(
        &self,
        trie: &mut Trie,
        model: &mut FrequencyModel,
        session: &mut SessionContext,
        accepted: bool,
        correct_word: Option<&str>,
    ) {
        let word = match correct_word {
            Some(word) if is_lowercase_word(word) => word,
            _ => return,
        };
        let id = model.get_or_intern(word);
        model.apply_feedback(id, accepted);
        trie.refresh(word, id, model);
        model.record_transition(session.last_word, session.second_last_word, id);
        session.rotate(id);
        debug!(word, accepted, "feedback learned");
    }
}
