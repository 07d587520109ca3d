// File: src/core/model.rs
use crate::core::types::{WordId, WordMeta, NGRAM_LIMIT, PENALTY, REWARD};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

/// The statistical side of the engine: an interned word store with unigram
/// weights, plus bigram/trigram context tables with bounded inner maps.
///
/// Words are interned once and referred to by [`WordId`] everywhere else,
/// so the n-gram tables stay compact and comparisons stay integer-cheap.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct FrequencyModel {
    words: Vec<WordMeta>,
    ids: HashMap<String, WordId>,
    /// Maps prev_word -> (next_word -> count).
    bigrams: HashMap<WordId, HashMap<WordId, u32>>,
    /// Maps (prev_prev_word, prev_word) -> (next_word -> count).
    trigrams: HashMap<(WordId, WordId), HashMap<WordId, u32>>,
}

impl FrequencyModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `text`, creating a zero-weight entry on first
    /// sighting. O(1) amortized.
    pub fn get_or_intern(&mut self, text: &str) -> WordId {
        if let Some(&id) = self.ids.get(text) {
            return id;
        }
        let id = self.words.len();
        self.words.push(WordMeta {
            text: text.to_string(),
            weight: 0,
        });
        self.ids.insert(text.to_string(), id);
        id
    }

    pub fn lookup(&self, text: &str) -> Option<WordId> {
        self.ids.get(text).copied()
    }

    pub fn text(&self, id: WordId) -> &str {
        &self.words[id].text
    }

    pub fn weight(&self, id: WordId) -> u32 {
        self.words[id].weight
    }

    /// Number of distinct words ever interned.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Vocabulary sighting: a known word starts at weight 1. Idempotent.
    pub fn seed(&mut self, id: WordId) {
        self.words[id].weight = 1;
    }

    /// Corpus sighting: bump the unigram weight and record the transition
    /// from the rolling context, enforcing the inner-map bound.
    pub fn observe(&mut self, id: WordId, prev: Option<WordId>, prev_prev: Option<WordId>) {
        self.words[id].weight = self.words[id].weight.saturating_add(1);
        self.record_transition(prev, prev_prev, id);
    }

    /// Records that `next` followed the given context words. Shared by
    /// corpus training and feedback so the bound holds on both paths.
    pub fn record_transition(
        &mut self,
        last: Option<WordId>,
        second_last: Option<WordId>,
        next: WordId,
    ) {
        if let Some(last) = last {
            bump(&mut self.bigrams, last, next);
            if let Some(second_last) = second_last {
                bump(&mut self.trigrams, (second_last, last), next);
            }
        }
    }

    /// Accepted guesses promote fast; rejected ones decay gently, clamped
    /// at zero so a word is suppressed but never forgotten.
    pub fn apply_feedback(&mut self, id: WordId, accepted: bool) {
        let meta = &mut self.words[id];
        meta.weight = if accepted {
            meta.weight.saturating_add(REWARD)
        } else {
            meta.weight.saturating_sub(PENALTY)
        };
        trace!(word = %meta.text, weight = meta.weight, accepted, "feedback applied");
    }

    /// How often `candidate` followed the current context. A secondary
    /// sort key only: a zero score never filters a candidate out.
    pub fn context_score(
        &self,
        candidate: WordId,
        last: Option<WordId>,
        second_last: Option<WordId>,
    ) -> u64 {
        let mut score = 0u64;
        if let Some(last) = last {
            if let Some(inner) = self.bigrams.get(&last) {
                score += u64::from(inner.get(&candidate).copied().unwrap_or(0));
            }
            if let Some(second_last) = second_last {
                if let Some(inner) = self.trigrams.get(&(second_last, last)) {
                    score += u64::from(inner.get(&candidate).copied().unwrap_or(0));
                }
            }
        }
        score
    }

    #[cfg(test)]
    pub(crate) fn bigram_count(&self, prev: WordId, next: WordId) -> u32 {
        self.bigrams
            .get(&prev)
            .and_then(|inner| inner.get(&next))
            .copied()
            .unwrap_or(0)
    }

    #[cfg(test)]
    pub(crate) fn max_inner_len(&self) -> usize {
        let bi = self.bigrams.values().map(HashMap::len).max().unwrap_or(0);
        let tri = self.trigrams.values().map(HashMap::len).max().unwrap_or(0);
        bi.max(tri)
    }
}

/// Increments `map[key][next]`, then evicts one entry if the inner map
/// outgrew the bound: the minimum count, ties broken by smallest id, so
/// eviction is reproducible under any hash iteration order.
fn bump<K: std::hash::Hash + Eq>(
    map: &mut HashMap<K, HashMap<WordId, u32>>,
    key: K,
    next: WordId,
) {
    let inner = map.entry(key).or_default();
    let count = inner.entry(next).or_insert(0);
    *count = count.saturating_add(1);
    if inner.len() > NGRAM_LIMIT {
        let victim = inner
            .iter()
            .min_by_key(|&(&id, &count)| (count, id))
            .map(|(&id, _)| id);
        if let Some(victim) = victim {
            inner.remove(&victim);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_constants_apply_and_clamp() {
        let mut model = FrequencyModel::new();
        let id = model.get_or_intern("care");
        model.seed(id);
        model.apply_feedback(id, true);
        assert_eq!(model.weight(id), 51);
        model.apply_feedback(id, false);
        assert_eq!(model.weight(id), 49);

        let low = model.get_or_intern("cat");
        model.seed(low);
        model.apply_feedback(low, false);
        assert_eq!(model.weight(low), 0, "penalty clamps at zero");
        model.apply_feedback(low, false);
        assert_eq!(model.weight(low), 0);
    }

    #[test]
    fn training_twice_doubles_counts() {
        let mut model = FrequencyModel::new();
        let the = model.get_or_intern("the");
        let cat = model.get_or_intern("cat");
        for _ in 0..2 {
            model.observe(the, None, None);
            model.observe(cat, Some(the), None);
        }
        assert_eq!(model.weight(the), 2);
        assert_eq!(model.weight(cat), 2);
        assert_eq!(model.bigram_count(the, cat), 2);
    }

    #[test]
    fn inner_maps_stay_bounded() {
        let mut model = FrequencyModel::new();
        let ctx = model.get_or_intern("the");
        for i in 0..(NGRAM_LIMIT * 4) {
            let next = model.get_or_intern(&format!("w{i}"));
            model.record_transition(Some(ctx), None, next);
        }
        assert!(model.max_inner_len() <= NGRAM_LIMIT);
    }

    #[test]
    fn eviction_keeps_the_frequent_entries() {
        let mut model = FrequencyModel::new();
        let ctx = model.get_or_intern("the");
        let heavy = model.get_or_intern("cat");
        for _ in 0..5 {
            model.record_transition(Some(ctx), None, heavy);
        }
        for i in 0..(NGRAM_LIMIT * 2) {
            let next = model.get_or_intern(&format!("w{i}"));
            model.record_transition(Some(ctx), None, next);
        }
        assert_eq!(model.bigram_count(ctx, heavy), 5, "high-count entry survives");
    }

    quickcheck::quickcheck! {
        fn inner_maps_never_exceed_the_bound(raw: Vec<String>) -> bool {
            let mut model = FrequencyModel::new();
            let mut prev = None;
            let mut prev_prev = None;
            for token in raw.iter().flat_map(|s| crate::source::tokenize(s)) {
                let id = model.get_or_intern(&token);
                model.observe(id, prev, prev_prev);
                prev_prev = prev;
                prev = Some(id);
            }
            model.max_inner_len() <= NGRAM_LIMIT
        }
    }

    #[test]
    fn context_score_sums_bigram_and_trigram() {
        let mut model = FrequencyModel::new();
        let a = model.get_or_intern("the");
        let b = model.get_or_intern("cat");
        let c = model.get_or_intern("sat");
        model.record_transition(Some(b), Some(a), c);
        model.record_transition(Some(b), Some(a), c);
        // bigram cat->sat = 2, trigram (the,cat)->sat = 2
        assert_eq!(model.context_score(c, Some(b), Some(a)), 4);
        assert_eq!(model.context_score(c, Some(b), None), 2);
        assert_eq!(model.context_score(c, None, None), 0);
    }
}
