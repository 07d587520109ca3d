// --- File: src/core/trie.rs
use crate::core::model::FrequencyModel;
use crate::core::types::{is_lowercase_word, WordId, CACHE_LIMIT};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

const ALPHABET: usize = 26;

#[derive(Clone, Serialize, Deserialize)]
struct Node {
    /// Direct indexed dispatch: one slot per letter a-z.
    children: [Option<usize>; ALPHABET],
    /// Set iff a complete word terminates here.
    word: Option<WordId>,
    /// Best known completions anywhere in this subtree, at most
    /// [`CACHE_LIMIT`] entries. Membership is maintained on insert and
    /// refresh; ordering is recomputed from current weights at read time.
    cache: Vec<WordId>,
}

impl Node {
    fn new() -> Self {
        Self {
            children: [None; ALPHABET],
            word: None,
            cache: Vec::new(),
        }
    }
}

/// A mutable, arena-allocated prefix tree. Nodes live in one `Vec` and
/// refer to each other by index, so traversal is pointer-chase free and
/// the whole structure serializes trivially.
///
/// The tree only ever grows; zero-weight words stay present and are
/// merely out-ranked.
#[derive(Clone, Serialize, Deserialize)]
pub struct Trie {
    nodes: Vec<Node>,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new()],
        }
    }

    /// Index of the root node, the cursor position at letter 0.
    pub const fn root(&self) -> usize {
        0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The word terminating at `node_idx`, if any.
    pub fn word_at(&self, node_idx: usize) -> Option<WordId> {
        self.nodes[node_idx].word
    }

    /// Inserts a word, creating one node per letter as needed, and offers
    /// it to the completion cache of every node along the path. A token
    /// outside the lowercase-word shape is rejected whole, before any
    /// node is created; the streams feeding this are pre-validated, so
    /// that is a guard, not a code path.
    /// O(k) where k is word length.
    pub fn insert(&mut self, text: &str, id: WordId, model: &FrequencyModel) {
        if !is_lowercase_word(text) {
            return;
        }
        let mut node_idx = 0;
        for slot in text.bytes().map(|b| (b - b'a') as usize) {
            let next = match self.nodes[node_idx].children[slot] {
                Some(idx) => idx,
                None => {
                    let idx = self.nodes.len();
                    self.nodes.push(Node::new());
                    self.nodes[node_idx].children[slot] = Some(idx);
                    idx
                }
            };
            node_idx = next;
            self.offer(node_idx, id, model);
        }
        self.nodes[node_idx].word = Some(id);
    }

    /// Follows `prefix` from the root; `None` the moment a letter has no
    /// child. O(k).
    pub fn lookup(&self, prefix: &str) -> Option<usize> {
        let mut node_idx = 0;
        for letter in prefix.chars() {
            node_idx = self.child(node_idx, letter)?;
        }
        Some(node_idx)
    }

    /// Single-step traversal used on the per-keystroke path.
    pub fn child(&self, node_idx: usize, letter: char) -> Option<usize> {
        let slot = letter_index(letter)?;
        self.nodes[node_idx].children[slot]
    }

    /// Up to `limit` completions under `node_idx`, ranked by current
    /// weight descending, then lexicographically. Served from the node
    /// cache; an empty cache over a non-empty subtree (possible only in a
    /// snapshot produced elsewhere) falls back to a full subtree scan.
    /// O(cache) warm, O(subtree) cold.
    pub fn completions(
        &self,
        node_idx: usize,
        limit: usize,
        model: &FrequencyModel,
    ) -> Vec<WordId> {
        let node = &self.nodes[node_idx];
        let mut out = if node.cache.is_empty() {
            self.collect_subtree(node_idx)
        } else {
            node.cache.clone()
        };
        out.sort_by(|&a, &b| rank_key(model, a).cmp(&rank_key(model, b)));
        out.truncate(limit);
        out
    }

    /// Re-qualifies a word for the caches along its path after its weight
    /// changed. A word that never reached the tree through a vocabulary
    /// or corpus stream is left alone: caches must only ever name words
    /// terminating in their subtree.
    pub fn refresh(&mut self, text: &str, id: WordId, model: &FrequencyModel) {
        match self.lookup(text) {
            Some(end) if self.nodes[end].word == Some(id) => {}
            _ => return,
        }
        let mut node_idx = 0;
        for letter in text.chars() {
            // Path was just verified; a missing child cannot occur.
            match self.child(node_idx, letter) {
                Some(next) => node_idx = next,
                None => return,
            }
            self.offer(node_idx, id, model);
        }
    }

    /// Offers `id` to a node cache: appended while there is room,
    /// otherwise it replaces the worst cached entry (lowest current
    /// weight, ties broken against the lexicographically greater text)
    /// if it outranks it.
    fn offer(&mut self, node_idx: usize, id: WordId, model: &FrequencyModel) {
        let cache = &mut self.nodes[node_idx].cache;
        if cache.contains(&id) {
            return;
        }
        if cache.len() < CACHE_LIMIT {
            cache.push(id);
            return;
        }
        let mut worst = 0;
        for i in 1..cache.len() {
            if rank_key(model, cache[i]) > rank_key(model, cache[worst]) {
                worst = i;
            }
        }
        if rank_key(model, id) < rank_key(model, cache[worst]) {
            cache[worst] = id;
        }
    }

    fn collect_subtree(&self, node_idx: usize) -> Vec<WordId> {
        let mut out = Vec::new();
        self.dfs(node_idx, &mut out);
        out
    }

    fn dfs(&self, node_idx: usize, out: &mut Vec<WordId>) {
        let node = &self.nodes[node_idx];
        if let Some(id) = node.word {
            out.push(id);
        }
        for &child_idx in node.children.iter().flatten() {
            self.dfs(child_idx, out);
        }
    }
}

/// Sort key under which lower is better: weight descending, then text
/// ascending.
fn rank_key<'m>(model: &'m FrequencyModel, id: WordId) -> (Reverse<u32>, &'m str) {
    (Reverse(model.weight(id)), model.text(id))
}

fn letter_index(letter: char) -> Option<usize> {
    if letter.is_ascii_lowercase() {
        Some(letter as usize - 'a' as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(words: &[&str]) -> (Trie, FrequencyModel) {
        let mut trie = Trie::new();
        let mut model = FrequencyModel::new();
        for &word in words {
            let id = model.get_or_intern(word);
            model.seed(id);
            trie.insert(word, id, &model);
        }
        (trie, model)
    }

    fn texts(trie: &Trie, model: &FrequencyModel, node: usize, limit: usize) -> Vec<String> {
        trie.completions(node, limit, model)
            .into_iter()
            .map(|id| model.text(id).to_string())
            .collect()
    }

    #[test]
    fn inserted_words_are_reachable_and_terminal() {
        let (trie, model) = build(&["cat", "car", "care", "dog"]);
        for word in ["cat", "car", "care", "dog"] {
            let node = trie.lookup(word).expect("path exists");
            let id = trie.word_at(node).expect("terminal");
            assert_eq!(model.text(id), word);
        }
        assert!(trie.lookup("ca").is_some());
        assert!(trie.word_at(trie.lookup("ca").unwrap()).is_none());
        assert!(trie.lookup("cab").is_none());
    }

    #[test]
    fn completions_break_weight_ties_lexicographically() {
        let (trie, model) = build(&["cat", "car", "care", "dog"]);
        let node = trie.lookup("ca").unwrap();
        assert_eq!(texts(&trie, &model, node, 10), ["car", "care", "cat"]);
    }

    #[test]
    fn completions_respect_the_limit() {
        let (trie, model) = build(&["cat", "car", "care"]);
        let node = trie.lookup("c").unwrap();
        assert_eq!(texts(&trie, &model, node, 2).len(), 2);
    }

    #[test]
    fn cache_stays_bounded_and_keeps_the_best() {
        let mut trie = Trie::new();
        let mut model = FrequencyModel::new();
        // 15 sibling words, weights 1..=15; only the heaviest ten may stay.
        for i in 0..15u32 {
            let word = format!("a{}", (b'a' + i as u8) as char);
            let id = model.get_or_intern(&word);
            for _ in 0..=i {
                model.observe(id, None, None);
            }
            trie.insert(&word, id, &model);
        }
        let node = trie.lookup("a").unwrap();
        let cached = texts(&trie, &model, node, CACHE_LIMIT);
        assert_eq!(cached.len(), CACHE_LIMIT);
        assert_eq!(cached[0], "ao", "heaviest word ranks first");
        assert!(!cached.contains(&"aa".to_string()), "lightest word was evicted");
    }

    #[test]
    fn refresh_promotes_a_reweighted_word() {
        let mut trie = Trie::new();
        let mut model = FrequencyModel::new();
        for i in 0..12u32 {
            let word = format!("b{}", (b'a' + i as u8) as char);
            let id = model.get_or_intern(&word);
            for _ in 0..=i {
                model.observe(id, None, None);
            }
            trie.insert(&word, id, &model);
        }
        // "ba" (weight 1) was evicted from the full cache. Reward it
        // past everything else and re-qualify it.
        let id = model.lookup("ba").unwrap();
        model.apply_feedback(id, true);
        trie.refresh("ba", id, &model);
        let node = trie.lookup("b").unwrap();
        assert_eq!(texts(&trie, &model, node, 3)[0], "ba");
    }

    #[test]
    fn refresh_ignores_words_outside_the_tree() {
        let (mut trie, mut model) = build(&["cat"]);
        let before = trie.node_count();
        let id = model.get_or_intern("cab");
        model.apply_feedback(id, true);
        trie.refresh("cab", id, &model);
        assert_eq!(trie.node_count(), before, "feedback never grows the tree");
        let node = trie.lookup("ca").unwrap();
        assert_eq!(texts(&trie, &model, node, 10), ["cat"]);
    }
}
