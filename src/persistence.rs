// File: src/persistence.rs
use crate::core::context::SessionContext;
use crate::core::engine::AutofillEngine;
use crate::core::model::FrequencyModel;
use crate::core::trie::Trie;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("dictionary io: {0}")]
    Io(#[from] std::io::Error),
    #[error("dictionary encoding: {0}")]
    Codec(#[from] bincode::Error),
    #[error("dictionary replace: {0}")]
    Replace(#[from] tempfile::PersistError),
}

/// The learned slice of an engine. The in-flight buffer and cursor are
/// skipped by the session's own serde attributes, so a loaded engine
/// always starts at a word boundary with its rolling context intact.
#[derive(Serialize, Deserialize)]
struct SerializableState {
    trie: Trie,
    model: FrequencyModel,
    session: SessionContext,
}

/// Writes the dictionary next to its final location and renames it into
/// place, so a crash mid-write never clobbers the previous snapshot.
pub fn save_to_disk(engine: &AutofillEngine, path: &Path) -> Result<(), PersistError> {
    let parent_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let state = SerializableState {
        trie: engine.trie.clone(),
        model: engine.model.clone(),
        session: engine.session.clone(),
    };

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    let writer = BufWriter::new(&temp_file);
    bincode::serialize_into(writer, &state)?;
    temp_file.persist(path)?;
    Ok(())
}

pub fn load_from_disk(path: &Path) -> Result<AutofillEngine, PersistError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let state: SerializableState = bincode::deserialize_from(reader)?;
    Ok(AutofillEngine::from_parts(state.trie, state.model, state.session))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_word(engine: &mut AutofillEngine, word: &str, word_position: usize) -> Vec<Option<String>> {
        let mut last = Vec::new();
        for (i, letter) in word.chars().enumerate() {
            last = engine.guess(letter, i, word_position).to_vec();
        }
        last
    }

    #[test]
    fn round_trip_preserves_guesses_and_context() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dict.bin");

        let mut engine = AutofillEngine::new(["cat", "car", "care", "dog"]);
        engine.train("the care the care".split_whitespace());
        engine.feedback(true, Some("the"));
        save_to_disk(&engine, &path).expect("save");

        let mut reloaded = load_from_disk(&path).expect("load");
        assert_eq!(reloaded.word_count(), engine.word_count());
        assert_eq!(reloaded.recent_words().0, Some("the"));
        assert_eq!(
            type_word(&mut reloaded, "ca", 1),
            type_word(&mut engine, "ca", 1),
        );
    }

    #[test]
    fn save_handles_a_bare_file_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let old = std::env::current_dir().expect("cwd");
        std::env::set_current_dir(dir.path()).expect("chdir");
        let engine = AutofillEngine::new(["cat"]);
        let result = save_to_disk(&engine, Path::new("dict.bin"));
        std::env::set_current_dir(old).expect("chdir back");
        result.expect("save with no parent directory");
    }
}
