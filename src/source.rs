// File: src/source.rs
//
// External loaders. The engine itself assumes pre-validated streams;
// everything here either delivers a complete, valid sequence or fails
// before any engine state is touched.
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn io_err(path: &Path, source: std::io::Error) -> SourceError {
    SourceError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Reads a vocabulary file: one word per line, trimmed and lowercased,
/// blank lines skipped.
pub fn read_vocabulary(path: &Path) -> Result<Vec<String>, SourceError> {
    let file = fs::File::open(path).map_err(|e| io_err(path, e))?;
    let reader = BufReader::new(file);
    let mut words = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| io_err(path, e))?;
        let word = line.trim().to_lowercase();
        if !word.is_empty() {
            words.push(word);
        }
    }
    debug!(words = words.len(), path = %path.display(), "vocabulary loaded");
    Ok(words)
}

/// Reads a corpus of prior messages and tokenizes it for training.
/// Non-UTF-8 bytes are replaced rather than rejected; they act as word
/// boundaries like any other non-letter.
pub fn read_corpus(path: &Path) -> Result<Vec<String>, SourceError> {
    let bytes = fs::read(path).map_err(|e| io_err(path, e))?;
    let tokens = tokenize(&String::from_utf8_lossy(&bytes));
    debug!(tokens = tokens.len(), path = %path.display(), "corpus loaded");
    Ok(tokens)
}

/// Splits raw text into lowercase tokens: every character outside the
/// ASCII alphabet is a boundary.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_ascii_lowercase())
        .collect()
}
