use autofill_core::source::{read_corpus, read_vocabulary};
use autofill_core::AutofillEngine;
use crossterm::execute;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use std::error::Error;
use std::io::{self, stdin, stdout};
use std::path::Path;
use tracing_subscriber::EnvFilter;

const DICTIONARY_PATH: &str = "autofill_dictionary.bin";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    if let Err(err) = run() {
        eprintln!("autofill: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let vocabulary_path = args.next();
    let corpus_path = args.next();

    let mut engine = AutofillEngine::from_file_or_new(DICTIONARY_PATH);
    // A saved dictionary wins; vocabulary/corpus only seed a fresh engine.
    if engine.word_count() == 0 {
        if let Some(path) = &vocabulary_path {
            engine.seed_vocabulary(read_vocabulary(Path::new(path))?);
        }
        if let Some(path) = &corpus_path {
            engine.train(read_corpus(Path::new(path))?);
        }
    }

    println!("Smart autofill demo. Known words: {}.", engine.word_count());
    println!("Usage: autofill_repl [vocabulary.txt] [old_messages.txt]");
    println!("Type a word and press [Enter] to watch the per-letter guesses.");
    println!("'exit' saves the dictionary and quits.");
    println!("---------------------------------------------------------------");

    let mut word_position = 0usize;
    let mut input = String::new();
    loop {
        prompt()?;
        input.clear();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        match input.trim() {
            "exit" => break,
            "" => continue,
            word => {
                let accepted = simulate_word(&mut engine, word, word_position)?;
                engine.feedback(accepted, Some(word));
                word_position += 1;
                let (last, second_last) = engine.recent_words();
                println!("Context: {:?} {:?}\n", second_last, last);
            }
        }
    }

    println!("\nSaving dictionary...");
    if let Err(e) = engine.save_dictionary() {
        eprintln!("[ERROR] Could not save dictionary: {e}");
    } else {
        println!("Dictionary saved to '{DICTIONARY_PATH}'");
    }
    Ok(())
}

/// Feeds a word through the engine letter by letter, echoing the three
/// guess slots per keystroke. Returns whether the top guess ever matched,
/// which doubles as the acceptance signal for feedback.
fn simulate_word(
    engine: &mut AutofillEngine,
    word: &str,
    word_position: usize,
) -> io::Result<bool> {
    let mut out = stdout();
    let mut prefix = String::new();
    let mut accepted = false;
    for (i, letter) in word.chars().enumerate() {
        prefix.push(letter);
        let guesses = engine.guess(letter, i, word_position);
        if guesses[0].as_deref() == Some(word) {
            accepted = true;
        }
        execute!(
            out,
            SetForegroundColor(Color::Cyan),
            Print(format!("  [{prefix:<12}]")),
            ResetColor,
            Print(" -> ")
        )?;
        for guess in &guesses {
            match guess.as_deref() {
                Some(text) if text == word => execute!(
                    out,
                    SetForegroundColor(Color::Green),
                    Print(format!("{text}  ")),
                    ResetColor
                )?,
                Some(text) => execute!(out, Print(format!("{text}  ")))?,
                None => execute!(
                    out,
                    SetAttribute(Attribute::Dim),
                    Print("-  "),
                    SetAttribute(Attribute::Reset)
                )?,
            }
        }
        execute!(out, Print("\n"))?;
    }
    Ok(accepted)
}

fn prompt() -> io::Result<()> {
    execute!(
        stdout(),
        SetAttribute(Attribute::Bold),
        Print("> "),
        SetAttribute(Attribute::Reset)
    )
}
