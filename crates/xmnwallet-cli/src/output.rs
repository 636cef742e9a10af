//! Output formatting for human-readable and JSON modes.
//!
//! Human mode uses colored terminal output.
//! JSON mode outputs pure JSON with no ANSI escapes.

use colored::Colorize;
use serde::Serialize;

/// Prints a success message.
pub fn print_success(msg: &str, json_mode: bool) {
    if json_mode {
        let obj = serde_json::json!({ "status": "ok", "message": msg });
        println!("{}", obj);
    } else {
        println!("{} {}", "✓".green().bold(), msg);
    }
}

/// Prints a single key-value pair.
pub fn print_kv(key: &str, value: &str, json_mode: bool) {
    if json_mode {
        let obj = serde_json::json!({ key: value });
        println!("{}", obj);
    } else {
        println!("{}: {}", key.bold(), value);
    }
}

/// Prints a serializable value as JSON, or pretty JSON in human mode.
pub fn print_value<T: Serialize>(value: &T, json_mode: bool) {
    let rendered = if json_mode {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    match rendered {
        Ok(s) => println!("{s}"),
        Err(e) => print_error(&format!("json serialization failed: {e}"), json_mode),
    }
}

/// Prints seed words as a numbered grid, or `{"words": [...]}`.
pub fn print_words(words: &[String], json_mode: bool) {
    if json_mode {
        let obj = serde_json::json!({ "count": words.len(), "words": words });
        println!("{}", obj);
        return;
    }

    let width = words.iter().map(|w| w.chars().count()).max().unwrap_or(0);
    for (row_index, row) in words.chunks(4).enumerate() {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, word)| {
                let n = format!("{:>2}.", row_index * 4 + i + 1);
                let padded = format!("{:<width$}", word, width = width);
                format!("{} {}", n.dimmed(), padded.bold())
            })
            .collect();
        println!("{}", cells.join("  "));
    }
}

/// Prints an error message.
pub fn print_error(msg: &str, json_mode: bool) {
    if json_mode {
        let obj = serde_json::json!({ "error": msg });
        eprintln!("{}", obj);
    } else {
        eprintln!("{} {}", "error:".red().bold(), msg);
    }
}

/// Prints a warning in human mode; silent in JSON mode.
pub fn print_warning(msg: &str, json_mode: bool) {
    if !json_mode {
        eprintln!("{} {}", "warning:".yellow().bold(), msg);
    }
}
