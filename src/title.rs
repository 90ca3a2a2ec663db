//! Navigation labels from document filenames.
//!
//! Repository docs use `SCREAMING_SNAKE` filenames. Labels are title-cased
//! word by word, with short acronyms and English small words treated
//! specially:
//! - `CODE_OF_CONDUCT.md` → "Code of Conduct"
//! - `TESTING_QUICKSTART.md` → "Testing Quickstart"
//! - `CLI.md` → "CLI"
//! - `AWS_SETUP.md` → "AWS Setup"

const SMALL_WORDS: &[&str] = &["of", "and", "or", "the", "a", "an", "in", "on", "at", "by"];

/// Derive a human-readable label from a (flattened) markdown filename.
///
/// Only the last path component is used, so `guide/SETUP.md` → "Setup".
pub fn title(flattened_filename: &str) -> String {
    let file_name = flattened_filename
        .rsplit('/')
        .next()
        .unwrap_or(flattened_filename);
    let name = file_name.strip_suffix(".md").unwrap_or(file_name);

    name.split('_')
        .enumerate()
        .map(|(i, word)| title_word(i, word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_word(index: usize, word: &str) -> String {
    let lower = word.to_lowercase();
    let is_small = SMALL_WORDS.contains(&lower.as_str());

    if word.chars().count() <= 3 && is_all_upper(word) && !is_small {
        word.to_string()
    } else if is_small && index > 0 {
        lower
    } else {
        capitalize(word)
    }
}

/// At least one cased character and no lowercase ones (`"V2"` counts).
fn is_all_upper(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
