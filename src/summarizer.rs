//! Extractive fallback summarizer.
//!
//! Used when the inference API cannot produce a summary. It keeps the first
//! few sentences of the article text. Sentence boundaries are found with a
//! heuristic: a `.`, `?` or `!` followed by whitespace ends a sentence unless
//! the period closes an initial (`J.`), a common title (`Mr.`, `Dr.`) or a
//! dotted abbreviation (`U.S.`). It will get some boundaries wrong, which is acceptable for a
//! degraded-mode summary.

use itertools::Itertools;

/// Number of sentences kept when the caller has no preference.
pub const DEFAULT_SENTENCES: usize = 3;

/// Returned for empty input.
pub const NO_CONTENT: &str = "No content available for summarization.";

/// Summarize `text` by keeping its first `max_sentences` sentences.
///
/// Text with `max_sentences` or fewer sentences is returned unchanged.
pub fn fallback_summary(text: &str, max_sentences: usize) -> String {
    if text.trim().is_empty() {
        return NO_CONTENT.to_string();
    }

    let sentences = split_sentences(text);
    if sentences.len() <= max_sentences {
        return text.to_string();
    }

    sentences.into_iter().take(max_sentences).join(" ")
}

/// Split `text` into trimmed, non-empty sentences.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '?' | '!') {
            continue;
        }
        let followed_by_space = chars.peek().is_some_and(|&(_, next)| next.is_whitespace());
        if !followed_by_space {
            continue;
        }
        if c == '.' && is_abbreviation(&text[start..idx]) {
            continue;
        }

        let end = idx + c.len_utf8();
        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = end;
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Whether the word right before a period looks like an abbreviation.
///
/// `preceding` is the text from the start of the current sentence up to, but
/// not including, the period.
fn is_abbreviation(preceding: &str) -> bool {
    let word = preceding
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default()
        .trim_start_matches(|c: char| !c.is_alphanumeric());

    let mut letters = word.chars();
    match (letters.next(), letters.next()) {
        // Initials: "J. R. R. Tolkien"
        (Some(a), None) => a.is_alphabetic(),
        // Dotted forms: "U.S.", "e.g.", "i.e."
        _ => TITLES.contains(&word) || word.contains('.'),
    }
}

/// Titles that are almost always followed by a name, not a sentence break.
const TITLES: &[&str] = &["Mr", "Mrs", "Ms", "Dr", "St", "Jr", "Sr", "Prof"];
