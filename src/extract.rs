//! HTML to plain-text extraction.
//!
//! Article pages arrive as arbitrary HTML. The summarizer only needs a short
//! run of readable text, so extraction is deliberately blunt:
//!
//! 1. Drop `<script>` and `<style>` blocks together with their content
//! 2. Drop every remaining tag, plus any stray angle bracket
//! 3. Collapse whitespace and trim
//! 4. Keep the first [`MAX_TEXT_CHARS`] characters

use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound on the extracted text, in characters.
pub const MAX_TEXT_CHARS: usize = 1024;

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap());
static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip markup from `html` and return at most [`MAX_TEXT_CHARS`] characters
/// of whitespace-normalized text. Never fails; the result may be empty.
pub fn extract_text(html: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(html, " ");
    let text = STYLE_BLOCK.replace_all(&text, " ");
    let text = TAG.replace_all(&text, " ");
    // Unterminated tags like `<div` survive the pattern above.
    let text = text.replace(['<', '>'], " ");
    let text = WHITESPACE.replace_all(&text, " ");

    text.trim().chars().take(MAX_TEXT_CHARS).collect()
}
