use std::sync::LazyLock;

use regex::Regex;

/// Shortest cleaned text worth sending to analysis.
pub const MIN_TEXT_LENGTH: usize = 5;

/// Single-character tokens that survive cleaning.
const KEPT_SINGLE_CHARS: &[&str] = &["(", ")", ",", "."];

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

static DISALLOWED_CHARS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s.,()%\-:]").expect("Invalid character filter regex"));

/// Normalizes raw OCR output into something the analyzers can read.
pub fn clean_extracted_text(raw: &str) -> String {
    let collapsed = WHITESPACE_REGEX.replace_all(raw, " ");
    let filtered = DISALLOWED_CHARS_REGEX.replace_all(&collapsed, "");

    filtered
        .trim()
        .split(' ')
        .filter(|token| token.chars().count() > 1 || KEPT_SINGLE_CHARS.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}
