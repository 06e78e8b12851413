use std::sync::LazyLock;

use regex::Regex;

static BRACKETED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\([^)]*\)|\[[^\]]*\]").expect("Invalid bracketed content regex")
});

static PUNCTUATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("Invalid punctuation regex"));

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Lookup key for an ingredient name: lowercase, bracketed content removed,
/// punctuation turned into spaces, whitespace collapsed.
pub fn normalize_ingredient_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let without_brackets = BRACKETED_REGEX.replace_all(&lowered, "");
    let spaced = PUNCTUATION_REGEX.replace_all(&without_brackets, " ");

    WHITESPACE_REGEX
        .replace_all(&spaced, " ")
        .trim()
        .to_string()
}
