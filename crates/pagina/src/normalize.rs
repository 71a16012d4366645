//! Identifier normalization for user-facing field and page names.
//!
//! Every place a free-form name ("My Field", "The Login Button") becomes a
//! map key goes through [`normalize`], so that case, whitespace, punctuation
//! and English filler words never cause a lookup miss.

use regex::Regex;
use std::sync::OnceLock;

fn filler_words() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(a|an|the)\b").expect("static pattern compiles"))
}

/// Convert a free-form name into a stable lookup key.
///
/// Rules, in order: empty/whitespace input yields the empty key; the filler
/// words "a", "an", "the" are stripped at word boundaries, case-insensitively;
/// all non-alphanumeric characters (including spaces) are removed; the
/// remainder is lower-cased. Deterministic, pure, and never fails.
///
/// # Example
///
/// ```
/// use pagina::normalize;
///
/// assert_eq!(normalize("The My Field"), "myfield");
/// assert_eq!(normalize("my field"), "myfield");
/// ```
#[must_use]
pub fn normalize(name: &str) -> String {
    if name.trim().is_empty() {
        return String::new();
    }
    let stripped = filler_words().replace_all(name, "");
    let key: String = stripped
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .flat_map(char::to_lowercase)
        .collect();
    // Removing punctuation can collapse scattered letters into a bare filler
    // word ("t-he" -> "the"); a key must be stable under re-normalization
    if matches!(key.as_str(), "a" | "an" | "the") {
        return String::new();
    }
    key
}

/// Compare a free-form name against an already-normalized key.
///
/// Equivalent to `normalize(name) == key` when `key` is already in
/// normalized form.
#[must_use]
pub fn equals_normalized(name: &str, key: &str) -> bool {
    normalize(name) == key
}
