//! Shared normalization functions for award/catalog matching.
//! Used for both the awards ledger and the streaming catalog.
//!
//! CRITICAL: Both sides of every comparison go through these functions.
//! Any change here shifts every match key; run tests after changes.

use once_cell::sync::Lazy;
use regex::Regex;

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Conjunction markers between contributors: "feat.", "featuring", "ft.", "&", "and".
/// Surrounding whitespace is consumed so "a & b" and "a&b" fold to the same key.
/// Applied after lower-casing, so no case-insensitive flag is needed.
pub static CONJUNCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*(?:feat\.|featuring|ft\.|&|and)\s*").unwrap());

/// Regex to collapse runs of whitespace into a single space
pub static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// ============================================================================
// NORMALIZATION FUNCTIONS
// ============================================================================

/// Canonicalize free text into a comparable key.
///
/// Missing input maps to the empty string. Otherwise the text is lower-cased,
/// trimmed, conjunction markers become `;` and whitespace runs collapse to one
/// space. The function is total and idempotent.
pub fn normalize(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };
    let lowered = text.to_lowercase();
    let replaced = CONJUNCTION.replace_all(lowered.trim(), ";");
    MULTI_SPACE.replace_all(&replaced, " ").trim().to_string()
}

/// Normalize a comma-joined contributor list.
/// Commas become `;` so "A, B" and "A & B" compare as the same token set.
pub fn normalize_artist_list(artists: Option<&str>) -> String {
    normalize(artists).replace(',', ";")
}

/// Title prefix used by the partial match phase: everything before the first
/// `(`, trimmed. "bohemian rhapsody (live aid)" → "bohemian rhapsody"
pub fn title_stem(title_norm: &str) -> &str {
    title_norm.split('(').next().unwrap_or("").trim()
}

// ============================================================================
// TESTS
// ============================================================================
