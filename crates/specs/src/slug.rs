// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slugify goal text into the kebab-case name component of a spec id.

const STOP_WORDS: &[&str] = &[
    "the",
    "a",
    "an",
    "is",
    "are",
    "was",
    "were",
    "be",
    "been",
    "being",
    "have",
    "has",
    "had",
    "do",
    "does",
    "did",
    "will",
    "would",
    "shall",
    "should",
    "may",
    "might",
    "must",
    "can",
    "could",
    "to",
    "of",
    "in",
    "for",
    "on",
    "with",
    "at",
    "by",
    "from",
    "as",
    "into",
    "through",
    "during",
    "before",
    "after",
    "above",
    "below",
    "between",
    "out",
    "off",
    "over",
    "under",
    "again",
    "further",
    "then",
    "once",
    "that",
    "this",
    "these",
    "those",
    "and",
    "but",
    "or",
    "nor",
    "not",
    "so",
    "yet",
    "both",
    "each",
    "every",
    "all",
    "any",
    "few",
    "more",
    "most",
    "other",
    "some",
    "such",
    "no",
    "only",
    "own",
    "same",
    "than",
    "too",
    "very",
    "just",
    "about",
    "also",
    "its",
    "it",
    "we",
    "our",
    "currently",
    "when",
    "which",
    "what",
];

/// Slugify a string into a kebab-case name component.
///
/// Lowercases, replaces non-alphanumeric runs with a single hyphen, drops
/// stop words, collapses hyphens, and truncates to `max_len` characters
/// (trimming a trailing hyphen left by truncation).
pub fn slugify(input: &str, max_len: usize) -> String {
    let lower = input.to_lowercase();

    let mut slug = String::with_capacity(lower.len());
    let mut last_was_hyphen = false;
    for ch in lower.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    let filtered: Vec<&str> = slug
        .split('-')
        .filter(|word| !word.is_empty() && !STOP_WORDS.contains(word))
        .collect();
    let mut result = filtered.join("-");

    let trimmed = result.trim_matches('-');
    if trimmed.len() != result.len() {
        result = trimmed.to_string();
    }

    if result.len() > max_len {
        result.truncate(max_len);
    }

    let trimmed = result.trim_end_matches('-');
    if trimmed.len() != result.len() {
        result = trimmed.to_string();
    }

    result
}

/// Slugify goal text into the name component of a spec id (§3 "kebab-case
/// name prefixed by two-part numbering"). Falls back to `"spec"` when the
/// goal text slugifies to nothing (all stop words, or no alphanumerics).
pub fn spec_slug(goal_text: &str, max_len: usize) -> String {
    let slug = slugify(goal_text, max_len);
    if slug.is_empty() {
        "spec".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
#[path = "slug_tests.rs"]
mod tests;
