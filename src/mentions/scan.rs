//! Mention scanning
//!
//! A mention is a maximal run of non-whitespace characters that starts with
//! `@` at the beginning of the text or right after whitespace:
//!
//! ```text
//! @README explain @docs/   ->  "README", "docs/"
//! mail me@example.com      ->  (nothing)
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::core::model::Mention;

/// The mention sigil
pub const SIGIL: char = '@';

/// Static regex for mention tokens; group 1 is the token including the sigil
pub static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)(@\S*)").expect("Invalid MENTION_RE regex"));

/// Strip every leading sigil, then surrounding whitespace.
///
/// Returns `None` when nothing is left; such mentions are never resolved.
pub fn normalize_mention(raw: &str) -> Option<String> {
    let normalized = raw.trim().trim_start_matches(SIGIL).trim();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized.to_string())
    }
}

/// Extract mentions in order of appearance, dropping empty ones and repeats
/// of an already-seen normalized form.
pub fn scan(text: &str) -> Vec<Mention> {
    let mut seen = HashSet::new();
    let mut mentions = Vec::new();

    for caps in MENTION_RE.captures_iter(text) {
        let Some(token) = caps.get(1) else {
            continue;
        };

        let Some(normalized) = normalize_mention(token.as_str()) else {
            continue;
        };

        if !seen.insert(normalized.clone()) {
            continue;
        }

        mentions.push(Mention::new(token.as_str(), token.start(), normalized));
    }

    mentions
}

/// Build mentions from an already-split list (tool input).
///
/// Items may contain spaces and the sigil is optional. Offsets are list indices.
pub fn from_list<S: AsRef<str>>(items: &[S]) -> Vec<Mention> {
    let mut seen = HashSet::new();
    let mut mentions = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let raw = item.as_ref();
        let Some(normalized) = normalize_mention(raw) else {
            continue;
        };
        if seen.insert(normalized.clone()) {
            mentions.push(Mention::new(raw, index, normalized));
        }
    }

    mentions
}
