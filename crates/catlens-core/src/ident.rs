//! Identifier rules: intake sanitization for lookups and the DOM heuristic
//! for text that looks like a category id.

use serde_json::Value;
use std::collections::HashSet;

/// Longest identifier accepted at lookup intake.
pub const MAX_ID_LEN: usize = 200;

/// True if `s` is a non-empty run of `[a-zA-Z0-9_-]`.
pub fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Trim and validate one raw identifier. `None` if empty, too long, or outside the class.
pub fn sanitize_id(raw: &str) -> Option<&str> {
    let id = raw.trim();
    if id.is_empty() || id.len() > MAX_ID_LEN || !is_identifier(id) {
        return None;
    }
    Some(id)
}

/// Sanitize a JSON list of identifiers: non-strings and invalid entries are
/// dropped, duplicates collapsed, first-seen order kept.
pub fn sanitize_ids(raw: &[Value]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .filter_map(Value::as_str)
        .filter_map(sanitize_id)
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// DOM heuristic: digits or slug-ish text, at least two characters, and not a year like `2024`.
pub fn looks_like_category_id(text: &str) -> bool {
    let t = text.trim();
    if t.len() < 2 {
        return false;
    }
    if !t.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        return false;
    }
    !is_year(t)
}

fn is_year(t: &str) -> bool {
    t.len() == 4 && t.starts_with("20") && t.bytes().all(|b| b.is_ascii_digit())
}
