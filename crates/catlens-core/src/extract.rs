//! Field-path label extraction from a search hit.
//!
//! A field path is a dot-delimited walk into the hit (`categories`,
//! `hierarchy.lvl0`). The value at the end of the walk is interpreted as:
//! - a list of `{id, name}` objects (searched flat, then one nested level deeper),
//! - a single `{id, name}` object,
//! - or a plain string label.

use serde_json::Value;

use crate::cache::is_valid_label;

/// Split a comma-separated path spec into trimmed, non-empty paths.
pub fn split_paths(spec: &str) -> Vec<&str> {
    spec.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Extract the label for `id` from `hit`, trying `paths` in order.
///
/// The first path that yields a label wins; that label is then accepted only
/// if it is non-empty and within the length limit.
pub fn extract_label(hit: &Value, id: &str, paths: &[&str]) -> Option<String> {
    let label = paths.iter().find_map(|path| label_at_path(hit, id, path))?;
    is_valid_label(&label).then_some(label)
}

fn label_at_path(hit: &Value, id: &str, path: &str) -> Option<String> {
    let value = walk(hit, path)?;
    if !truthy(value) {
        return None;
    }
    match value {
        Value::Array(items) => find_in_list(items, id).or_else(|| {
            items
                .iter()
                .filter_map(Value::as_array)
                .find_map(|nested| find_in_list(nested, id))
        }),
        Value::Object(_) => {
            if id_matches(value, id) {
                value.get("name").filter(|n| truthy(n)).and_then(js_string)
            } else {
                None
            }
        }
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Descend through object keys (or array indices). Fails on any missing or scalar step.
fn walk<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut value = root;
    for part in path.split('.') {
        value = match value {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(value)
}

/// First element whose `id` matches; its `name` is the label if truthy.
fn find_in_list(items: &[Value], id: &str) -> Option<String> {
    let found = items.iter().find(|item| id_matches(item, id))?;
    found
        .get("name")
        .filter(|n| truthy(n))
        .and_then(js_string)
}

fn id_matches(item: &Value, id: &str) -> bool {
    item.get("id")
        .and_then(js_string)
        .is_some_and(|candidate| candidate == id)
}

/// Scalar stringification; integral floats print without a fractional part.
fn js_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                return Some(n.to_string());
            }
            let f = n.as_f64()?;
            if f.fract() == 0.0 && f.abs() < 1e21 {
                Some(format!("{}", f as i64))
            } else {
                Some(f.to_string())
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
