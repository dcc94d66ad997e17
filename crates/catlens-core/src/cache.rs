//! Identifier → label mapping cache.
//!
//! The cache itself is a plain value; persistence goes through
//! [`StateStore`](crate::store::StateStore), which always writes the whole map.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::ident::sanitize_id;

/// Longest label accepted into the cache.
pub const MAX_LABEL_LEN: usize = 500;

/// True if `label` is non-empty and at most [`MAX_LABEL_LEN`] characters.
pub fn is_valid_label(label: &str) -> bool {
    !label.is_empty() && label.chars().count() <= MAX_LABEL_LEN
}

/// How imported entries combine with the current cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Imported entries are added; they replace existing values for the same id.
    #[default]
    Merge,
    /// The cache is replaced by the imported entries.
    Overwrite,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingCache {
    entries: BTreeMap<String, String>,
}

impl MappingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a stored JSON object, keeping only well-formed entries.
    /// Anything that is not an object yields an empty cache.
    pub fn from_value(value: &Value) -> Self {
        let entries = value
            .as_object()
            .map(|map| {
                map.iter()
                    .filter_map(|(id, label)| {
                        let id = sanitize_id(id)?;
                        let label = label.as_str().filter(|l| is_valid_label(l))?;
                        Some((id.to_string(), label.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { entries }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Insert one entry if both id and label are valid. Returns whether it was stored.
    pub fn insert(&mut self, id: &str, label: &str) -> bool {
        match sanitize_id(id) {
            Some(id) if is_valid_label(label) => {
                self.entries.insert(id.to_string(), label.to_string());
                true
            }
            _ => false,
        }
    }

    /// Merge `other` into `self`; `other` wins on key collision.
    pub fn merge(&mut self, other: &MappingCache) {
        for (id, label) in &other.entries {
            self.entries.insert(id.clone(), label.clone());
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Pretty JSON object, suitable for a backup file.
    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize mappings")
    }

    /// Parse an exported file. The top level must be a JSON object; invalid entries are skipped.
    pub fn parse_import(json: &str) -> Result<MappingCache> {
        let value: Value = serde_json::from_str(json).context("parse mappings JSON")?;
        if !value.is_object() {
            anyhow::bail!("mappings file must contain a JSON object of id -> label");
        }
        Ok(Self::from_value(&value))
    }

    /// Combine imported entries according to `mode`.
    pub fn import(&mut self, incoming: &MappingCache, mode: ImportMode) {
        if mode == ImportMode::Overwrite {
            self.entries.clear();
        }
        self.merge(incoming);
    }
}

impl FromIterator<(String, String)> for MappingCache {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut cache = MappingCache::new();
        for (id, label) in iter {
            cache.insert(&id, &label);
        }
        cache
    }
}
