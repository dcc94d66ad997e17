//! Extension settings: search account, index, field paths, and the on/off switch.
//!
//! Stored under a fixed key in the state store. Created with defaults (empty,
//! disabled) on first load and only ever replaced through a validated save.

mod validate;

use serde::{Deserialize, Serialize};

pub use validate::{is_valid_field_path, SettingsError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub app_id: String,
    pub api_key: String,
    pub index_name: String,
    /// Comma-separated filter field names; the id is matched against any of them.
    pub filter_field: String,
    /// Comma-separated dot paths used to locate the label in a hit.
    pub category_paths: String,
    pub enabled: bool,
}

/// Partial settings from a save request; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub app_id: Option<String>,
    pub api_key: Option<String>,
    pub index_name: Option<String>,
    pub filter_field: Option<String>,
    pub category_paths: Option<String>,
    pub enabled: Option<bool>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == SettingsPatch::default()
    }
}

impl Settings {
    /// Merge a patch over the current values. String fields are trimmed.
    pub fn apply(&self, patch: &SettingsPatch) -> Settings {
        let pick = |new: &Option<String>, old: &String| {
            new.as_deref().map(str::trim).unwrap_or(old).to_string()
        };
        Settings {
            app_id: pick(&patch.app_id, &self.app_id),
            api_key: pick(&patch.api_key, &self.api_key),
            index_name: pick(&patch.index_name, &self.index_name),
            filter_field: pick(&patch.filter_field, &self.filter_field),
            category_paths: pick(&patch.category_paths, &self.category_paths),
            enabled: patch.enabled.unwrap_or(self.enabled),
        }
    }

    /// All fields a lookup needs are present.
    pub fn is_complete(&self) -> bool {
        [
            &self.app_id,
            &self.api_key,
            &self.index_name,
            &self.filter_field,
            &self.category_paths,
        ]
        .iter()
        .all(|v| !v.is_empty())
    }

    /// Enabled and complete: lookups may hit the network.
    pub fn is_ready(&self) -> bool {
        self.enabled && self.is_complete()
    }

    /// API key with everything but the last four characters masked.
    pub fn masked_api_key(&self) -> String {
        let n = self.api_key.chars().count();
        if n <= 4 {
            return "*".repeat(n);
        }
        let tail: String = self.api_key.chars().skip(n - 4).collect();
        format!("{}{}", "*".repeat(n - 4), tail)
    }

    /// One-line status summary, as shown next to the settings form.
    pub fn status_line(&self, mapping_count: usize) -> String {
        if self.enabled
            && !self.app_id.is_empty()
            && !self.api_key.is_empty()
            && !self.index_name.is_empty()
        {
            format!("Active · {} mapping(s)", mapping_count)
        } else if self.enabled {
            "Config incomplete".to_string()
        } else {
            "Disabled".to_string()
        }
    }
}
