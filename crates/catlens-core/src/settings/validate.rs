//! Save-time validation of extension settings.

use super::Settings;

/// Why a settings save was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{0} is required when enabled")]
    MissingField(&'static str),
    #[error("Filter field contains invalid characters. Only letters, numbers, dots, underscores, commas, and hyphens are allowed.")]
    InvalidFilterField,
    #[error("Category paths contain invalid characters. Only letters, numbers, dots, underscores, commas, and hyphens are allowed.")]
    InvalidCategoryPaths,
}

/// Field-path spec check: `[a-zA-Z0-9._,-]+` after trimming.
pub fn is_valid_field_path(path: &str) -> bool {
    let p = path.trim();
    !p.is_empty()
        && p
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b',' | b'-'))
}

impl Settings {
    /// Validate before persisting. Disabled settings are stored as-is.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.enabled {
            return Ok(());
        }
        let required = [
            ("Application ID", &self.app_id),
            ("API Key", &self.api_key),
            ("Index name", &self.index_name),
            ("Filter field", &self.filter_field),
            ("Category name paths", &self.category_paths),
        ];
        if let Some((name, _)) = required.iter().find(|(_, v)| v.is_empty()) {
            return Err(SettingsError::MissingField(*name));
        }
        if !is_valid_field_path(&self.filter_field) {
            return Err(SettingsError::InvalidFilterField);
        }
        if !is_valid_field_path(&self.category_paths) {
            return Err(SettingsError::InvalidCategoryPaths);
        }
        Ok(())
    }

    /// Both field-path strings pass [`is_valid_field_path`].
    pub fn field_paths_valid(&self) -> bool {
        is_valid_field_path(&self.filter_field) && is_valid_field_path(&self.category_paths)
    }
}
