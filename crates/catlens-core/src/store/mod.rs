//! Persisted state: a process-wide key-value store holding the extension
//! settings and the mapping cache under fixed key names.
//!
//! All writers are last-writer-wins; there is no versioning.

mod file;
mod memory;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::cache::MappingCache;
use crate::settings::Settings;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Key of the settings object.
pub const CONFIG_KEY: &str = "algoliaCategoryHelper_config";
/// Key of the id → label mapping object.
pub const MAPPINGS_KEY: &str = "algoliaCategoryHelper_mappings";

/// Raw JSON key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// Settings plus mappings, as returned by `GET_STATE`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub config: Settings,
    pub mappings: MappingCache,
}

/// Typed access to the two persisted objects.
#[derive(Clone)]
pub struct StateStore {
    kv: Arc<dyn KeyValueStore>,
}

impl StateStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// In-memory store (tests, dry runs).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()))
    }

    /// Settings, or defaults when nothing (or something unreadable) is stored.
    pub fn settings(&self) -> Result<Settings> {
        let Some(value) = self.kv.get(CONFIG_KEY)? else {
            return Ok(Settings::default());
        };
        match serde_json::from_value(value) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                tracing::warn!("stored settings unreadable, using defaults: {}", e);
                Ok(Settings::default())
            }
        }
    }

    pub fn mappings(&self) -> Result<MappingCache> {
        Ok(self
            .kv
            .get(MAPPINGS_KEY)?
            .map(|v| MappingCache::from_value(&v))
            .unwrap_or_default())
    }

    pub fn state(&self) -> Result<State> {
        Ok(State {
            config: self.settings()?,
            mappings: self.mappings()?,
        })
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let value = serde_json::to_value(settings).context("serialize settings")?;
        self.kv.set(CONFIG_KEY, value)
    }

    /// Replace the whole stored mapping.
    pub fn set_mappings(&self, mappings: &MappingCache) -> Result<()> {
        let value = serde_json::to_value(mappings).context("serialize mappings")?;
        self.kv.set(MAPPINGS_KEY, value)
    }
}
