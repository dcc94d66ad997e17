use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::lookup::LookupConfig;
use crate::orchestrator::OrchestratorConfig;

/// Batch lookup parameters (optional `[lookup]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupSection {
    /// Identifiers per multi-query request.
    pub batch_size: usize,
    /// Fixed pause between consecutive batch requests, in milliseconds.
    pub batch_delay_ms: u64,
    /// Maximum uncached identifiers resolved by a single lookup call.
    pub max_ids_per_request: usize,
}

impl Default for LookupSection {
    fn default() -> Self {
        Self {
            batch_size: 20,
            batch_delay_ms: 200,
            max_ids_per_request: 100,
        }
    }
}

/// Page-cycle triggers (optional `[orchestrator]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorSection {
    /// Minimum gap between mutation-triggered cycles, in milliseconds.
    pub debounce_ms: u64,
    /// Number of retry cycles after page load.
    pub max_retries: u32,
    /// Gap between retry cycles, in milliseconds.
    pub retry_interval_ms: u64,
    /// Maximum unresolved identifiers sent per cycle.
    pub max_ids_per_cycle: usize,
}

impl Default for OrchestratorSection {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            max_retries: 10,
            retry_interval_ms: 1000,
            max_ids_per_cycle: 100,
        }
    }
}

/// Host configuration loaded from `~/.config/catlens/config.toml`.
///
/// This is distinct from the extension settings (app id, API key, ...) which
/// live in the persisted state store and are edited through `SAVE_CONFIG`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatlensConfig {
    /// Browser extension id allowed to talk to this host (`chrome-extension://<id>/`).
    #[serde(default)]
    pub extension_id: Option<String>,
    /// Override for the state store file (default: XDG state dir).
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
    /// Override for the search host, e.g. a self-hosted proxy. The multi-query
    /// path is appended. Default: `https://{appId}-dsn.algolia.net`.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Optional connect timeout for search requests. No overall request timeout is applied.
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    #[serde(default)]
    pub lookup: LookupSection,
    #[serde(default)]
    pub orchestrator: OrchestratorSection,
}

impl CatlensConfig {
    /// Lookup tuning derived from the `[lookup]` section and `endpoint`.
    pub fn lookup_config(&self) -> LookupConfig {
        LookupConfig {
            batch_size: self.lookup.batch_size.max(1),
            batch_delay: Duration::from_millis(self.lookup.batch_delay_ms),
            max_ids_per_request: self.lookup.max_ids_per_request,
            endpoint: self.endpoint.clone(),
        }
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            debounce: Duration::from_millis(self.orchestrator.debounce_ms),
            max_retries: self.orchestrator.max_retries,
            retry_interval: Duration::from_millis(self.orchestrator.retry_interval_ms),
            max_ids_per_cycle: self.orchestrator.max_ids_per_cycle,
        }
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    /// State store file: `storage_path` if set, else `$XDG_STATE_HOME/catlens/storage.json`.
    pub fn resolved_storage_path(&self) -> Result<PathBuf> {
        if let Some(p) = &self.storage_path {
            return Ok(p.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("catlens")?;
        Ok(xdg_dirs.get_state_home().join("storage.json"))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("catlens")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CatlensConfig> {
    load_or_init_at(&config_path()?)
}

/// Like `load_or_init` but at an explicit path (tests, `--config`).
pub fn load_or_init_at(path: &Path) -> Result<CatlensConfig> {
    if !path.exists() {
        let default_cfg = CatlensConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write config: {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: CatlensConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
