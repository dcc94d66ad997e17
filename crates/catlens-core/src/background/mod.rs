//! Background service: owns the persisted state and answers extension messages.
//!
//! Every message gets exactly one [`Response`]. Sender checks run before the
//! message type is even looked at.

mod message;


use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::badge::Badge;
use crate::cache::{ImportMode, MappingCache};
use crate::config::CatlensConfig;
use crate::lookup::{BatchLookup, LookupError, LookupOutcome};
use crate::search::CurlTransport;
use crate::settings::{Settings, SettingsPatch};
use crate::store::{JsonFileStore, State, StateStore};

pub use message::{
    Request, Response, Sender, INVALID_PAYLOAD, MESSAGE_TYPES, UNAUTHORIZED_SENDER,
    UNKNOWN_MESSAGE_TYPE,
};

pub struct Background {
    store: StateStore,
    lookup: BatchLookup,
    /// Extension id allowed to send messages; `None` accepts only local senders.
    extension_id: Option<String>,
    badge: Mutex<Badge>,
}

impl Background {
    pub fn new(store: StateStore, lookup: BatchLookup, extension_id: Option<String>) -> Self {
        let count = match store.mappings() {
            Ok(m) => m.len(),
            Err(e) => {
                tracing::warn!("could not read mappings for badge: {:#}", e);
                0
            }
        };
        Self {
            store,
            lookup,
            extension_id,
            badge: Mutex::new(Badge::for_mapping_count(count)),
        }
    }

    /// File-backed store plus libcurl transport, as configured in config.toml.
    pub fn from_config(cfg: &CatlensConfig) -> Result<Self> {
        let path = cfg.resolved_storage_path()?;
        let kv = JsonFileStore::open(&path)
            .with_context(|| format!("open state store {}", path.display()))?;
        let transport = Arc::new(CurlTransport::new(cfg.connect_timeout()));
        Ok(Self::new(
            StateStore::new(Arc::new(kv)),
            BatchLookup::new(transport, cfg.lookup_config()),
            cfg.extension_id.clone(),
        ))
    }

    /// The sender identity this service trusts.
    pub fn own_sender(&self) -> Sender {
        Sender {
            id: self.extension_id.clone(),
        }
    }

    pub fn is_authorized(&self, sender: &Sender) -> bool {
        sender.id == self.extension_id
    }

    /// Answer one raw message.
    pub async fn handle(&self, sender: &Sender, raw: Value) -> Response {
        if !self.is_authorized(sender) {
            tracing::warn!(sender = ?sender.id, "rejected message from unauthorized sender");
            return Response::error(UNAUTHORIZED_SENDER);
        }
        match Request::parse(raw) {
            Ok(request) => self.dispatch(request).await,
            Err(message) => Response::error(message),
        }
    }

    async fn dispatch(&self, request: Request) -> Response {
        match request {
            Request::GetState => match self.get_state() {
                Ok(state) => Response {
                    success: true,
                    state: Some(state),
                    ..Default::default()
                },
                Err(e) => {
                    tracing::warn!("GET_STATE failed: {:#}", e);
                    Response::error(e.to_string())
                }
            },
            Request::SaveConfig { config } => match self.save_config(&config) {
                Ok(_) => Response::ok(),
                Err(e) => Response::error(e.to_string()),
            },
            Request::AlgoliaLookup { ids } => match self.lookup(&ids).await {
                Ok(outcome) => Response {
                    success: true,
                    labels: Some(outcome.labels),
                    fetched: (outcome.requested > 0).then_some(outcome.fetched),
                    ..Default::default()
                },
                Err(e) => {
                    if let LookupError::Failed(source) = &e {
                        tracing::warn!("lookup failed: {:#}", source);
                    }
                    Response::error(e.to_string())
                }
            },
            Request::SetMappings { mappings } => {
                if !mappings.is_object() {
                    return Response::error(INVALID_PAYLOAD);
                }
                match self.set_mappings(&MappingCache::from_value(&mappings)) {
                    Ok(()) => Response::ok(),
                    Err(e) => {
                        tracing::warn!("SET_MAPPINGS failed: {:#}", e);
                        Response::error(e.to_string())
                    }
                }
            }
        }
    }

    pub fn get_state(&self) -> Result<State> {
        self.store.state()
    }

    /// Merge `patch` over the stored settings, validate, and persist.
    pub fn save_config(&self, patch: &SettingsPatch) -> Result<Settings> {
        let current = self.store.settings()?;
        let next = current.apply(patch);
        next.validate()?;
        self.store
            .save_settings(&next)
            .context("Failed to save config")?;
        tracing::info!(enabled = next.enabled, index = %next.index_name, "config saved");
        Ok(next)
    }

    /// Resolve `ids`; new labels are merged into the stored cache.
    pub async fn lookup(&self, ids: &Value) -> Result<LookupOutcome, LookupError> {
        let state = self.store.state().map_err(LookupError::Failed)?;
        let outcome = self
            .lookup
            .lookup(ids, &state.config, &state.mappings)
            .await?;
        if outcome.requested > 0 {
            self.store
                .set_mappings(&outcome.labels)
                .map_err(LookupError::Failed)?;
            self.update_badge(outcome.labels.len());
        }
        Ok(outcome)
    }

    /// Replace the stored cache.
    pub fn set_mappings(&self, mappings: &MappingCache) -> Result<()> {
        self.store.set_mappings(mappings)?;
        self.update_badge(mappings.len());
        Ok(())
    }

    pub fn export_mappings(&self) -> Result<String> {
        self.store.mappings()?.export_json()
    }

    /// Import an exported file. Returns the number of entries after import.
    pub fn import_mappings(&self, json: &str, mode: ImportMode) -> Result<usize> {
        let incoming = MappingCache::parse_import(json)?;
        let mut mappings = self.store.mappings()?;
        mappings.import(&incoming, mode);
        self.set_mappings(&mappings)?;
        tracing::info!(
            imported = incoming.len(),
            total = mappings.len(),
            ?mode,
            "mappings imported"
        );
        Ok(mappings.len())
    }

    pub fn clear_mappings(&self) -> Result<()> {
        self.set_mappings(&MappingCache::new())?;
        tracing::info!("mappings cleared");
        Ok(())
    }

    pub fn badge(&self) -> Badge {
        match self.badge.lock() {
            Ok(b) => b.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update_badge(&self, mapping_count: usize) {
        let next = Badge::for_mapping_count(mapping_count);
        match self.badge.lock() {
            Ok(mut b) => *b = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}
