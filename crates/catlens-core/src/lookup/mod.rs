//! Batch lookup: resolve uncached identifiers against the search API.
//!
//! Pipeline for one call:
//! precondition checks → id sanitization → drop cached ids → cap →
//! fixed-size batches (fixed pause between them) → per-id label extraction.
//!
//! A failed batch is logged and skipped; the call still succeeds with whatever
//! the other batches returned. Merging into the cache and persisting is the
//! caller's job (see `Background::lookup`).

mod error;


use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::MappingCache;
use crate::extract::{extract_label, split_paths};
use crate::ident::sanitize_ids;
use crate::query::{build_queries, MultiQueryBody};
use crate::search::{
    first_hit, queries_url, MultiQueryResponse, SearchRequest, SearchResponse, SearchTransport,
};
use crate::settings::Settings;

pub use error::LookupError;

/// Batching and rate-limit parameters.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub batch_size: usize,
    /// Unconditional pause before every batch after the first.
    pub batch_delay: Duration,
    /// Uncached ids beyond this are dropped for the current call.
    pub max_ids_per_request: usize,
    /// Search host override; `None` uses the per-account host.
    pub endpoint: Option<String>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            batch_delay: Duration::from_millis(200),
            max_ids_per_request: 100,
            endpoint: None,
        }
    }
}

/// Result of a lookup call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupOutcome {
    /// Cache with the new entries merged in.
    pub labels: MappingCache,
    /// Only the entries resolved by this call.
    pub fetched: MappingCache,
    /// Number of ids sent to the network (0 = answered from cache).
    pub requested: usize,
}

pub struct BatchLookup {
    transport: Arc<dyn SearchTransport>,
    config: LookupConfig,
}

impl BatchLookup {
    pub fn new(transport: Arc<dyn SearchTransport>, config: LookupConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Check preconditions and reduce `ids` to the capped list of uncached identifiers.
    /// Never touches the network.
    pub fn plan(
        &self,
        ids: &Value,
        settings: &Settings,
        cache: &MappingCache,
    ) -> Result<Vec<String>, LookupError> {
        if !settings.is_ready() {
            return Err(LookupError::NotReady);
        }
        if !settings.field_paths_valid() {
            return Err(LookupError::InvalidFieldPaths);
        }
        let raw = ids.as_array().ok_or(LookupError::InvalidIds)?;
        Ok(sanitize_ids(raw)
            .into_iter()
            .filter(|id| !cache.contains(id))
            .take(self.config.max_ids_per_request)
            .collect())
    }

    /// Resolve `ids` (already planned) batch by batch. Returns only the new labels.
    pub async fn fetch(
        &self,
        ids: &[String],
        settings: &Settings,
    ) -> Result<MappingCache, LookupError> {
        let paths = split_paths(&settings.category_paths);
        let url = queries_url(&settings.app_id, self.config.endpoint.as_deref());
        let mut fetched = MappingCache::new();

        for (n, batch) in ids.chunks(self.config.batch_size.max(1)).enumerate() {
            if n > 0 {
                tokio::time::sleep(self.config.batch_delay).await;
            }

            let queries = build_queries(
                batch,
                &settings.index_name,
                &settings.filter_field,
                &settings.category_paths,
            );
            let body = serde_json::to_vec(&MultiQueryBody { requests: &queries })
                .map_err(|e| LookupError::Failed(e.into()))?;
            let request = SearchRequest {
                url: url.clone(),
                app_id: settings.app_id.clone(),
                api_key: settings.api_key.clone(),
                body,
            };

            let transport = Arc::clone(&self.transport);
            let sent = tokio::task::spawn_blocking(move || {
                transport.post(&request).and_then(SearchResponse::into_success)
            })
            .await
            .map_err(|e| LookupError::Failed(anyhow::anyhow!("search task join: {}", e)))?;

            let bytes = match sent {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(batch = n, ids = batch.len(), "search batch skipped: {}", e);
                    continue;
                }
            };

            let response: MultiQueryResponse = serde_json::from_slice(&bytes)
                .map_err(|e| LookupError::Failed(anyhow::Error::new(e).context("decode search response")))?;

            let before = fetched.len();
            for (id, result) in batch.iter().zip(response.results.iter()) {
                let Some(hit) = first_hit(result) else {
                    continue;
                };
                if let Some(label) = extract_label(hit, id, &paths) {
                    fetched.insert(id, &label);
                }
            }
            tracing::debug!(
                batch = n,
                ids = batch.len(),
                resolved = fetched.len() - before,
                "search batch done"
            );
        }

        Ok(fetched)
    }

    /// Plan, fetch, and merge. The returned `labels` is `cache` plus the new entries.
    pub async fn lookup(
        &self,
        ids: &Value,
        settings: &Settings,
        cache: &MappingCache,
    ) -> Result<LookupOutcome, LookupError> {
        let planned = self.plan(ids, settings, cache)?;
        if planned.is_empty() {
            return Ok(LookupOutcome {
                labels: cache.clone(),
                ..Default::default()
            });
        }

        let fetched = self.fetch(&planned, settings).await?;
        let mut labels = cache.clone();
        labels.merge(&fetched);
        tracing::info!(
            requested = planned.len(),
            resolved = fetched.len(),
            total = labels.len(),
            "lookup complete"
        );
        Ok(LookupOutcome {
            labels,
            fetched,
            requested: planned.len(),
        })
    }
}
