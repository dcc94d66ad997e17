//! In-process transport for unit tests: answers queries from a catalog and records calls.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use super::{SearchRequest, SearchResponse, SearchTransport, TransportError};

#[derive(Default)]
pub(crate) struct ScriptedTransport {
    catalog: HashMap<String, String>,
    /// Resolve ids missing from the catalog to `Label <id>`.
    echo: bool,
    /// Zero-based call numbers that answer 500.
    failing_calls: Vec<usize>,
    calls: Mutex<Vec<(Instant, Value)>>,
}

impl ScriptedTransport {
    pub fn with_catalog(pairs: &[(&str, &str)]) -> Self {
        Self {
            catalog: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn echo() -> Self {
        Self {
            echo: true,
            ..Default::default()
        }
    }

    /// Make the given zero-based calls answer 500.
    pub fn with_failing_calls(mut self, calls: Vec<usize>) -> Self {
        self.failing_calls = calls;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.calls.lock().unwrap().iter().map(|(_, b)| b.clone()).collect()
    }

    fn label_for(&self, id: &str) -> Option<String> {
        match self.catalog.get(id) {
            Some(label) => Some(label.clone()),
            None if self.echo => Some(format!("Label {id}")),
            None => None,
        }
    }
}

/// The id inside `filters=field:"<id>"`.
fn id_from_params(params: &str) -> String {
    let filters = url::form_urlencoded::parse(params.as_bytes())
        .find(|(k, _)| k == "filters")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default();
    filters.split('"').nth(1).unwrap_or_default().to_string()
}

impl SearchTransport for ScriptedTransport {
    fn post(&self, request: &SearchRequest) -> Result<SearchResponse, TransportError> {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((Instant::now(), body.clone()));
            calls.len() - 1
        };
        if self.failing_calls.contains(&n) {
            return Ok(SearchResponse {
                status: 500,
                body: b"{}".to_vec(),
            });
        }
        let results: Vec<Value> = body["requests"]
            .as_array()
            .unwrap()
            .iter()
            .map(|q| {
                let id = id_from_params(q["params"].as_str().unwrap());
                match self.label_for(&id) {
                    Some(name) => json!({ "hits": [{ "categories": [{ "id": id, "name": name }] }] }),
                    None => json!({ "hits": [] }),
                }
            })
            .collect();
        Ok(SearchResponse {
            status: 200,
            body: serde_json::to_vec(&json!({ "results": results })).unwrap(),
        })
    }
}
