//! Search API plumbing: endpoint, transport, and multi-query response shape.
//!
//! The transport is blocking (libcurl); async callers run it on the blocking pool.

mod error;
mod response;
mod transport;

#[cfg(test)]
pub(crate) mod scripted;

pub use error::TransportError;
pub use response::{first_hit, MultiQueryResponse};
pub use transport::{CurlTransport, SearchRequest, SearchResponse, SearchTransport};

/// Path of the multi-query endpoint, relative to the search host.
pub const QUERIES_PATH: &str = "/1/indexes/*/queries";

/// Multi-query URL for an account. `host_override` replaces the default
/// `https://{app_id}-dsn.algolia.net` host (proxies, tests).
pub fn queries_url(app_id: &str, host_override: Option<&str>) -> String {
    match host_override {
        Some(host) => format!("{}{}", host.trim_end_matches('/'), QUERIES_PATH),
        None => format!("https://{}-dsn.algolia.net{}", app_id, QUERIES_PATH),
    }
}
