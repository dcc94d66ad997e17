//! Per-request transport failure. A failed batch is skipped, never retried.

/// Error returned for one multi-query request (curl failure or HTTP error).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Curl reported an error (DNS, connection, TLS, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
}
