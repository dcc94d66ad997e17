//! Blocking HTTP transport for multi-query POSTs.

use std::time::Duration;

use super::TransportError;

/// One outbound multi-query request.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub url: String,
    pub app_id: String,
    pub api_key: String,
    /// JSON body (`{"requests": [...]}`).
    pub body: Vec<u8>,
}

/// Raw response: status code and body bytes.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

impl SearchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body of a 2xx response; any other status becomes `TransportError::Http`.
    pub fn into_success(self) -> Result<Vec<u8>, TransportError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(TransportError::Http(self.status))
        }
    }
}

/// Sends one multi-query request. Implementations block the calling thread.
pub trait SearchTransport: Send + Sync {
    fn post(&self, request: &SearchRequest) -> Result<SearchResponse, TransportError>;
}

/// libcurl transport. No overall timeout: a hung request stalls only its own batch loop.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    connect_timeout: Option<Duration>,
}

impl CurlTransport {
    pub fn new(connect_timeout: Option<Duration>) -> Self {
        Self { connect_timeout }
    }
}

impl SearchTransport for CurlTransport {
    fn post(&self, request: &SearchRequest) -> Result<SearchResponse, TransportError> {
        let mut body = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(&request.url)?;
        easy.post(true)?;
        easy.post_fields_copy(&request.body)?;
        if let Some(t) = self.connect_timeout {
            easy.connect_timeout(t)?;
        }

        let mut list = curl::easy::List::new();
        list.append(&format!("X-Algolia-Application-Id: {}", request.app_id))?;
        list.append(&format!("X-Algolia-API-Key: {}", request.api_key))?;
        list.append("Content-Type: application/json")?;
        // Send the body immediately instead of waiting on `100 Continue`.
        list.append("Expect:")?;
        easy.http_headers(list)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        Ok(SearchResponse { status, body })
    }
}
