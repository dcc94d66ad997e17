//! Wire types of the extension message protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::MappingCache;
use crate::settings::SettingsPatch;
use crate::store::State;

pub const UNAUTHORIZED_SENDER: &str = "Unauthorized sender";
pub const UNKNOWN_MESSAGE_TYPE: &str = "Unknown message type";
pub const INVALID_PAYLOAD: &str = "Invalid message payload.";

/// Message types the background service answers.
pub const MESSAGE_TYPES: [&str; 4] = ["GET_STATE", "SAVE_CONFIG", "ALGOLIA_LOOKUP", "SET_MAPPINGS"];

/// A request, tagged by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    GetState,
    SaveConfig {
        #[serde(default)]
        config: SettingsPatch,
    },
    /// `ids` is kept raw; its shape is checked by the lookup itself.
    AlgoliaLookup {
        #[serde(default)]
        ids: Value,
    },
    /// Full replacement; must be a JSON object.
    SetMappings { mappings: Value },
}

impl Request {
    /// Parse a raw message. `Err` carries the protocol error string.
    pub fn parse(raw: Value) -> Result<Request, &'static str> {
        let known = raw
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|t| MESSAGE_TYPES.contains(&t));
        if !known {
            return Err(UNKNOWN_MESSAGE_TYPE);
        }
        serde_json::from_value(raw).map_err(|e| {
            tracing::debug!("bad message payload: {}", e);
            INVALID_PAYLOAD
        })
    }
}

/// Exactly one of these is sent back per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<MappingCache>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched: Option<MappingCache>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Who sent a message. `id` is the extension id, `None` for local callers (CLI).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sender {
    pub id: Option<String>,
}

impl Sender {
    pub fn local() -> Self {
        Self::default()
    }

    pub fn extension(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
        }
    }

    /// Sender from a native-messaging caller origin (`chrome-extension://<id>/`).
    pub fn from_origin(origin: &str) -> anyhow::Result<Self> {
        let url = url::Url::parse(origin)
            .map_err(|e| anyhow::anyhow!("invalid caller origin {:?}: {}", origin, e))?;
        if url.scheme() != "chrome-extension" {
            anyhow::bail!("caller origin is not an extension: {}", origin);
        }
        let id = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| anyhow::anyhow!("caller origin has no extension id: {}", origin))?;
        Ok(Self::extension(id))
    }
}
