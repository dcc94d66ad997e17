//! Multi-query response: `{"results": [{"hits": [...]}, ...]}`, one result per query.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct MultiQueryResponse {
    /// Missing or `null` both read as no results.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<Value>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Value>, D::Error> {
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// First hit of one result, if the result has a non-empty `hits` list.
pub fn first_hit(result: &Value) -> Option<&Value> {
    result
        .get("hits")
        .and_then(Value::as_array)
        .and_then(|hits| hits.first())
        .filter(|hit| !hit.is_null())
}
