//! Accessor responses.

use std::fmt;
use std::time::Duration;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;

/// Where a response's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseSource {
    /// The executor ran during this call.
    Live,
    /// Served from the cache entry.
    Cached,
    /// The request ceiling was reached; served from whatever the cache held.
    Throttled,
}

impl ResponseSource {
    /// Human-readable provenance text.
    pub fn message(self) -> &'static str {
        match self {
            Self::Live => "Response from live request.",
            Self::Cached => "Response from transient request.",
            Self::Throttled => "Reached MAX requests. Response from transient.",
        }
    }

    /// Short label, used for metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Cached => "cached",
            Self::Throttled => "throttled",
        }
    }
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`TransientQuery::query`](crate::TransientQuery::query).
///
/// Serializes as `{ "data": [...] | null, "message": "...", "expiration": secs }`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse {
    /// The result set. `None` only when throttled with nothing cached.
    pub data: Option<Vec<Value>>,
    pub source: ResponseSource,
    /// Expiration applied to the entries written by this call.
    pub expiration: Duration,
}

impl QueryResponse {
    pub fn new(data: Option<Vec<Value>>, source: ResponseSource, expiration: Duration) -> Self {
        Self {
            data,
            source,
            expiration,
        }
    }

    pub fn message(&self) -> &'static str {
        self.source.message()
    }

    pub fn is_live(&self) -> bool {
        self.source == ResponseSource::Live
    }
}

impl Serialize for QueryResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("QueryResponse", 3)?;
        state.serialize_field("data", &self.data)?;
        state.serialize_field("message", self.message())?;
        state.serialize_field("expiration", &self.expiration.as_secs())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_three_fields() {
        let response = QueryResponse::new(
            Some(vec![json!(1), json!(2)]),
            ResponseSource::Live,
            Duration::from_secs(60),
        );
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "data": [1, 2],
                "message": "Response from live request.",
                "expiration": 60,
            })
        );
    }

    #[test]
    fn throttled_without_data_serializes_null() {
        let response = QueryResponse::new(None, ResponseSource::Throttled, Duration::from_secs(5));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["data"], Value::Null);
        assert_eq!(
            value["message"],
            "Reached MAX requests. Response from transient."
        );
    }

    #[test]
    fn cached_message() {
        assert_eq!(
            ResponseSource::Cached.message(),
            "Response from transient request."
        );
        assert_eq!(ResponseSource::Cached.to_string(), "cached");
    }
}
