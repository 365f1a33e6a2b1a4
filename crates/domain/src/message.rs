//! Bus messages and filters.
//!
//! A [`BusMessage`] is an immutable mapping of string keys to JSON values.
//! Two keys are privileged: `type` carries the routing key and `timestamp`
//! the publish time assigned by the bus. All other keys are opaque payload.
//!
//! A [`MessageFilter`] is a mapping of required key/value equalities; a
//! message matches when every filter key is present in the message with a
//! deep-equal value.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::time::Timestamp;

/// Privileged routing key.
pub const TYPE_KEY: &str = "type";
/// Privileged publish-time key, assigned by the bus as an RFC 3339 string.
pub const TIMESTAMP_KEY: &str = "timestamp";

/// An immutable JSON-shaped record carried by the message bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusMessage {
    fields: Map<String, Value>,
}

impl BusMessage {
    /// Create a message carrying only the given routing key.
    #[must_use]
    pub fn of_type(message_type: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(TYPE_KEY.to_string(), Value::String(message_type.into()));
        Self { fields }
    }

    /// Builder-style payload key.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// The routing key, if present.
    #[must_use]
    pub fn message_type(&self) -> Option<&str> {
        self.fields.get(TYPE_KEY).and_then(Value::as_str)
    }

    /// The bus-assigned publish time, if present and well-formed.
    #[must_use]
    pub fn timestamp(&self) -> Option<Timestamp> {
        let raw = self.fields.get(TIMESTAMP_KEY)?.as_str()?;
        chrono::DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|ts| ts.to_utc())
    }

    /// Whether a timestamp has already been assigned.
    #[must_use]
    pub fn has_timestamp(&self) -> bool {
        self.fields.contains_key(TIMESTAMP_KEY)
    }

    /// Stamp the message with a publish time. Called by the bus only.
    pub fn set_timestamp(&mut self, timestamp: Timestamp) {
        self.fields.insert(
            TIMESTAMP_KEY.to_string(),
            Value::String(timestamp.to_rfc3339()),
        );
    }

    /// Payload accessor.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// All fields, for snapshot serialization.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for BusMessage {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// A map of required key/value equalities a message must satisfy to match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageFilter {
    required: Map<String, Value>,
}

impl MessageFilter {
    /// An empty filter matches every message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `key` to equal `value`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.required.insert(key.into(), value.into());
        self
    }

    /// Shorthand for the common type-equality filter.
    #[must_use]
    pub fn for_type(message_type: impl Into<Value>) -> Self {
        Self::new().with(TYPE_KEY, message_type)
    }

    /// True when every required key is present with a deep-equal value.
    #[must_use]
    pub fn matches(&self, message: &BusMessage) -> bool {
        self.required
            .iter()
            .all(|(key, value)| message.get(key) == Some(value))
    }
}
