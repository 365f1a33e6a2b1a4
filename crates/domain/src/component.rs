//! Component — a named entity representing a controllable device or logical
//! unit.
//!
//! A component carries three dynamic maps: `configuration` (loaded from
//! disk), `settings` (persisted key/values) and `status` (live, non-persisted
//! readings such as sensor values). Values are JSON-shaped and compared by
//! deep equality.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A controllable device or logical unit registered with the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub uid: String,
    pub configuration: HashMap<String, Value>,
    pub settings: HashMap<String, Value>,
    pub status: HashMap<String, Value>,
    pub enabled: bool,
}

impl Component {
    /// Create a fresh component with empty settings and status.
    #[must_use]
    pub fn new(uid: impl Into<String>, configuration: HashMap<String, Value>) -> Self {
        Self {
            uid: uid.into(),
            configuration,
            settings: HashMap::new(),
            status: HashMap::new(),
            enabled: true,
        }
    }
}
