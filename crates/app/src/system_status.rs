//! System status — named gauges backed by constants or zero-arg providers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

/// A status value: either a stored constant or a provider evaluated at read
/// time.
#[derive(Clone)]
pub enum StatusValue {
    Constant(Value),
    Provider(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl StatusValue {
    fn resolve(&self) -> Value {
        match self {
            Self::Constant(value) => value.clone(),
            Self::Provider(provider) => provider(),
        }
    }
}

/// Mapping of gauge names to status values with atomic snapshots.
#[derive(Default)]
pub struct SystemStatusService {
    values: Mutex<HashMap<String, StatusValue>>,
}

impl SystemStatusService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a constant gauge.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.values
            .lock()
            .expect("mutex poisoned")
            .insert(name.into(), StatusValue::Constant(value.into()));
    }

    /// Set a gauge evaluated on every read.
    pub fn set_provider(
        &self,
        name: impl Into<String>,
        provider: impl Fn() -> Value + Send + Sync + 'static,
    ) {
        self.values
            .lock()
            .expect("mutex poisoned")
            .insert(name.into(), StatusValue::Provider(Arc::new(provider)));
    }

    /// Read a single gauge.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        let values = self.values.lock().expect("mutex poisoned");
        values.get(name).map(StatusValue::resolve)
    }

    /// Remove a gauge.
    pub fn remove(&self, name: &str) {
        self.values.lock().expect("mutex poisoned").remove(name);
    }

    /// Evaluate every gauge into one JSON object.
    #[must_use]
    pub fn snapshot(&self) -> Map<String, Value> {
        let values = self.values.lock().expect("mutex poisoned");
        values
            .iter()
            .map(|(name, value)| (name.clone(), value.resolve()))
            .collect()
    }
}
