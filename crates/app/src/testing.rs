//! In-memory test doubles shared by the service unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use wirehome_domain::error::{Result, WirehomeError};

use crate::diagnostics::OperationsPerSecondCounter;
use crate::message_bus::{MessageBus, MessageBusConfig, MESSAGES_PUBLISHED_COUNTER};
use crate::ports::Storage;
use crate::shutdown::SystemCancellationToken;

/// A fresh bus suitable for registry tests.
pub(crate) fn test_bus() -> Arc<MessageBus> {
    Arc::new(MessageBus::new(
        MessageBusConfig::default(),
        Arc::new(OperationsPerSecondCounter::new(MESSAGES_PUBLISHED_COUNTER)),
        SystemCancellationToken::new(),
    ))
}

/// Storage double keeping documents in a path-keyed map. Writes can be
/// switched to fail to exercise rollback paths.
#[derive(Debug, Default)]
pub(crate) struct InMemoryStorage {
    documents: Mutex<HashMap<Vec<String>, Value>>,
    fail_writes: AtomicBool,
}

impl InMemoryStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_next_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn document(&self, path: &[&str]) -> Option<Value> {
        let key: Vec<String> = path.iter().map(ToString::to_string).collect();
        self.documents
            .lock()
            .expect("mutex poisoned")
            .get(&key)
            .cloned()
    }

    fn io_error() -> WirehomeError {
        WirehomeError::Storage(Box::new(std::io::Error::other("simulated write failure")))
    }
}

impl Storage for InMemoryStorage {
    fn try_read(&self, path: &[&str]) -> Result<Option<Value>> {
        Ok(self.document(path))
    }

    fn write(&self, value: &Value, path: &[&str]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::io_error());
        }
        let key: Vec<String> = path.iter().map(ToString::to_string).collect();
        self.documents
            .lock()
            .expect("mutex poisoned")
            .insert(key, value.clone());
        Ok(())
    }

    fn enumerate_directories(&self, pattern: &str, path: &[&str]) -> Result<Vec<String>> {
        let prefix: Vec<String> = path.iter().map(ToString::to_string).collect();
        let documents = self.documents.lock().expect("mutex poisoned");
        let mut names: Vec<String> = documents
            .keys()
            .filter(|key| key.len() > prefix.len() + 1 && key.starts_with(&prefix))
            .map(|key| key[prefix.len()].clone())
            .filter(|name| pattern == "*" || name == pattern)
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn delete_directory(&self, path: &[&str]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::io_error());
        }
        let prefix: Vec<String> = path.iter().map(ToString::to_string).collect();
        self.documents
            .lock()
            .expect("mutex poisoned")
            .retain(|key, _| !key.starts_with(&prefix));
        Ok(())
    }
}
