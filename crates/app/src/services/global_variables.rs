//! Global variables — a flat key/value store shared by scripts and clients.
//!
//! Held in RAM only; every committed mutation is announced on the bus.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use wirehome_domain::error::{Result, ValidationError};
use wirehome_domain::event::global_variables as event;
use wirehome_domain::message::BusMessage;

use crate::message_bus::MessageBus;

/// In-memory store of named JSON values.
pub struct GlobalVariablesService {
    bus: Arc<MessageBus>,
    variables: Mutex<HashMap<String, Value>>,
}

fn validate_uid(uid: &str) -> Result<()> {
    if uid.is_empty() {
        return Err(ValidationError::EmptyVariableUid.into());
    }
    Ok(())
}

impl GlobalVariablesService {
    #[must_use]
    pub fn new(bus: Arc<MessageBus>) -> Self {
        Self {
            bus,
            variables: Mutex::new(HashMap::new()),
        }
    }

    /// Read a variable; JSON null when absent.
    pub fn get_value(&self, uid: &str) -> Result<Value> {
        validate_uid(uid)?;
        let variables = self.variables.lock().expect("mutex poisoned");
        Ok(variables.get(uid).cloned().unwrap_or(Value::Null))
    }

    /// Write a variable. Deep-equal writes coalesce without an event.
    pub fn set_value(&self, uid: &str, value: Value) -> Result<()> {
        validate_uid(uid)?;

        let mut variables = self.variables.lock().expect("mutex poisoned");
        let old_value = variables.get(uid).cloned().unwrap_or(Value::Null);
        if old_value == value {
            return Ok(());
        }
        variables.insert(uid.to_string(), value.clone());

        self.bus.publish(
            BusMessage::of_type(event::VALUE_SET)
                .with("variable_uid", uid)
                .with("old_value", old_value)
                .with("new_value", value),
        );

        Ok(())
    }

    /// Remove a variable. Absent variables are a no-op.
    pub fn remove_value(&self, uid: &str) -> Result<()> {
        validate_uid(uid)?;

        let mut variables = self.variables.lock().expect("mutex poisoned");
        let Some(old_value) = variables.remove(uid) else {
            return Ok(());
        };

        self.bus.publish(
            BusMessage::of_type(event::VALUE_REMOVED)
                .with("variable_uid", uid)
                .with("old_value", old_value),
        );

        Ok(())
    }

    /// Every variable as one JSON object.
    #[must_use]
    pub fn snapshot(&self) -> Map<String, Value> {
        let variables = self.variables.lock().expect("mutex poisoned");
        variables
            .iter()
            .map(|(uid, value)| (uid.clone(), value.clone()))
            .collect()
    }
}
