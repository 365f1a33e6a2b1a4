//! Component registry — the canonical in-memory table of components.
//!
//! One lock protects the table and the per-component maps. Write paths hold
//! it across state-update, storage-write and bus-publish so observers never
//! see events out of order with the state that caused them. When a storage
//! write fails the in-memory mutation is rolled back and no event is
//! published.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use wirehome_domain::component::Component;
use wirehome_domain::error::{NotFoundError, Result, ValidationError};
use wirehome_domain::event::component_registry as event;
use wirehome_domain::message::BusMessage;

use crate::message_bus::MessageBus;
use crate::ports::storage::{Storage, CONFIGURATION_FILENAME, SETTINGS_FILENAME};

/// Top-level storage directory for components.
pub const COMPONENTS_DIRECTORY: &str = "Components";

/// The authoritative store of device and logical-unit state.
pub struct ComponentRegistry<S> {
    storage: S,
    bus: Arc<MessageBus>,
    components: Mutex<HashMap<String, Component>>,
}

fn map_to_value(map: &HashMap<String, Value>) -> Value {
    Value::Object(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

fn value_to_map(value: Value) -> HashMap<String, Value> {
    match value {
        Value::Object(map) => map.into_iter().collect(),
        other => {
            tracing::warn!(?other, "expected a JSON object, ignoring document");
            HashMap::new()
        }
    }
}

fn validate_component_uid(uid: &str) -> Result<()> {
    if uid.is_empty() {
        return Err(ValidationError::EmptyComponentUid.into());
    }
    Ok(())
}

fn validate_setting_uid(uid: &str) -> Result<()> {
    if uid.is_empty() {
        return Err(ValidationError::EmptySettingUid.into());
    }
    Ok(())
}

fn validate_status_uid(uid: &str) -> Result<()> {
    if uid.is_empty() {
        return Err(ValidationError::EmptyStatusUid.into());
    }
    Ok(())
}

fn not_found(uid: &str) -> NotFoundError {
    NotFoundError {
        entity: "Component",
        uid: uid.to_string(),
    }
}

impl<S: Storage> ComponentRegistry<S> {
    #[must_use]
    pub fn new(storage: S, bus: Arc<MessageBus>) -> Self {
        Self {
            storage,
            bus,
            components: Mutex::new(HashMap::new()),
        }
    }

    /// Load every persisted component from storage. Per-component failures
    /// are logged and leave that entity absent.
    pub fn initialize(&self) -> Result<()> {
        let uids = self
            .storage
            .enumerate_directories("*", &[COMPONENTS_DIRECTORY])?;
        for uid in uids {
            if let Err(err) = self.initialize_component(&uid) {
                tracing::warn!(component_uid = %uid, error = %err, "component initialization failed");
            }
        }
        Ok(())
    }

    /// Create the in-memory entity for `uid` from its persisted configuration
    /// and settings.
    pub fn initialize_component(&self, uid: &str) -> Result<Component> {
        validate_component_uid(uid)?;

        let mut components = self.components.lock().expect("mutex poisoned");

        let configuration = self
            .storage
            .try_read(&[COMPONENTS_DIRECTORY, uid, CONFIGURATION_FILENAME])?
            .ok_or_else(|| not_found(uid))?;
        let settings = self
            .storage
            .try_read(&[COMPONENTS_DIRECTORY, uid, SETTINGS_FILENAME])?
            .map(value_to_map)
            .unwrap_or_default();

        let mut component = Component::new(uid, value_to_map(configuration));
        component.settings = settings;
        components.insert(uid.to_string(), component.clone());

        self.bus
            .publish(BusMessage::of_type(event::INITIALIZED).with("component_uid", uid));

        Ok(component)
    }

    /// Create or overwrite a component and persist its configuration.
    pub fn register_component(
        &self,
        uid: &str,
        configuration: HashMap<String, Value>,
    ) -> Result<Component> {
        validate_component_uid(uid)?;

        let mut components = self.components.lock().expect("mutex poisoned");

        let component = Component::new(uid, configuration);
        let previous = components.insert(uid.to_string(), component.clone());

        let document = map_to_value(&component.configuration);
        if let Err(err) =
            self.storage
                .write(&document, &[COMPONENTS_DIRECTORY, uid, CONFIGURATION_FILENAME])
        {
            match previous {
                Some(previous) => components.insert(uid.to_string(), previous),
                None => components.remove(uid),
            };
            return Err(err);
        }

        self.bus
            .publish(BusMessage::of_type(event::COMPONENT_REGISTERED).with("component_uid", uid));

        Ok(component)
    }

    /// Remove a component and its persisted directory.
    pub fn delete_component(&self, uid: &str) -> Result<()> {
        validate_component_uid(uid)?;

        let mut components = self.components.lock().expect("mutex poisoned");
        let removed = components.remove(uid).ok_or_else(|| not_found(uid))?;

        if let Err(err) = self.storage.delete_directory(&[COMPONENTS_DIRECTORY, uid]) {
            components.insert(uid.to_string(), removed);
            return Err(err);
        }

        self.bus
            .publish(BusMessage::of_type(event::COMPONENT_DELETED).with("component_uid", uid));

        Ok(())
    }

    /// Uids of all registered components, sorted.
    #[must_use]
    pub fn get_component_uids(&self) -> Vec<String> {
        let components = self.components.lock().expect("mutex poisoned");
        let mut uids: Vec<String> = components.keys().cloned().collect();
        uids.sort();
        uids
    }

    /// Snapshots of all registered components.
    #[must_use]
    pub fn get_components(&self) -> Vec<Component> {
        let components = self.components.lock().expect("mutex poisoned");
        components.values().cloned().collect()
    }

    /// Snapshot of a component, `None` when absent.
    pub fn try_get_component(&self, uid: &str) -> Result<Option<Component>> {
        validate_component_uid(uid)?;
        let components = self.components.lock().expect("mutex poisoned");
        Ok(components.get(uid).cloned())
    }

    /// Snapshot of a component, not-found error when absent.
    pub fn get_component(&self, uid: &str) -> Result<Component> {
        self.try_get_component(uid)?
            .ok_or_else(|| not_found(uid).into())
    }

    /// A single setting value; JSON null when the setting is absent.
    pub fn get_setting(&self, uid: &str, setting_uid: &str) -> Result<Value> {
        validate_component_uid(uid)?;
        validate_setting_uid(setting_uid)?;

        let components = self.components.lock().expect("mutex poisoned");
        let component = components.get(uid).ok_or_else(|| not_found(uid))?;
        Ok(component
            .settings
            .get(setting_uid)
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// Write a setting. Deep-equal writes coalesce: no event, no storage
    /// write. Otherwise the settings document is persisted and a
    /// `setting_changed` event with old and new values is published.
    pub fn set_setting(&self, uid: &str, setting_uid: &str, value: Value) -> Result<()> {
        validate_component_uid(uid)?;
        validate_setting_uid(setting_uid)?;

        let mut components = self.components.lock().expect("mutex poisoned");
        let component = components.get_mut(uid).ok_or_else(|| not_found(uid))?;

        let previous = component.settings.get(setting_uid).cloned();
        let old_value = previous.clone().unwrap_or(Value::Null);
        if old_value == value {
            return Ok(());
        }

        component
            .settings
            .insert(setting_uid.to_string(), value.clone());

        let document = map_to_value(&component.settings);
        if let Err(err) =
            self.storage
                .write(&document, &[COMPONENTS_DIRECTORY, uid, SETTINGS_FILENAME])
        {
            match previous {
                Some(previous) => component.settings.insert(setting_uid.to_string(), previous),
                None => component.settings.remove(setting_uid),
            };
            return Err(err);
        }

        self.bus.publish(
            BusMessage::of_type(event::SETTING_CHANGED)
                .with("component_uid", uid)
                .with("setting_uid", setting_uid)
                .with("old_value", old_value)
                .with("new_value", value),
        );

        Ok(())
    }

    /// Remove a setting. Absent settings are a no-op; removals persist and
    /// publish `setting_changed` with a null new value.
    pub fn remove_setting(&self, uid: &str, setting_uid: &str) -> Result<()> {
        validate_component_uid(uid)?;
        validate_setting_uid(setting_uid)?;

        let mut components = self.components.lock().expect("mutex poisoned");
        let component = components.get_mut(uid).ok_or_else(|| not_found(uid))?;

        let Some(old_value) = component.settings.remove(setting_uid) else {
            return Ok(());
        };

        let document = map_to_value(&component.settings);
        if let Err(err) =
            self.storage
                .write(&document, &[COMPONENTS_DIRECTORY, uid, SETTINGS_FILENAME])
        {
            component
                .settings
                .insert(setting_uid.to_string(), old_value);
            return Err(err);
        }

        self.bus.publish(
            BusMessage::of_type(event::SETTING_CHANGED)
                .with("component_uid", uid)
                .with("setting_uid", setting_uid)
                .with("old_value", old_value)
                .with("new_value", Value::Null),
        );

        Ok(())
    }

    /// A single status value; JSON null when absent.
    pub fn get_status(&self, uid: &str, status_uid: &str) -> Result<Value> {
        validate_component_uid(uid)?;
        validate_status_uid(status_uid)?;

        let components = self.components.lock().expect("mutex poisoned");
        let component = components.get(uid).ok_or_else(|| not_found(uid))?;
        Ok(component
            .status
            .get(status_uid)
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// Write a status value. Status is live data and never persisted;
    /// deep-equal writes coalesce, changes publish `status_changed`.
    pub fn set_status(&self, uid: &str, status_uid: &str, value: Value) -> Result<()> {
        validate_component_uid(uid)?;
        validate_status_uid(status_uid)?;

        let mut components = self.components.lock().expect("mutex poisoned");
        let component = components.get_mut(uid).ok_or_else(|| not_found(uid))?;

        let old_value = component
            .status
            .get(status_uid)
            .cloned()
            .unwrap_or(Value::Null);
        if old_value == value {
            return Ok(());
        }

        component
            .status
            .insert(status_uid.to_string(), value.clone());

        self.bus.publish(
            BusMessage::of_type(event::STATUS_CHANGED)
                .with("component_uid", uid)
                .with("status_uid", status_uid)
                .with("old_value", old_value)
                .with("new_value", value),
        );

        Ok(())
    }

    /// Flip the logical enabled flag. A runtime-only mutation: the flag is
    /// part of the snapshot but is never persisted and publishes no event.
    pub fn set_enabled(&self, uid: &str, enabled: bool) -> Result<()> {
        validate_component_uid(uid)?;

        let mut components = self.components.lock().expect("mutex poisoned");
        let component = components.get_mut(uid).ok_or_else(|| not_found(uid))?;
        component.enabled = enabled;
        Ok(())
    }

    /// Remove a status value. Absent values are a no-op.
    pub fn remove_status(&self, uid: &str, status_uid: &str) -> Result<()> {
        validate_component_uid(uid)?;
        validate_status_uid(status_uid)?;

        let mut components = self.components.lock().expect("mutex poisoned");
        let component = components.get_mut(uid).ok_or_else(|| not_found(uid))?;

        let Some(old_value) = component.status.remove(status_uid) else {
            return Ok(());
        };

        self.bus.publish(
            BusMessage::of_type(event::STATUS_CHANGED)
                .with("component_uid", uid)
                .with("status_uid", status_uid)
                .with("old_value", old_value)
                .with("new_value", Value::Null),
        );

        Ok(())
    }
}
