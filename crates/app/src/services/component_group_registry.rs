//! Component group registry — groups, membership associations and their
//! settings.
//!
//! Shares the component registry's discipline: one lock, storage writes and
//! bus publishes under it, rollback of the in-memory mutation when a write
//! fails. On every committed mutation the group is persisted fully and stale
//! on-disk association directories are reconciled away.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use wirehome_domain::component_group::{ComponentGroup, ComponentGroupAssociation};
use wirehome_domain::error::{NotFoundError, Result, ValidationError};
use wirehome_domain::event::component_group_registry as event;
use wirehome_domain::message::BusMessage;

use crate::message_bus::MessageBus;
use crate::ports::storage::{Storage, CONFIGURATION_FILENAME, SETTINGS_FILENAME};

/// Top-level storage directory for component groups.
pub const COMPONENT_GROUPS_DIRECTORY: &str = "ComponentGroups";
/// Per-group sub-directory holding component association settings.
const COMPONENTS_SUBDIRECTORY: &str = "Components";
/// Per-group sub-directory holding macro association settings.
const MACROS_SUBDIRECTORY: &str = "Macros";

/// The authoritative store of component groups.
pub struct ComponentGroupRegistry<S> {
    storage: S,
    bus: Arc<MessageBus>,
    groups: Mutex<HashMap<String, ComponentGroup>>,
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

fn validate_group_uid(uid: &str) -> Result<()> {
    if uid.is_empty() {
        return Err(ValidationError::EmptyComponentGroupUid.into());
    }
    Ok(())
}

fn validate_component_uid(uid: &str) -> Result<()> {
    if uid.is_empty() {
        return Err(ValidationError::EmptyComponentUid.into());
    }
    Ok(())
}

fn validate_macro_uid(uid: &str) -> Result<()> {
    if uid.is_empty() {
        return Err(ValidationError::EmptyMacroUid.into());
    }
    Ok(())
}

fn validate_setting_uid(uid: &str) -> Result<()> {
    if uid.is_empty() {
        return Err(ValidationError::EmptySettingUid.into());
    }
    Ok(())
}

fn not_found(uid: &str) -> NotFoundError {
    NotFoundError {
        entity: "ComponentGroup",
        uid: uid.to_string(),
    }
}

impl<S: Storage> ComponentGroupRegistry<S> {
    #[must_use]
    pub fn new(storage: S, bus: Arc<MessageBus>) -> Self {
        Self {
            storage,
            bus,
            groups: Mutex::new(HashMap::new()),
        }
    }

    /// Load every persisted group from storage. Per-group failures are
    /// logged and leave that entity absent.
    pub fn initialize(&self) -> Result<()> {
        let uids = self
            .storage
            .enumerate_directories("*", &[COMPONENT_GROUPS_DIRECTORY])?;
        for uid in uids {
            if let Err(err) = self.initialize_component_group(&uid) {
                tracing::warn!(
                    component_group_uid = %uid,
                    error = %err,
                    "component group initialization failed"
                );
            }
        }
        Ok(())
    }

    /// Create the in-memory entity for `uid` from its persisted documents,
    /// including the association directories.
    pub fn initialize_component_group(&self, uid: &str) -> Result<ComponentGroup> {
        validate_group_uid(uid)?;

        let mut groups = self.groups.lock().expect("mutex poisoned");

        let configuration = self
            .storage
            .try_read(&[COMPONENT_GROUPS_DIRECTORY, uid, CONFIGURATION_FILENAME])?
            .ok_or_else(|| not_found(uid))?;
        let settings = self
            .storage
            .try_read(&[COMPONENT_GROUPS_DIRECTORY, uid, SETTINGS_FILENAME])?
            .map(value_to_map)
            .unwrap_or_default();

        let mut group = ComponentGroup::new(uid, value_to_map(configuration));
        group.settings = settings;
        group.components = self.load_associations(uid, COMPONENTS_SUBDIRECTORY)?;
        group.macros = self.load_associations(uid, MACROS_SUBDIRECTORY)?;

        groups.insert(uid.to_string(), group.clone());

        self.bus
            .publish(BusMessage::of_type(event::INITIALIZED).with("component_group_uid", uid));

        Ok(group)
    }

    fn load_associations(
        &self,
        uid: &str,
        subdirectory: &str,
    ) -> Result<HashMap<String, ComponentGroupAssociation>> {
        let mut associations = HashMap::new();
        let member_uids = self
            .storage
            .enumerate_directories("*", &[COMPONENT_GROUPS_DIRECTORY, uid, subdirectory])?;
        for member_uid in member_uids {
            let settings = self
                .storage
                .try_read(&[
                    COMPONENT_GROUPS_DIRECTORY,
                    uid,
                    subdirectory,
                    &member_uid,
                    SETTINGS_FILENAME,
                ])?
                .map(value_to_map)
                .unwrap_or_default();
            associations.insert(member_uid, ComponentGroupAssociation { settings });
        }
        Ok(associations)
    }

    /// Persist the group fully: configuration, settings, every association's
    /// settings document, then remove on-disk association directories that
    /// no longer exist in memory.
    fn save_component_group(&self, group: &ComponentGroup) -> Result<()> {
        let uid = group.uid.as_str();

        self.storage.write(
            &map_to_value(&group.configuration),
            &[COMPONENT_GROUPS_DIRECTORY, uid, CONFIGURATION_FILENAME],
        )?;
        self.storage.write(
            &map_to_value(&group.settings),
            &[COMPONENT_GROUPS_DIRECTORY, uid, SETTINGS_FILENAME],
        )?;

        self.save_associations(uid, COMPONENTS_SUBDIRECTORY, &group.components)?;
        self.save_associations(uid, MACROS_SUBDIRECTORY, &group.macros)?;

        Ok(())
    }

    fn save_associations(
        &self,
        uid: &str,
        subdirectory: &str,
        associations: &HashMap<String, ComponentGroupAssociation>,
    ) -> Result<()> {
        for (member_uid, association) in associations {
            self.storage.write(
                &map_to_value(&association.settings),
                &[
                    COMPONENT_GROUPS_DIRECTORY,
                    uid,
                    subdirectory,
                    member_uid,
                    SETTINGS_FILENAME,
                ],
            )?;
        }

        let on_disk = self
            .storage
            .enumerate_directories("*", &[COMPONENT_GROUPS_DIRECTORY, uid, subdirectory])?;
        for stale in on_disk {
            if !associations.contains_key(&stale) {
                self.storage.delete_directory(&[
                    COMPONENT_GROUPS_DIRECTORY,
                    uid,
                    subdirectory,
                    &stale,
                ])?;
            }
        }

        Ok(())
    }

    /// Create or overwrite a group and persist it.
    pub fn register_component_group(
        &self,
        uid: &str,
        configuration: HashMap<String, Value>,
    ) -> Result<ComponentGroup> {
        validate_group_uid(uid)?;

        let mut groups = self.groups.lock().expect("mutex poisoned");

        let group = ComponentGroup::new(uid, configuration);
        let previous = groups.insert(uid.to_string(), group.clone());

        if let Err(err) = self.save_component_group(&group) {
            match previous {
                Some(previous) => groups.insert(uid.to_string(), previous),
                None => groups.remove(uid),
            };
            return Err(err);
        }

        self.bus.publish(
            BusMessage::of_type(event::COMPONENT_GROUP_REGISTERED)
                .with("component_group_uid", uid),
        );

        Ok(group)
    }

    /// Remove a group and its persisted directory.
    pub fn delete_component_group(&self, uid: &str) -> Result<()> {
        validate_group_uid(uid)?;

        let mut groups = self.groups.lock().expect("mutex poisoned");
        let removed = groups.remove(uid).ok_or_else(|| not_found(uid))?;

        if let Err(err) = self
            .storage
            .delete_directory(&[COMPONENT_GROUPS_DIRECTORY, uid])
        {
            groups.insert(uid.to_string(), removed);
            return Err(err);
        }

        self.bus.publish(
            BusMessage::of_type(event::COMPONENT_GROUP_DELETED).with("component_group_uid", uid),
        );

        Ok(())
    }

    /// Uids of all registered groups, sorted.
    #[must_use]
    pub fn get_component_group_uids(&self) -> Vec<String> {
        let groups = self.groups.lock().expect("mutex poisoned");
        let mut uids: Vec<String> = groups.keys().cloned().collect();
        uids.sort();
        uids
    }

    /// Snapshots of all registered groups.
    #[must_use]
    pub fn get_component_groups(&self) -> Vec<ComponentGroup> {
        let groups = self.groups.lock().expect("mutex poisoned");
        groups.values().cloned().collect()
    }

    /// Snapshot of a group, `None` when absent.
    pub fn try_get_component_group(&self, uid: &str) -> Result<Option<ComponentGroup>> {
        validate_group_uid(uid)?;
        let groups = self.groups.lock().expect("mutex poisoned");
        Ok(groups.get(uid).cloned())
    }

    /// Snapshot of a group, not-found error when absent.
    pub fn get_component_group(&self, uid: &str) -> Result<ComponentGroup> {
        self.try_get_component_group(uid)?
            .ok_or_else(|| not_found(uid).into())
    }

    /// Add a component association. Idempotent: assigning an existing member
    /// is a no-op without an event.
    pub fn assign_component(&self, group_uid: &str, component_uid: &str) -> Result<()> {
        validate_group_uid(group_uid)?;
        validate_component_uid(component_uid)?;

        let mut groups = self.groups.lock().expect("mutex poisoned");
        let group = groups.get_mut(group_uid).ok_or_else(|| not_found(group_uid))?;

        if group.components.contains_key(component_uid) {
            return Ok(());
        }

        let backup = group.clone();
        group.components.insert(
            component_uid.to_string(),
            ComponentGroupAssociation::default(),
        );

        if let Err(err) = self.save_component_group(group) {
            *group = backup;
            return Err(err);
        }

        self.bus.publish(
            BusMessage::of_type(event::COMPONENT_ASSIGNED)
                .with("component_group_uid", group_uid)
                .with("component_uid", component_uid),
        );

        Ok(())
    }

    /// Remove a component association. Idempotent.
    pub fn unassign_component(&self, group_uid: &str, component_uid: &str) -> Result<()> {
        validate_group_uid(group_uid)?;
        validate_component_uid(component_uid)?;

        let mut groups = self.groups.lock().expect("mutex poisoned");
        let group = groups.get_mut(group_uid).ok_or_else(|| not_found(group_uid))?;

        if !group.components.contains_key(component_uid) {
            return Ok(());
        }

        let backup = group.clone();
        group.components.remove(component_uid);

        if let Err(err) = self.save_component_group(group) {
            *group = backup;
            return Err(err);
        }

        self.bus.publish(
            BusMessage::of_type(event::COMPONENT_UNASSIGNED)
                .with("component_group_uid", group_uid)
                .with("component_uid", component_uid),
        );

        Ok(())
    }

    /// Add a macro association. Idempotent.
    pub fn assign_macro(&self, group_uid: &str, macro_uid: &str) -> Result<()> {
        validate_group_uid(group_uid)?;
        validate_macro_uid(macro_uid)?;

        let mut groups = self.groups.lock().expect("mutex poisoned");
        let group = groups.get_mut(group_uid).ok_or_else(|| not_found(group_uid))?;

        if group.macros.contains_key(macro_uid) {
            return Ok(());
        }

        let backup = group.clone();
        group
            .macros
            .insert(macro_uid.to_string(), ComponentGroupAssociation::default());

        if let Err(err) = self.save_component_group(group) {
            *group = backup;
            return Err(err);
        }

        self.bus.publish(
            BusMessage::of_type(event::MACRO_ASSIGNED)
                .with("component_group_uid", group_uid)
                .with("macro_uid", macro_uid),
        );

        Ok(())
    }

    /// Remove a macro association. Idempotent.
    pub fn unassign_macro(&self, group_uid: &str, macro_uid: &str) -> Result<()> {
        validate_group_uid(group_uid)?;
        validate_macro_uid(macro_uid)?;

        let mut groups = self.groups.lock().expect("mutex poisoned");
        let group = groups.get_mut(group_uid).ok_or_else(|| not_found(group_uid))?;

        if !group.macros.contains_key(macro_uid) {
            return Ok(());
        }

        let backup = group.clone();
        group.macros.remove(macro_uid);

        if let Err(err) = self.save_component_group(group) {
            *group = backup;
            return Err(err);
        }

        self.bus.publish(
            BusMessage::of_type(event::MACRO_UNASSIGNED)
                .with("component_group_uid", group_uid)
                .with("macro_uid", macro_uid),
        );

        Ok(())
    }

    /// A group setting value; JSON null when absent.
    pub fn get_component_group_setting(&self, uid: &str, setting_uid: &str) -> Result<Value> {
        validate_group_uid(uid)?;
        validate_setting_uid(setting_uid)?;

        let groups = self.groups.lock().expect("mutex poisoned");
        let group = groups.get(uid).ok_or_else(|| not_found(uid))?;
        Ok(group
            .settings
            .get(setting_uid)
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// Write a group setting. Deep-equal writes coalesce; changes persist
    /// the group and publish `setting_changed` carrying the prior value in
    /// `old_value` and the written value in `new_value`.
    pub fn set_component_group_setting(
        &self,
        uid: &str,
        setting_uid: &str,
        value: Value,
    ) -> Result<()> {
        validate_group_uid(uid)?;
        validate_setting_uid(setting_uid)?;

        let mut groups = self.groups.lock().expect("mutex poisoned");
        let group = groups.get_mut(uid).ok_or_else(|| not_found(uid))?;

        let old_value = group
            .settings
            .get(setting_uid)
            .cloned()
            .unwrap_or(Value::Null);
        if old_value == value {
            return Ok(());
        }

        let backup = group.clone();
        group
            .settings
            .insert(setting_uid.to_string(), value.clone());

        if let Err(err) = self.save_component_group(group) {
            *group = backup;
            return Err(err);
        }

        self.bus.publish(
            BusMessage::of_type(event::SETTING_CHANGED)
                .with("component_group_uid", uid)
                .with("setting_uid", setting_uid)
                .with("old_value", old_value)
                .with("new_value", value),
        );

        Ok(())
    }

    /// Remove a group setting. Absent settings are a no-op; removals persist
    /// and publish `setting_changed` with a null new value.
    pub fn remove_component_group_setting(&self, uid: &str, setting_uid: &str) -> Result<()> {
        validate_group_uid(uid)?;
        validate_setting_uid(setting_uid)?;

        let mut groups = self.groups.lock().expect("mutex poisoned");
        let group = groups.get_mut(uid).ok_or_else(|| not_found(uid))?;

        if !group.settings.contains_key(setting_uid) {
            return Ok(());
        }

        let backup = group.clone();
        let old_value = group
            .settings
            .remove(setting_uid)
            .unwrap_or(Value::Null);

        if let Err(err) = self.save_component_group(group) {
            *group = backup;
            return Err(err);
        }

        self.bus.publish(
            BusMessage::of_type(event::SETTING_CHANGED)
                .with("component_group_uid", uid)
                .with("setting_uid", setting_uid)
                .with("old_value", old_value)
                .with("new_value", Value::Null),
        );

        Ok(())
    }

    /// A component association setting; JSON null when the association or
    /// the setting is absent. An absent group is a not-found error.
    pub fn get_component_association_setting(
        &self,
        group_uid: &str,
        component_uid: &str,
        setting_uid: &str,
    ) -> Result<Value> {
        validate_group_uid(group_uid)?;
        validate_component_uid(component_uid)?;
        validate_setting_uid(setting_uid)?;

        let groups = self.groups.lock().expect("mutex poisoned");
        let group = groups.get(group_uid).ok_or_else(|| not_found(group_uid))?;
        Ok(group
            .components
            .get(component_uid)
            .and_then(|association| association.settings.get(setting_uid))
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// Write a component association setting. A missing association is a
    /// silent no-op; deep-equal writes coalesce.
    pub fn set_component_association_setting(
        &self,
        group_uid: &str,
        component_uid: &str,
        setting_uid: &str,
        value: Value,
    ) -> Result<()> {
        validate_group_uid(group_uid)?;
        validate_component_uid(component_uid)?;
        validate_setting_uid(setting_uid)?;

        let mut groups = self.groups.lock().expect("mutex poisoned");
        let group = groups.get_mut(group_uid).ok_or_else(|| not_found(group_uid))?;

        let Some(association) = group.components.get(component_uid) else {
            return Ok(());
        };
        let old_value = association
            .settings
            .get(setting_uid)
            .cloned()
            .unwrap_or(Value::Null);
        if old_value == value {
            return Ok(());
        }

        let backup = group.clone();
        if let Some(association) = group.components.get_mut(component_uid) {
            association
                .settings
                .insert(setting_uid.to_string(), value.clone());
        }

        if let Err(err) = self.save_component_group(group) {
            *group = backup;
            return Err(err);
        }

        self.bus.publish(
            BusMessage::of_type(event::ASSOCIATION_SETTING_CHANGED)
                .with("component_group_uid", group_uid)
                .with("component_uid", component_uid)
                .with("setting_uid", setting_uid)
                .with("old_value", old_value)
                .with("new_value", value),
        );

        Ok(())
    }

    /// Remove a component association setting. A missing association or
    /// setting is a silent no-op.
    pub fn remove_component_association_setting(
        &self,
        group_uid: &str,
        component_uid: &str,
        setting_uid: &str,
    ) -> Result<()> {
        validate_group_uid(group_uid)?;
        validate_component_uid(component_uid)?;
        validate_setting_uid(setting_uid)?;

        let mut groups = self.groups.lock().expect("mutex poisoned");
        let group = groups.get_mut(group_uid).ok_or_else(|| not_found(group_uid))?;

        let has_setting = group
            .components
            .get(component_uid)
            .is_some_and(|association| association.settings.contains_key(setting_uid));
        if !has_setting {
            return Ok(());
        }

        let backup = group.clone();
        let old_value = group
            .components
            .get_mut(component_uid)
            .and_then(|association| association.settings.remove(setting_uid))
            .unwrap_or(Value::Null);

        if let Err(err) = self.save_component_group(group) {
            *group = backup;
            return Err(err);
        }

        self.bus.publish(
            BusMessage::of_type(event::ASSOCIATION_SETTING_CHANGED)
                .with("component_group_uid", group_uid)
                .with("component_uid", component_uid)
                .with("setting_uid", setting_uid)
                .with("old_value", old_value)
                .with("new_value", Value::Null),
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message_bus::SubscriptionQueue;
    use crate::testing::{test_bus, InMemoryStorage};
    use serde_json::json;
    use wirehome_domain::error::WirehomeError;
    use wirehome_domain::message::MessageFilter;

    fn registry() -> (
        ComponentGroupRegistry<Arc<InMemoryStorage>>,
        Arc<MessageBus>,
        Arc<InMemoryStorage>,
    ) {
        let bus = test_bus();
        let storage = Arc::new(InMemoryStorage::new());
        (
            ComponentGroupRegistry::new(Arc::clone(&storage), Arc::clone(&bus)),
            bus,
            storage,
        )
    }

    fn observe_all(bus: &MessageBus) -> Arc<SubscriptionQueue> {
        let (_uid, queue) = bus.subscribe_queue(vec![MessageFilter::new()], None);
        queue
    }

    #[tokio::test]
    async fn should_register_group_and_persist_documents() {
        let (registry, bus, storage) = registry();
        let queue = observe_all(&bus);

        registry
            .register_component_group("room.kitchen", HashMap::new())
            .unwrap();

        assert_eq!(
            storage.document(&["ComponentGroups", "room.kitchen", "configuration.json"]),
            Some(json!({}))
        );
        assert_eq!(
            storage.document(&["ComponentGroups", "room.kitchen", "settings.json"]),
            Some(json!({}))
        );
        let events = queue.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].message_type(),
            Some("component_group_registry.event.component_group_registered")
        );
    }

    #[tokio::test]
    async fn should_assign_component_idempotently() {
        let (registry, bus, _storage) = registry();
        registry
            .register_component_group("room.kitchen", HashMap::new())
            .unwrap();
        let queue = observe_all(&bus);

        registry.assign_component("room.kitchen", "lamp.1").unwrap();
        registry.assign_component("room.kitchen", "lamp.1").unwrap();

        let events = queue.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].message_type(),
            Some("component_group_registry.event.component_assigned")
        );
        assert_eq!(
            events[0].get("component_group_uid"),
            Some(&json!("room.kitchen"))
        );
        assert_eq!(events[0].get("component_uid"), Some(&json!("lamp.1")));
    }

    #[tokio::test]
    async fn should_unassign_component_idempotently() {
        let (registry, bus, _storage) = registry();
        registry
            .register_component_group("room.kitchen", HashMap::new())
            .unwrap();
        registry.assign_component("room.kitchen", "lamp.1").unwrap();
        let queue = observe_all(&bus);

        registry.unassign_component("room.kitchen", "lamp.1").unwrap();
        registry.unassign_component("room.kitchen", "lamp.1").unwrap();

        let events = queue.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].message_type(),
            Some("component_group_registry.event.component_unassigned")
        );
    }

    #[tokio::test]
    async fn should_persist_association_settings_document() {
        let (registry, _bus, storage) = registry();
        registry
            .register_component_group("room.kitchen", HashMap::new())
            .unwrap();
        registry.assign_component("room.kitchen", "lamp.1").unwrap();

        assert_eq!(
            storage.document(&[
                "ComponentGroups",
                "room.kitchen",
                "Components",
                "lamp.1",
                "settings.json"
            ]),
            Some(json!({}))
        );
    }

    #[tokio::test]
    async fn should_reconcile_stale_association_directory_on_save() {
        let (registry, _bus, storage) = registry();
        registry
            .register_component_group("room.kitchen", HashMap::new())
            .unwrap();
        registry.assign_component("room.kitchen", "lamp.1").unwrap();

        registry.unassign_component("room.kitchen", "lamp.1").unwrap();

        assert_eq!(
            storage.document(&[
                "ComponentGroups",
                "room.kitchen",
                "Components",
                "lamp.1",
                "settings.json"
            ]),
            None
        );
    }

    #[tokio::test]
    async fn should_assign_and_unassign_macros() {
        let (registry, bus, storage) = registry();
        registry
            .register_component_group("room.kitchen", HashMap::new())
            .unwrap();
        let queue = observe_all(&bus);

        registry.assign_macro("room.kitchen", "macro.all_off").unwrap();
        assert_eq!(
            storage.document(&[
                "ComponentGroups",
                "room.kitchen",
                "Macros",
                "macro.all_off",
                "settings.json"
            ]),
            Some(json!({}))
        );

        registry.unassign_macro("room.kitchen", "macro.all_off").unwrap();

        let types: Vec<_> = queue
            .drain()
            .iter()
            .map(|m| m.message_type().map(ToString::to_string))
            .collect();
        assert_eq!(
            types,
            vec![
                Some("component_group_registry.event.macro_assigned".to_string()),
                Some("component_group_registry.event.macro_unassigned".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn should_publish_written_value_in_new_value_slot() {
        let (registry, bus, _storage) = registry();
        registry
            .register_component_group("room.kitchen", HashMap::new())
            .unwrap();
        registry
            .set_component_group_setting("room.kitchen", "caption", json!("Kitchen"))
            .unwrap();
        let queue = observe_all(&bus);

        registry
            .set_component_group_setting("room.kitchen", "caption", json!("The Kitchen"))
            .unwrap();

        let events = queue.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].get("old_value"), Some(&json!("Kitchen")));
        assert_eq!(events[0].get("new_value"), Some(&json!("The Kitchen")));
    }

    #[tokio::test]
    async fn should_coalesce_equal_group_setting_writes() {
        let (registry, bus, _storage) = registry();
        registry
            .register_component_group("room.kitchen", HashMap::new())
            .unwrap();
        registry
            .set_component_group_setting("room.kitchen", "caption", json!("Kitchen"))
            .unwrap();
        let queue = observe_all(&bus);

        registry
            .set_component_group_setting("room.kitchen", "caption", json!("Kitchen"))
            .unwrap();

        assert!(queue.drain().is_empty());
    }

    #[tokio::test]
    async fn should_remove_group_setting_with_null_new_value() {
        let (registry, bus, _storage) = registry();
        registry
            .register_component_group("room.kitchen", HashMap::new())
            .unwrap();
        registry
            .set_component_group_setting("room.kitchen", "caption", json!("Kitchen"))
            .unwrap();
        let queue = observe_all(&bus);

        registry
            .remove_component_group_setting("room.kitchen", "caption")
            .unwrap();
        registry
            .remove_component_group_setting("room.kitchen", "caption")
            .unwrap();

        let events = queue.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].get("old_value"), Some(&json!("Kitchen")));
        assert_eq!(events[0].get("new_value"), Some(&json!(null)));
    }

    #[tokio::test]
    async fn should_treat_association_setting_write_on_missing_association_as_noop() {
        let (registry, bus, _storage) = registry();
        registry
            .register_component_group("room.kitchen", HashMap::new())
            .unwrap();
        let queue = observe_all(&bus);

        registry
            .set_component_association_setting("room.kitchen", "lamp.1", "position", json!(2))
            .unwrap();

        assert!(queue.drain().is_empty());
        assert_eq!(
            registry
                .get_component_association_setting("room.kitchen", "lamp.1", "position")
                .unwrap(),
            json!(null)
        );
    }

    #[tokio::test]
    async fn should_set_and_remove_association_setting() {
        let (registry, bus, storage) = registry();
        registry
            .register_component_group("room.kitchen", HashMap::new())
            .unwrap();
        registry.assign_component("room.kitchen", "lamp.1").unwrap();
        let queue = observe_all(&bus);

        registry
            .set_component_association_setting("room.kitchen", "lamp.1", "position", json!(2))
            .unwrap();

        assert_eq!(
            registry
                .get_component_association_setting("room.kitchen", "lamp.1", "position")
                .unwrap(),
            json!(2)
        );
        assert_eq!(
            storage.document(&[
                "ComponentGroups",
                "room.kitchen",
                "Components",
                "lamp.1",
                "settings.json"
            ]),
            Some(json!({"position": 2}))
        );

        registry
            .remove_component_association_setting("room.kitchen", "lamp.1", "position")
            .unwrap();
        registry
            .remove_component_association_setting("room.kitchen", "lamp.1", "position")
            .unwrap();

        let events = queue.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0].message_type(),
            Some("component_group_registry.event.association_setting_changed")
        );
        assert_eq!(events[1].get("old_value"), Some(&json!(2)));
        assert_eq!(events[1].get("new_value"), Some(&json!(null)));
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_group() {
        let (registry, _bus, _storage) = registry();
        assert!(matches!(
            registry.assign_component("missing", "lamp.1"),
            Err(WirehomeError::NotFound(_))
        ));
        assert!(matches!(
            registry.get_component_association_setting("missing", "lamp.1", "position"),
            Err(WirehomeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_roll_back_assignment_when_storage_fails() {
        let (registry, bus, storage) = registry();
        registry
            .register_component_group("room.kitchen", HashMap::new())
            .unwrap();
        let queue = observe_all(&bus);

        storage.fail_next_writes(true);
        let result = registry.assign_component("room.kitchen", "lamp.1");

        assert!(matches!(result, Err(WirehomeError::Storage(_))));
        let group = registry.get_component_group("room.kitchen").unwrap();
        assert!(group.components.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[tokio::test]
    async fn should_reload_group_with_associations_from_storage() {
        let (registry, bus, storage) = registry();
        registry
            .register_component_group("room.kitchen", HashMap::new())
            .unwrap();
        registry.assign_component("room.kitchen", "lamp.1").unwrap();
        registry
            .set_component_association_setting("room.kitchen", "lamp.1", "position", json!(2))
            .unwrap();
        registry.assign_macro("room.kitchen", "macro.all_off").unwrap();
        registry
            .set_component_group_setting("room.kitchen", "caption", json!("Kitchen"))
            .unwrap();

        let restarted = ComponentGroupRegistry::new(Arc::clone(&storage), Arc::clone(&bus));
        restarted.initialize().unwrap();

        let group = restarted.get_component_group("room.kitchen").unwrap();
        let before_restart = registry.get_component_group("room.kitchen").unwrap();
        assert_eq!(group, before_restart);
        assert!(group.components.contains_key("lamp.1"));
        assert!(group.macros.contains_key("macro.all_off"));
        assert_eq!(
            group.components["lamp.1"].settings.get("position"),
            Some(&json!(2))
        );
    }

    #[tokio::test]
    async fn should_delete_group_and_its_directory() {
        let (registry, bus, storage) = registry();
        registry
            .register_component_group("room.kitchen", HashMap::new())
            .unwrap();
        registry.assign_component("room.kitchen", "lamp.1").unwrap();
        let queue = observe_all(&bus);

        registry.delete_component_group("room.kitchen").unwrap();

        assert!(registry
            .try_get_component_group("room.kitchen")
            .unwrap()
            .is_none());
        assert_eq!(
            storage.document(&["ComponentGroups", "room.kitchen", "configuration.json"]),
            None
        );
        let events = queue.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].message_type(),
            Some("component_group_registry.event.component_group_deleted")
        );
    }
}
