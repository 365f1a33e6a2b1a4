//! Component groups — named collections of components and macros.
//!
//! Membership is modeled as [`ComponentGroupAssociation`] edges keyed by the
//! member uid. An association carries its own settings map and holds only the
//! member's uid — it does not own the member, so deleting a component never
//! cascades into the groups referencing it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A membership edge from a group to a component or macro.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentGroupAssociation {
    pub settings: HashMap<String, Value>,
}

/// A named collection of components and macros with its own settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentGroup {
    pub uid: String,
    pub configuration: HashMap<String, Value>,
    pub settings: HashMap<String, Value>,
    pub components: HashMap<String, ComponentGroupAssociation>,
    pub macros: HashMap<String, ComponentGroupAssociation>,
}

impl ComponentGroup {
    /// Create an empty group.
    #[must_use]
    pub fn new(uid: impl Into<String>, configuration: HashMap<String, Value>) -> Self {
        Self {
            uid: uid.into(),
            configuration,
            settings: HashMap::new(),
            components: HashMap::new(),
            macros: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_start_with_no_members() {
        let group = ComponentGroup::new("room.kitchen", HashMap::new());
        assert_eq!(group.uid, "room.kitchen");
        assert!(group.components.is_empty());
        assert!(group.macros.is_empty());
    }

    #[test]
    fn should_default_association_to_empty_settings() {
        let association = ComponentGroupAssociation::default();
        assert!(association.settings.is_empty());
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let mut group = ComponentGroup::new("room.kitchen", HashMap::new());
        let mut association = ComponentGroupAssociation::default();
        association
            .settings
            .insert("position".to_string(), json!(2));
        group.components.insert("lamp.1".to_string(), association);

        let json = serde_json::to_string(&group).unwrap();
        let parsed: ComponentGroup = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, group);
    }
}
