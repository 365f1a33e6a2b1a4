//! Bus event type strings published by the core services.
//!
//! Event types are open-ended strings because scripts and integrations add
//! their own; the constants here cover everything the core publishes.

/// Events published by the component registry.
pub mod component_registry {
    pub const COMPONENT_REGISTERED: &str = "component_registry.event.component_registered";
    pub const COMPONENT_DELETED: &str = "component_registry.event.component_deleted";
    pub const INITIALIZED: &str = "component_registry.event.initialized";
    pub const SETTING_CHANGED: &str = "component_registry.event.setting_changed";
    pub const STATUS_CHANGED: &str = "component_registry.event.status_changed";
}

/// Events published by the component group registry.
pub mod component_group_registry {
    pub const COMPONENT_GROUP_REGISTERED: &str =
        "component_group_registry.event.component_group_registered";
    pub const COMPONENT_GROUP_DELETED: &str =
        "component_group_registry.event.component_group_deleted";
    pub const INITIALIZED: &str = "component_group_registry.event.initialized";
    pub const COMPONENT_ASSIGNED: &str = "component_group_registry.event.component_assigned";
    pub const COMPONENT_UNASSIGNED: &str = "component_group_registry.event.component_unassigned";
    pub const MACRO_ASSIGNED: &str = "component_group_registry.event.macro_assigned";
    pub const MACRO_UNASSIGNED: &str = "component_group_registry.event.macro_unassigned";
    pub const SETTING_CHANGED: &str = "component_group_registry.event.setting_changed";
    pub const ASSOCIATION_SETTING_CHANGED: &str =
        "component_group_registry.event.association_setting_changed";
}

/// Events published by the global variables service.
pub mod global_variables {
    pub const VALUE_SET: &str = "global_variables.event.value_set";
    pub const VALUE_REMOVED: &str = "global_variables.event.value_removed";
}

/// Events published by the notifications service.
pub mod notifications {
    pub const PUBLISHED: &str = "notifications.event.published";
    pub const DELETED: &str = "notifications.event.deleted";
}
