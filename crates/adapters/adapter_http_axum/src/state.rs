//! Shared application state for axum handlers.

use std::sync::Arc;

use wirehome_app::message_bus::MessageBus;
use wirehome_app::ports::Storage;
use wirehome_app::services::{
    ComponentGroupRegistry, ComponentRegistry, GlobalVariablesService, NotificationsService,
};
use wirehome_app::system_status::SystemStatusService;

/// Application state shared across all axum handlers.
///
/// Generic over the storage type to avoid dynamic dispatch. `Clone` is
/// implemented manually so the storage type itself does not need to be
/// `Clone` — only the `Arc` wrappers are cloned.
pub struct AppState<S> {
    pub message_bus: Arc<MessageBus>,
    pub component_registry: Arc<ComponentRegistry<S>>,
    pub component_group_registry: Arc<ComponentGroupRegistry<S>>,
    pub global_variables: Arc<GlobalVariablesService>,
    pub notifications: Arc<NotificationsService>,
    pub system_status: Arc<SystemStatusService>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            message_bus: Arc::clone(&self.message_bus),
            component_registry: Arc::clone(&self.component_registry),
            component_group_registry: Arc::clone(&self.component_group_registry),
            global_variables: Arc::clone(&self.global_variables),
            notifications: Arc::clone(&self.notifications),
            system_status: Arc::clone(&self.system_status),
        }
    }
}

impl<S: Storage + Send + Sync + 'static> AppState<S> {
    /// Create a new application state from already-shared services.
    pub fn new(
        message_bus: Arc<MessageBus>,
        component_registry: Arc<ComponentRegistry<S>>,
        component_group_registry: Arc<ComponentGroupRegistry<S>>,
        global_variables: Arc<GlobalVariablesService>,
        notifications: Arc<NotificationsService>,
        system_status: Arc<SystemStatusService>,
    ) -> Self {
        Self {
            message_bus,
            component_registry,
            component_group_registry,
            global_variables,
            notifications,
            system_status,
        }
    }
}
