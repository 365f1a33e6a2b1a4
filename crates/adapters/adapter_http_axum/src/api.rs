//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod component_groups;
#[allow(clippy::missing_errors_doc)]
pub mod components;
#[allow(clippy::missing_errors_doc)]
pub mod global_variables;
#[allow(clippy::missing_errors_doc)]
pub mod message_bus;
#[allow(clippy::missing_errors_doc)]
pub mod notifications;
#[allow(clippy::missing_errors_doc)]
pub mod system;

use axum::routing::{get, post};
use axum::Router;

use wirehome_app::ports::Storage;

use crate::state::AppState;

/// Build the `/api/v1` sub-router.
pub fn routes<S>() -> Router<AppState<S>>
where
    S: Storage + Send + Sync + 'static,
{
    Router::new()
        // Components
        .route("/components", get(components::list::<S>))
        .route(
            "/components/{uid}",
            get(components::get::<S>)
                .post(components::register::<S>)
                .delete(components::delete::<S>),
        )
        .route(
            "/components/{uid}/initialize",
            post(components::initialize::<S>),
        )
        .route(
            "/components/{uid}/settings/{setting_uid}",
            get(components::get_setting::<S>)
                .post(components::set_setting::<S>)
                .delete(components::remove_setting::<S>),
        )
        .route(
            "/components/{uid}/status/{status_uid}",
            get(components::get_status::<S>)
                .post(components::set_status::<S>)
                .delete(components::remove_status::<S>),
        )
        // Component groups
        .route("/component_groups", get(component_groups::list::<S>))
        .route("/areas", get(component_groups::areas::<S>))
        .route(
            "/component_groups/{uid}",
            get(component_groups::get::<S>)
                .post(component_groups::register::<S>)
                .delete(component_groups::delete::<S>),
        )
        .route(
            "/component_groups/{uid}/components/{component_uid}",
            post(component_groups::assign_component::<S>)
                .delete(component_groups::unassign_component::<S>),
        )
        .route(
            "/component_groups/{uid}/macros/{macro_uid}",
            post(component_groups::assign_macro::<S>)
                .delete(component_groups::unassign_macro::<S>),
        )
        .route(
            "/component_groups/{uid}/settings/{setting_uid}",
            get(component_groups::get_setting::<S>)
                .post(component_groups::set_setting::<S>)
                .delete(component_groups::remove_setting::<S>),
        )
        .route(
            "/component_groups/{uid}/components/{component_uid}/settings/{setting_uid}",
            get(component_groups::get_association_setting::<S>)
                .post(component_groups::set_association_setting::<S>)
                .delete(component_groups::remove_association_setting::<S>),
        )
        // Message bus
        .route("/message_bus/wait_for", post(message_bus::wait_for::<S>))
        .route("/message_bus/message", post(message_bus::publish::<S>))
        .route("/message_bus/history", get(message_bus::history::<S>))
        // Global variables
        .route("/global_variables", get(global_variables::list::<S>))
        .route(
            "/global_variables/{uid}",
            get(global_variables::get::<S>)
                .post(global_variables::set::<S>)
                .delete(global_variables::remove::<S>),
        )
        // Notifications
        .route(
            "/notifications",
            get(notifications::list::<S>).post(notifications::publish::<S>),
        )
        .route(
            "/notifications/{uid}",
            axum::routing::delete(notifications::delete::<S>),
        )
        // System
        .route("/system/status", get(system::status::<S>))
        .route(
            "/repository/{uid}/{filename}/uri",
            get(system::repository_file_uri::<S>),
        )
}
