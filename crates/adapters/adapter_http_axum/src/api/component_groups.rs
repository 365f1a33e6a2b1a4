//! JSON REST handlers for component groups, memberships and their settings.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use wirehome_app::ports::Storage;
use wirehome_domain::component_group::ComponentGroup;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/v1/component_groups`
pub async fn list<S>(State(state): State<AppState<S>>) -> Json<Vec<ComponentGroup>>
where
    S: Storage + Send + Sync + 'static,
{
    Json(state.component_group_registry.get_component_groups())
}

/// `GET /api/v1/areas` — the polling client's name for the group list.
pub async fn areas<S>(state: State<AppState<S>>) -> Json<Vec<ComponentGroup>>
where
    S: Storage + Send + Sync + 'static,
{
    list(state).await
}

/// `GET /api/v1/component_groups/{uid}`
pub async fn get<S>(
    State(state): State<AppState<S>>,
    Path(uid): Path<String>,
) -> Result<Json<ComponentGroup>, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    let group = state.component_group_registry.get_component_group(&uid)?;
    Ok(Json(group))
}

/// `POST /api/v1/component_groups/{uid}`
pub async fn register<S>(
    State(state): State<AppState<S>>,
    Path(uid): Path<String>,
    Json(configuration): Json<HashMap<String, Value>>,
) -> Result<(StatusCode, Json<ComponentGroup>), ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    let group = state
        .component_group_registry
        .register_component_group(&uid, configuration)?;
    Ok((StatusCode::CREATED, Json(group)))
}

/// `DELETE /api/v1/component_groups/{uid}`
pub async fn delete<S>(
    State(state): State<AppState<S>>,
    Path(uid): Path<String>,
) -> Result<StatusCode, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    state
        .component_group_registry
        .delete_component_group(&uid)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/v1/component_groups/{uid}/components/{component_uid}`
pub async fn assign_component<S>(
    State(state): State<AppState<S>>,
    Path((uid, component_uid)): Path<(String, String)>,
) -> Result<StatusCode, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    state
        .component_group_registry
        .assign_component(&uid, &component_uid)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/v1/component_groups/{uid}/components/{component_uid}`
pub async fn unassign_component<S>(
    State(state): State<AppState<S>>,
    Path((uid, component_uid)): Path<(String, String)>,
) -> Result<StatusCode, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    state
        .component_group_registry
        .unassign_component(&uid, &component_uid)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/v1/component_groups/{uid}/macros/{macro_uid}`
pub async fn assign_macro<S>(
    State(state): State<AppState<S>>,
    Path((uid, macro_uid)): Path<(String, String)>,
) -> Result<StatusCode, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    state
        .component_group_registry
        .assign_macro(&uid, &macro_uid)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/v1/component_groups/{uid}/macros/{macro_uid}`
pub async fn unassign_macro<S>(
    State(state): State<AppState<S>>,
    Path((uid, macro_uid)): Path<(String, String)>,
) -> Result<StatusCode, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    state
        .component_group_registry
        .unassign_macro(&uid, &macro_uid)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/v1/component_groups/{uid}/settings/{setting_uid}`
pub async fn get_setting<S>(
    State(state): State<AppState<S>>,
    Path((uid, setting_uid)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    let value = state
        .component_group_registry
        .get_component_group_setting(&uid, &setting_uid)?;
    Ok(Json(value))
}

/// `POST /api/v1/component_groups/{uid}/settings/{setting_uid}`
pub async fn set_setting<S>(
    State(state): State<AppState<S>>,
    Path((uid, setting_uid)): Path<(String, String)>,
    Json(value): Json<Value>,
) -> Result<StatusCode, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    state
        .component_group_registry
        .set_component_group_setting(&uid, &setting_uid, value)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/v1/component_groups/{uid}/settings/{setting_uid}`
pub async fn remove_setting<S>(
    State(state): State<AppState<S>>,
    Path((uid, setting_uid)): Path<(String, String)>,
) -> Result<StatusCode, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    state
        .component_group_registry
        .remove_component_group_setting(&uid, &setting_uid)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/v1/component_groups/{uid}/components/{component_uid}/settings/{setting_uid}`
pub async fn get_association_setting<S>(
    State(state): State<AppState<S>>,
    Path((uid, component_uid, setting_uid)): Path<(String, String, String)>,
) -> Result<Json<Value>, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    let value = state
        .component_group_registry
        .get_component_association_setting(&uid, &component_uid, &setting_uid)?;
    Ok(Json(value))
}

/// `POST /api/v1/component_groups/{uid}/components/{component_uid}/settings/{setting_uid}`
pub async fn set_association_setting<S>(
    State(state): State<AppState<S>>,
    Path((uid, component_uid, setting_uid)): Path<(String, String, String)>,
    Json(value): Json<Value>,
) -> Result<StatusCode, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    state
        .component_group_registry
        .set_component_association_setting(&uid, &component_uid, &setting_uid, value)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/v1/component_groups/{uid}/components/{component_uid}/settings/{setting_uid}`
pub async fn remove_association_setting<S>(
    State(state): State<AppState<S>>,
    Path((uid, component_uid, setting_uid)): Path<(String, String, String)>,
) -> Result<StatusCode, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    state
        .component_group_registry
        .remove_component_association_setting(&uid, &component_uid, &setting_uid)?;
    Ok(StatusCode::NO_CONTENT)
}
