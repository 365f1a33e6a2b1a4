//! JSON REST handlers for components.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use wirehome_app::ports::Storage;
use wirehome_domain::component::Component;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/v1/components`
pub async fn list<S>(State(state): State<AppState<S>>) -> Json<Vec<Component>>
where
    S: Storage + Send + Sync + 'static,
{
    Json(state.component_registry.get_components())
}

/// `GET /api/v1/components/{uid}`
pub async fn get<S>(
    State(state): State<AppState<S>>,
    Path(uid): Path<String>,
) -> Result<Json<Component>, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    let component = state.component_registry.get_component(&uid)?;
    Ok(Json(component))
}

/// `POST /api/v1/components/{uid}` — register with the body as configuration.
pub async fn register<S>(
    State(state): State<AppState<S>>,
    Path(uid): Path<String>,
    Json(configuration): Json<HashMap<String, Value>>,
) -> Result<(StatusCode, Json<Component>), ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    let component = state
        .component_registry
        .register_component(&uid, configuration)?;
    Ok((StatusCode::CREATED, Json(component)))
}

/// `DELETE /api/v1/components/{uid}`
pub async fn delete<S>(
    State(state): State<AppState<S>>,
    Path(uid): Path<String>,
) -> Result<StatusCode, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    state.component_registry.delete_component(&uid)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/v1/components/{uid}/initialize` — reload from storage.
pub async fn initialize<S>(
    State(state): State<AppState<S>>,
    Path(uid): Path<String>,
) -> Result<Json<Component>, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    let component = state.component_registry.initialize_component(&uid)?;
    Ok(Json(component))
}

/// `GET /api/v1/components/{uid}/settings/{setting_uid}`
pub async fn get_setting<S>(
    State(state): State<AppState<S>>,
    Path((uid, setting_uid)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    let value = state.component_registry.get_setting(&uid, &setting_uid)?;
    Ok(Json(value))
}

/// `POST /api/v1/components/{uid}/settings/{setting_uid}`
pub async fn set_setting<S>(
    State(state): State<AppState<S>>,
    Path((uid, setting_uid)): Path<(String, String)>,
    Json(value): Json<Value>,
) -> Result<StatusCode, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    state
        .component_registry
        .set_setting(&uid, &setting_uid, value)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/v1/components/{uid}/settings/{setting_uid}`
pub async fn remove_setting<S>(
    State(state): State<AppState<S>>,
    Path((uid, setting_uid)): Path<(String, String)>,
) -> Result<StatusCode, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    state
        .component_registry
        .remove_setting(&uid, &setting_uid)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/v1/components/{uid}/status/{status_uid}`
pub async fn get_status<S>(
    State(state): State<AppState<S>>,
    Path((uid, status_uid)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    let value = state.component_registry.get_status(&uid, &status_uid)?;
    Ok(Json(value))
}

/// `POST /api/v1/components/{uid}/status/{status_uid}`
pub async fn set_status<S>(
    State(state): State<AppState<S>>,
    Path((uid, status_uid)): Path<(String, String)>,
    Json(value): Json<Value>,
) -> Result<StatusCode, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    state
        .component_registry
        .set_status(&uid, &status_uid, value)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/v1/components/{uid}/status/{status_uid}`
pub async fn remove_status<S>(
    State(state): State<AppState<S>>,
    Path((uid, status_uid)): Path<(String, String)>,
) -> Result<StatusCode, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    state.component_registry.remove_status(&uid, &status_uid)?;
    Ok(StatusCode::NO_CONTENT)
}
