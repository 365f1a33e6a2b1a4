//! JSON REST handlers for global variables.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use wirehome_app::ports::Storage;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/v1/global_variables`
pub async fn list<S>(State(state): State<AppState<S>>) -> Json<Value>
where
    S: Storage + Send + Sync + 'static,
{
    Json(Value::Object(state.global_variables.snapshot()))
}

/// `GET /api/v1/global_variables/{uid}`
pub async fn get<S>(
    State(state): State<AppState<S>>,
    Path(uid): Path<String>,
) -> Result<Json<Value>, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    let value = state.global_variables.get_value(&uid)?;
    Ok(Json(value))
}

/// `POST /api/v1/global_variables/{uid}`
pub async fn set<S>(
    State(state): State<AppState<S>>,
    Path(uid): Path<String>,
    Json(value): Json<Value>,
) -> Result<StatusCode, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    state.global_variables.set_value(&uid, value)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/v1/global_variables/{uid}`
pub async fn remove<S>(
    State(state): State<AppState<S>>,
    Path(uid): Path<String>,
) -> Result<StatusCode, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    state.global_variables.remove_value(&uid)?;
    Ok(StatusCode::NO_CONTENT)
}
