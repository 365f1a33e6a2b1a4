//! JSON REST handlers for system status and the repository proxy.

use std::str::FromStr;

use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

use wirehome_app::ports::Storage;
use wirehome_domain::package::PackageUid;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/v1/system/status`
pub async fn status<S>(State(state): State<AppState<S>>) -> Json<Value>
where
    S: Storage + Send + Sync + 'static,
{
    Json(Value::Object(state.system_status.snapshot()))
}

/// `GET /api/v1/repository/{uid}/{filename}/uri`
///
/// Resolves a `"<id>@<version>"` package uid and filename to the repository
/// file URI — the contract the script host's `repository` module exposes.
pub async fn repository_file_uri<S>(
    State(_state): State<AppState<S>>,
    Path((uid, filename)): Path<(String, String)>,
) -> Result<Json<String>, ApiError>
where
    S: Storage + Send + Sync + 'static,
{
    let package = PackageUid::from_str(&uid).map_err(wirehome_domain::error::WirehomeError::from)?;
    Ok(Json(package.file_uri(&filename)))
}
