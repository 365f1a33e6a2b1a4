//! JSON REST handlers for notifications.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use wirehome_app::ports::Storage;
use wirehome_domain::notification::{Notification, NotificationKind};

use crate::state::AppState;

/// Request body for publishing a notification.
#[derive(Debug, Deserialize)]
pub struct PublishNotificationRequest {
    pub kind: NotificationKind,
    pub message: String,
}

/// `GET /api/v1/notifications`
pub async fn list<S>(State(state): State<AppState<S>>) -> Json<Vec<Notification>>
where
    S: Storage + Send + Sync + 'static,
{
    Json(state.notifications.list())
}

/// `POST /api/v1/notifications`
pub async fn publish<S>(
    State(state): State<AppState<S>>,
    Json(request): Json<PublishNotificationRequest>,
) -> (StatusCode, Json<Notification>)
where
    S: Storage + Send + Sync + 'static,
{
    let notification = state.notifications.publish(request.kind, request.message);
    (StatusCode::CREATED, Json(notification))
}

/// `DELETE /api/v1/notifications/{uid}` — always 204; unknown uids are a
/// no-op.
pub async fn delete<S>(State(state): State<AppState<S>>, Path(uid): Path<Uuid>) -> StatusCode
where
    S: Storage + Send + Sync + 'static,
{
    state.notifications.delete(uid);
    StatusCode::NO_CONTENT
}
