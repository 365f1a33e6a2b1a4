//! JSON REST handlers for the message bus: publish, history and the
//! long-poll wait endpoint.

use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use wirehome_app::ports::Storage;
use wirehome_domain::message::{BusMessage, MessageFilter};
use wirehome_domain::time::Timestamp;

use crate::state::AppState;

/// Default long-poll timeout used when the query omits one.
const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 5;

/// Query parameters of the wait endpoint.
#[derive(Debug, Deserialize)]
pub struct WaitQuery {
    /// Long-poll timeout in seconds.
    pub timeout: Option<u64>,
    /// Seed the response with history entries newer than this instant.
    pub since: Option<Timestamp>,
}

/// `POST /api/v1/message_bus/wait_for?timeout=<sec>`
///
/// Body: JSON array of filter objects (a message matches when it matches any
/// one of them). Responds with the matched messages, or an empty array once
/// the timeout elapses.
pub async fn wait_for<S>(
    State(state): State<AppState<S>>,
    Query(query): Query<WaitQuery>,
    Json(filters): Json<Vec<MessageFilter>>,
) -> Json<Vec<BusMessage>>
where
    S: Storage + Send + Sync + 'static,
{
    let timeout = Duration::from_secs(query.timeout.unwrap_or(DEFAULT_WAIT_TIMEOUT_SECS));
    let messages = state
        .message_bus
        .wait_for(filters, query.since, timeout)
        .await;
    Json(messages)
}

/// `POST /api/v1/message_bus/message` — publish a message.
pub async fn publish<S>(
    State(state): State<AppState<S>>,
    Json(message): Json<BusMessage>,
) -> StatusCode
where
    S: Storage + Send + Sync + 'static,
{
    state.message_bus.publish(message);
    StatusCode::NO_CONTENT
}

/// `GET /api/v1/message_bus/history` — the retained message ring, oldest
/// first.
pub async fn history<S>(State(state): State<AppState<S>>) -> Json<Vec<BusMessage>>
where
    S: Storage + Send + Sync + 'static,
{
    Json(state.message_bus.history())
}
