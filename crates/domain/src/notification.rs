//! Notifications — user-facing messages surfaced through the HTTP API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::Timestamp;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Information,
    Warning,
    Error,
}

/// A user-facing message with a stable uid for dismissal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub uid: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub timestamp: Timestamp,
}

impl Notification {
    /// Create a notification stamped with the current time.
    #[must_use]
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            uid: Uuid::new_v4(),
            kind,
            message: message.into(),
            timestamp: crate::time::now(),
        }
    }
}
