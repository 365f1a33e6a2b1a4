//! Notifications — user-facing messages kept in RAM and surfaced over HTTP.

use std::sync::{Arc, Mutex};

use uuid::Uuid;

use wirehome_domain::event::notifications as event;
use wirehome_domain::message::BusMessage;
use wirehome_domain::notification::{Notification, NotificationKind};

use crate::message_bus::MessageBus;

/// In-memory notification list with bus announcements.
pub struct NotificationsService {
    bus: Arc<MessageBus>,
    notifications: Mutex<Vec<Notification>>,
}

impl NotificationsService {
    #[must_use]
    pub fn new(bus: Arc<MessageBus>) -> Self {
        Self {
            bus,
            notifications: Mutex::new(Vec::new()),
        }
    }

    /// Publish a new notification and announce it on the bus.
    pub fn publish(&self, kind: NotificationKind, message: impl Into<String>) -> Notification {
        let notification = Notification::new(kind, message);

        let mut notifications = self.notifications.lock().expect("mutex poisoned");
        notifications.push(notification.clone());

        self.bus.publish(
            BusMessage::of_type(event::PUBLISHED)
                .with("notification_uid", notification.uid.to_string())
                .with("message", notification.message.clone()),
        );

        notification
    }

    /// Dismiss a notification. Unknown uids are a no-op.
    pub fn delete(&self, uid: Uuid) {
        let mut notifications = self.notifications.lock().expect("mutex poisoned");
        let before = notifications.len();
        notifications.retain(|notification| notification.uid != uid);
        if notifications.len() == before {
            return;
        }

        self.bus.publish(
            BusMessage::of_type(event::DELETED).with("notification_uid", uid.to_string()),
        );
    }

    /// Snapshot of all notifications, oldest first.
    #[must_use]
    pub fn list(&self) -> Vec<Notification> {
        self.notifications.lock().expect("mutex poisoned").clone()
    }
}
