//! Bounded per-subscription queues for long-poll delivery.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tokio::sync::Notify;

use wirehome_domain::message::BusMessage;

/// Buffer for one long-poll subscription.
///
/// Lifecycle: `Open → (messages queued) → Draining → Closed`. A closed queue
/// rejects further enqueues silently. On overflow the oldest message is
/// dropped and counted; publishers never block.
#[derive(Debug)]
pub struct SubscriptionQueue {
    capacity: usize,
    state: Mutex<QueueState>,
    notify: Notify,
}

#[derive(Debug)]
struct QueueState {
    messages: VecDeque<BusMessage>,
    closed: bool,
    dropped_messages: u64,
    last_drain: Instant,
}

impl SubscriptionQueue {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(QueueState {
                messages: VecDeque::new(),
                closed: false,
                dropped_messages: 0,
                last_drain: Instant::now(),
            }),
            notify: Notify::new(),
        }
    }

    /// Append a message, evicting the oldest when full. No-op once closed.
    pub fn enqueue(&self, message: BusMessage) {
        {
            let mut state = self.state.lock().expect("mutex poisoned");
            if state.closed {
                return;
            }
            if state.messages.len() == self.capacity {
                state.messages.pop_front();
                state.dropped_messages += 1;
            }
            state.messages.push_back(message);
        }
        self.notify.notify_one();
    }

    /// Take every queued message, FIFO.
    #[must_use]
    pub fn drain(&self) -> Vec<BusMessage> {
        let mut state = self.state.lock().expect("mutex poisoned");
        state.last_drain = Instant::now();
        state.messages.drain(..).collect()
    }

    /// Close the queue and wake a pending waiter.
    pub fn close(&self) {
        self.state.lock().expect("mutex poisoned").closed = true;
        self.notify.notify_one();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().expect("mutex poisoned").closed
    }

    /// How many messages were evicted by overflow so far.
    #[must_use]
    pub fn dropped_messages(&self) -> u64 {
        self.state.lock().expect("mutex poisoned").dropped_messages
    }

    /// Time since the last drain, for idle expiry.
    #[must_use]
    pub fn idle_for(&self) -> Duration {
        self.state
            .lock()
            .expect("mutex poisoned")
            .last_drain
            .elapsed()
    }

    /// Resolves when a message is enqueued or the queue is closed. A permit
    /// is stored if the signal arrives before the call, so no wakeup is lost.
    pub async fn notified(&self) {
        self.notify.notified().await;
    }
}
