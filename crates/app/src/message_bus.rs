//! In-process message bus with filter subscriptions, a bounded history ring
//! and long-poll wait semantics.
//!
//! One lock covers the subscription table and the history ring. Publication
//! enqueues into per-subscription queues under that lock; push callbacks are
//! invoked after releasing it, in the order recorded while locked. All
//! matching subscribers therefore observe messages in the order the bus
//! assigned timestamps, and FIFO is strict within a subscriber.

pub mod subscription;

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use uuid::Uuid;

use wirehome_domain::error::Result;
use wirehome_domain::message::{BusMessage, MessageFilter};
use wirehome_domain::time::{self, Timestamp};

use crate::diagnostics::OperationsPerSecondCounter;
use crate::shutdown::SystemCancellationToken;

pub use subscription::SubscriptionQueue;

/// Uid of the OPS counter incremented on every publish.
pub const MESSAGES_PUBLISHED_COUNTER: &str = "message_bus.messages_published";

/// Push subscriber callback, invoked synchronously on the publisher.
pub type PushCallback = Arc<dyn Fn(&BusMessage) -> Result<()> + Send + Sync>;

/// Tunables for the bus.
#[derive(Debug, Clone)]
pub struct MessageBusConfig {
    /// Messages retained in the history ring.
    pub history_capacity: usize,
    /// Capacity of each long-poll subscription queue.
    pub queue_capacity: usize,
}

impl Default for MessageBusConfig {
    fn default() -> Self {
        Self {
            history_capacity: 1000,
            queue_capacity: 100,
        }
    }
}

enum Dispatch {
    Callback(PushCallback),
    Queue(Arc<SubscriptionQueue>),
}

struct Subscription {
    filters: Vec<MessageFilter>,
    dispatch: Dispatch,
}

impl Subscription {
    fn matches(&self, message: &BusMessage) -> bool {
        self.filters.iter().any(|filter| filter.matches(message))
    }
}

struct BusInner {
    history: VecDeque<BusMessage>,
    subscriptions: HashMap<Uuid, Subscription>,
    last_timestamp: Option<Timestamp>,
}

/// The in-process pub/sub router.
pub struct MessageBus {
    config: MessageBusConfig,
    inner: Mutex<BusInner>,
    messages_published: Arc<OperationsPerSecondCounter>,
    shutdown: SystemCancellationToken,
}

impl MessageBus {
    #[must_use]
    pub fn new(
        config: MessageBusConfig,
        messages_published: Arc<OperationsPerSecondCounter>,
        shutdown: SystemCancellationToken,
    ) -> Self {
        Self {
            config,
            inner: Mutex::new(BusInner {
                history: VecDeque::new(),
                subscriptions: HashMap::new(),
                last_timestamp: None,
            }),
            messages_published,
            shutdown,
        }
    }

    /// Publish a message to every matching subscriber.
    ///
    /// Assigns the `timestamp` if absent (non-decreasing across the publish
    /// sequence), appends to the history ring, enqueues to matching long-poll
    /// queues and then invokes matching push callbacks. Callback errors are
    /// logged and never prevent dispatch to other subscribers.
    pub fn publish(&self, mut message: BusMessage) {
        let callbacks = {
            let mut inner = self.inner.lock().expect("mutex poisoned");

            if !message.has_timestamp() {
                let mut timestamp = time::now();
                if let Some(last) = inner.last_timestamp {
                    if timestamp < last {
                        timestamp = last;
                    }
                }
                inner.last_timestamp = Some(timestamp);
                message.set_timestamp(timestamp);
            }

            if inner.history.len() == self.config.history_capacity {
                inner.history.pop_front();
            }
            inner.history.push_back(message.clone());

            let mut callbacks = Vec::new();
            for subscription in inner.subscriptions.values() {
                if !subscription.matches(&message) {
                    continue;
                }
                match &subscription.dispatch {
                    Dispatch::Queue(queue) => queue.enqueue(message.clone()),
                    Dispatch::Callback(callback) => callbacks.push(Arc::clone(callback)),
                }
            }
            callbacks
        };

        for callback in callbacks {
            if let Err(err) = callback(&message) {
                tracing::warn!(
                    error = %err,
                    message_type = message.message_type().unwrap_or(""),
                    "push subscriber failed"
                );
            }
        }

        self.messages_published.increment();
    }

    /// Register a push subscription. The callback runs synchronously on the
    /// publisher for every matching message.
    pub fn subscribe(&self, filter: MessageFilter, callback: PushCallback) -> Uuid {
        let uid = Uuid::new_v4();
        let mut inner = self.inner.lock().expect("mutex poisoned");
        inner.subscriptions.insert(
            uid,
            Subscription {
                filters: vec![filter],
                dispatch: Dispatch::Callback(callback),
            },
        );
        uid
    }

    /// Register a long-poll subscription with a fresh bounded queue.
    ///
    /// When `since` is supplied the queue is seeded, under the bus lock, with
    /// the history messages newer than it that match any filter — a client
    /// that briefly disconnected can catch up without a gap.
    pub fn subscribe_queue(
        &self,
        filters: Vec<MessageFilter>,
        since: Option<Timestamp>,
    ) -> (Uuid, Arc<SubscriptionQueue>) {
        let queue = Arc::new(SubscriptionQueue::new(self.config.queue_capacity));
        let uid = Uuid::new_v4();

        let mut inner = self.inner.lock().expect("mutex poisoned");
        if let Some(since) = since {
            for message in &inner.history {
                let newer = message.timestamp().is_some_and(|ts| ts > since);
                if newer && filters.iter().any(|filter| filter.matches(message)) {
                    queue.enqueue(message.clone());
                }
            }
        }
        inner.subscriptions.insert(
            uid,
            Subscription {
                filters,
                dispatch: Dispatch::Queue(Arc::clone(&queue)),
            },
        );
        (uid, queue)
    }

    /// Remove a subscription. A pending waiter on a long-poll subscription is
    /// woken and returns its (possibly empty) batch.
    pub fn unsubscribe(&self, uid: Uuid) {
        let removed = {
            let mut inner = self.inner.lock().expect("mutex poisoned");
            inner.subscriptions.remove(&uid)
        };
        if let Some(Subscription {
            dispatch: Dispatch::Queue(queue),
            ..
        }) = removed
        {
            queue.close();
        }
    }

    /// Await messages on a long-poll queue.
    ///
    /// Returns as soon as the queue is non-empty, or with whatever is queued
    /// (possibly nothing) once the timeout elapses, the queue is closed, or
    /// shutdown is signalled.
    pub async fn wait_for_messages(
        &self,
        queue: &SubscriptionQueue,
        timeout: Duration,
    ) -> Vec<BusMessage> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let batch = queue.drain();
            if !batch.is_empty() || queue.is_closed() {
                return batch;
            }
            tokio::select! {
                () = queue.notified() => {}
                () = tokio::time::sleep_until(deadline) => return queue.drain(),
                () = self.shutdown.cancelled() => return queue.drain(),
            }
        }
    }

    /// Long-poll for messages matching any of `filters`.
    ///
    /// Creates an ephemeral queue subscription (seeded from history when
    /// `since` is supplied), waits, and always removes the subscription
    /// before returning.
    pub async fn wait_for(
        &self,
        filters: Vec<MessageFilter>,
        since: Option<Timestamp>,
        timeout: Duration,
    ) -> Vec<BusMessage> {
        let (uid, queue) = self.subscribe_queue(filters, since);
        let batch = self.wait_for_messages(&queue, timeout).await;
        self.unsubscribe(uid);
        batch
    }

    /// Snapshot of the history ring, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<BusMessage> {
        let inner = self.inner.lock().expect("mutex poisoned");
        inner.history.iter().cloned().collect()
    }

    /// Number of active subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        let inner = self.inner.lock().expect("mutex poisoned");
        inner.subscriptions.len()
    }

    /// Remove long-poll subscriptions that have not been drained within
    /// `max_idle`. Returns how many were removed. Push subscriptions never
    /// expire.
    pub fn prune_idle_subscriptions(&self, max_idle: Duration) -> usize {
        let expired: Vec<Arc<SubscriptionQueue>> = {
            let mut inner = self.inner.lock().expect("mutex poisoned");
            let stale: Vec<Uuid> = inner
                .subscriptions
                .iter()
                .filter_map(|(uid, subscription)| match &subscription.dispatch {
                    Dispatch::Queue(queue) if queue.idle_for() > max_idle => Some(*uid),
                    _ => None,
                })
                .collect();
            stale
                .iter()
                .filter_map(|uid| match inner.subscriptions.remove(uid) {
                    Some(Subscription {
                        dispatch: Dispatch::Queue(queue),
                        ..
                    }) => Some(queue),
                    _ => None,
                })
                .collect()
        };

        let count = expired.len();
        for queue in expired {
            queue.close();
        }
        if count > 0 {
            tracing::debug!(count, "pruned idle long-poll subscriptions");
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn bus() -> Arc<MessageBus> {
        bus_with_config(MessageBusConfig::default())
    }

    fn bus_with_config(config: MessageBusConfig) -> Arc<MessageBus> {
        Arc::new(MessageBus::new(
            config,
            Arc::new(OperationsPerSecondCounter::new(MESSAGES_PUBLISHED_COUNTER)),
            SystemCancellationToken::new(),
        ))
    }

    fn message(n: i64) -> BusMessage {
        BusMessage::of_type("test.event").with("n", n)
    }

    #[tokio::test]
    async fn should_deliver_matching_message_to_queue_subscription() {
        let bus = bus();
        let (_uid, queue) = bus.subscribe_queue(vec![MessageFilter::for_type("test.event")], None);

        bus.publish(message(1));

        let batch = queue.drain();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].get("n"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn should_not_deliver_non_matching_message() {
        let bus = bus();
        let (_uid, queue) = bus.subscribe_queue(vec![MessageFilter::for_type("other.event")], None);

        bus.publish(message(1));

        assert!(queue.drain().is_empty());
    }

    #[tokio::test]
    async fn should_not_deliver_messages_published_before_subscription() {
        let bus = bus();
        bus.publish(message(1));

        let (_uid, queue) = bus.subscribe_queue(vec![MessageFilter::for_type("test.event")], None);
        bus.publish(message(2));

        let batch = queue.drain();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].get("n"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn should_preserve_publish_order_for_each_subscriber() {
        let bus = bus();
        let (_a, queue_a) = bus.subscribe_queue(vec![MessageFilter::for_type("test.event")], None);
        let (_b, queue_b) = bus.subscribe_queue(vec![MessageFilter::new()], None);

        for n in 0..5 {
            bus.publish(message(n));
        }

        for queue in [queue_a, queue_b] {
            let ns: Vec<_> = queue
                .drain()
                .iter()
                .map(|m| m.get("n").and_then(serde_json::Value::as_i64))
                .collect();
            assert_eq!(ns, vec![Some(0), Some(1), Some(2), Some(3), Some(4)]);
        }
    }

    #[tokio::test]
    async fn should_assign_non_decreasing_timestamps() {
        let bus = bus();
        let (_uid, queue) = bus.subscribe_queue(vec![MessageFilter::new()], None);

        for n in 0..10 {
            bus.publish(message(n));
        }

        let timestamps: Vec<_> = queue
            .drain()
            .iter()
            .map(|m| m.timestamp().expect("bus assigns timestamps"))
            .collect();
        assert!(timestamps.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[tokio::test]
    async fn should_keep_caller_supplied_timestamp() {
        let bus = bus();
        let supplied = time::now() - chrono::Duration::hours(1);
        let mut message = BusMessage::of_type("test.event");
        message.set_timestamp(supplied);

        let (_uid, queue) = bus.subscribe_queue(vec![MessageFilter::new()], None);
        bus.publish(message);

        assert_eq!(queue.drain()[0].timestamp(), Some(supplied));
    }

    #[tokio::test]
    async fn should_invoke_push_callback_for_matching_messages() {
        let bus = bus();
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        bus.subscribe(
            MessageFilter::for_type("test.event"),
            Arc::new(move |_message| {
                counted.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );

        bus.publish(message(1));
        bus.publish(BusMessage::of_type("other.event"));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn should_continue_dispatch_when_callback_fails() {
        let bus = bus();
        bus.subscribe(
            MessageFilter::new(),
            Arc::new(|_message| {
                Err(wirehome_domain::error::NotFoundError {
                    entity: "Component",
                    uid: "missing".to_string(),
                }
                .into())
            }),
        );
        let (_uid, queue) = bus.subscribe_queue(vec![MessageFilter::new()], None);

        bus.publish(message(1));

        assert_eq!(queue.drain().len(), 1);
    }

    #[tokio::test]
    async fn should_stop_delivery_after_unsubscribe() {
        let bus = bus();
        let (uid, queue) = bus.subscribe_queue(vec![MessageFilter::new()], None);

        bus.unsubscribe(uid);
        bus.publish(message(1));

        assert!(queue.drain().is_empty());
        assert_eq!(bus.subscription_count(), 0);
    }

    #[tokio::test]
    async fn should_evict_oldest_history_entries_beyond_capacity() {
        let bus = bus_with_config(MessageBusConfig {
            history_capacity: 3,
            queue_capacity: 100,
        });

        for n in 0..5 {
            bus.publish(message(n));
        }

        let ns: Vec<_> = bus
            .history()
            .iter()
            .map(|m| m.get("n").and_then(serde_json::Value::as_i64))
            .collect();
        assert_eq!(ns, vec![Some(2), Some(3), Some(4)]);
    }

    #[tokio::test]
    async fn should_seed_queue_from_history_newer_than_since() {
        let bus = bus();
        bus.publish(message(1));
        let cutoff = time::now();
        tokio::time::sleep(Duration::from_millis(5)).await;
        bus.publish(message(2));

        let (_uid, queue) =
            bus.subscribe_queue(vec![MessageFilter::for_type("test.event")], Some(cutoff));

        let batch = queue.drain();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].get("n"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn should_return_messages_from_wait_for_when_published_concurrently() {
        let bus = bus();
        let waiter = {
            let bus = Arc::clone(&bus);
            tokio::spawn(async move {
                bus.wait_for(
                    vec![MessageFilter::for_type("test.event")],
                    None,
                    Duration::from_secs(5),
                )
                .await
            })
        };

        // Give the waiter time to install its subscription.
        tokio::time::sleep(Duration::from_millis(50)).await;
        bus.publish(message(7));

        let batch = waiter.await.expect("waiter should not panic");
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].get("n"), Some(&json!(7)));
        assert_eq!(bus.subscription_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn should_return_empty_from_wait_for_on_timeout() {
        let bus = bus();
        let batch = bus
            .wait_for(
                vec![MessageFilter::for_type("nothing.ever")],
                None,
                Duration::from_secs(1),
            )
            .await;

        assert!(batch.is_empty());
        assert_eq!(bus.subscription_count(), 0);
    }

    #[tokio::test]
    async fn should_wake_pending_waiter_on_unsubscribe() {
        let bus = bus();
        let (uid, queue) = bus.subscribe_queue(vec![MessageFilter::for_type("nothing.ever")], None);

        let waiter = {
            let bus = Arc::clone(&bus);
            let queue = Arc::clone(&queue);
            tokio::spawn(
                async move { bus.wait_for_messages(&queue, Duration::from_secs(30)).await },
            )
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        bus.unsubscribe(uid);

        let batch = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("unsubscribe should wake the waiter")
            .expect("waiter task should not panic");
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn should_release_waiter_on_shutdown() {
        let shutdown = SystemCancellationToken::new();
        let bus = Arc::new(MessageBus::new(
            MessageBusConfig::default(),
            Arc::new(OperationsPerSecondCounter::new(MESSAGES_PUBLISHED_COUNTER)),
            shutdown.clone(),
        ));

        let waiter = {
            let bus = Arc::clone(&bus);
            tokio::spawn(async move {
                bus.wait_for(
                    vec![MessageFilter::for_type("nothing.ever")],
                    None,
                    Duration::from_secs(30),
                )
                .await
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.cancel();

        let batch = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("shutdown should release the waiter")
            .expect("waiter task should not panic");
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn should_count_published_messages() {
        let counter = Arc::new(OperationsPerSecondCounter::new(MESSAGES_PUBLISHED_COUNTER));
        let bus = MessageBus::new(
            MessageBusConfig::default(),
            Arc::clone(&counter),
            SystemCancellationToken::new(),
        );

        bus.publish(message(1));
        bus.publish(message(2));
        counter.tick();

        assert_eq!(counter.last_rate(), 2);
    }

    #[tokio::test]
    async fn should_prune_only_idle_queue_subscriptions() {
        let bus = bus();
        let (_idle, idle_queue) = bus.subscribe_queue(vec![MessageFilter::new()], None);
        bus.subscribe(MessageFilter::new(), Arc::new(|_| Ok(())));

        tokio::time::sleep(Duration::from_millis(30)).await;
        let pruned = bus.prune_idle_subscriptions(Duration::from_millis(10));

        assert_eq!(pruned, 1);
        assert!(idle_queue.is_closed());
        assert_eq!(bus.subscription_count(), 1);
    }
}
