//! String-topic publish/subscribe bus.
//!
//! Each topic is backed by its own `tokio::sync::broadcast` channel, created
//! lazily on first subscription. Publishing never blocks: a topic nobody
//! listens on drops the event, and a subscriber that falls behind loses the
//! oldest events (logged as lag) instead of stalling the publisher.
//!
//! # Example
//!
//! ```
//! use loctrack::bus::{BroadcastBus, TrackerEvent, PERMISSION_DENIED_TOPIC};
//!
//! let bus = BroadcastBus::new();
//! let mut rx = bus.subscribe(PERMISSION_DENIED_TOPIC);
//!
//! assert_eq!(bus.publish(PERMISSION_DENIED_TOPIC, TrackerEvent::PermissionDenied), 1);
//! assert_eq!(rx.try_recv().unwrap(), TrackerEvent::PermissionDenied);
//! ```

mod event;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

pub use event::{TrackerEvent, CURRENT_LOCATION_TOPIC, PERMISSION_DENIED_TOPIC};

/// Default per-topic buffer.
pub const DEFAULT_TOPIC_CAPACITY: usize = 64;

/// Callback invoked for every event on the topics it was registered for.
pub trait EventHandler: Send + Sync {
    fn handle(&self, topic: &str, event: &TrackerEvent);
}

impl<F> EventHandler for F
where
    F: Fn(&str, &TrackerEvent) + Send + Sync,
{
    fn handle(&self, topic: &str, event: &TrackerEvent) {
        self(topic, event)
    }
}

/// Registration returned by [`BroadcastBus::register`].
#[derive(Debug)]
pub struct ReceiverHandle {
    id: u64,
    topics: Vec<String>,
}

impl ReceiverHandle {
    /// Topics this handler listens on.
    pub fn topics(&self) -> &[String] {
        &self.topics
    }
}

/// In-process broadcast bus keyed by topic name.
pub struct BroadcastBus {
    topics: DashMap<String, broadcast::Sender<TrackerEvent>>,
    registrations: DashMap<u64, CancellationToken>,
    next_registration: AtomicU64,
    capacity: usize,
}

impl Default for BroadcastBus {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastBus {
    /// Create a bus with [`DEFAULT_TOPIC_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TOPIC_CAPACITY)
    }

    /// Create a bus buffering up to `capacity` events per topic.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            topics: DashMap::new(),
            registrations: DashMap::new(),
            next_registration: AtomicU64::new(1),
            capacity: capacity.max(1),
        }
    }

    /// Publish `event` on `topic`.
    ///
    /// Returns the number of subscribers the event was delivered to.
    pub fn publish(&self, topic: &str, event: TrackerEvent) -> usize {
        let Some(sender) = self.topics.get(topic).map(|s| s.clone()) else {
            tracing::trace!(topic, "No subscribers, event dropped");
            return 0;
        };
        match sender.send(event) {
            Ok(delivered) => delivered,
            Err(_) => {
                tracing::trace!(topic, "No subscribers, event dropped");
                0
            }
        }
    }

    /// Subscribe to `topic`.
    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<TrackerEvent> {
        self.topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Number of live subscribers on `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .get(topic)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Deliver every event on `topics` to `handler` until unregistered.
    ///
    /// Subscriptions are taken before this returns, so nothing published
    /// afterwards is missed. Must be called within a tokio runtime.
    pub fn register(&self, topics: &[&str], handler: Arc<dyn EventHandler>) -> ReceiverHandle {
        let id = self.next_registration.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        for topic in topics {
            let rx = self.subscribe(topic);
            tokio::spawn(forward_events(
                topic.to_string(),
                rx,
                Arc::clone(&handler),
                token.clone(),
            ));
        }
        self.registrations.insert(id, token);

        tracing::debug!(registration = id, topics = ?topics, "Handler registered");
        ReceiverHandle {
            id,
            topics: topics.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Stop delivering to a registered handler.
    ///
    /// Returns false if the handle was already unregistered.
    pub fn unregister(&self, handle: &ReceiverHandle) -> bool {
        match self.registrations.remove(&handle.id) {
            Some((_, token)) => {
                token.cancel();
                tracing::debug!(registration = handle.id, "Handler unregistered");
                true
            }
            None => false,
        }
    }
}

impl Drop for BroadcastBus {
    fn drop(&mut self) {
        for entry in self.registrations.iter() {
            entry.value().cancel();
        }
    }
}

async fn forward_events(
    topic: String,
    mut rx: broadcast::Receiver<TrackerEvent>,
    handler: Arc<dyn EventHandler>,
    cancellation: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancellation.cancelled() => break,
            result = rx.recv() => match result {
                Ok(event) => handler.handle(&topic, &event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(topic = %topic, skipped = n, "Handler lagged behind bus events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}
