//! # Bus Client
//!
//! The sending side of the bus: the `BusClient` contract and the in-process
//! `InMemoryBus` implementation.

use crate::error::BusError;
use crate::events::{BusEvent, EventTopic};
use crate::message::{Message, PendingReply};
use crate::subscriber::{Route, RouteTable, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Request timing and retry policy.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// How long `wait` blocks for a reply.
    pub request_timeout: Duration,
    /// Extra attempts for requests that were never delivered.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on each further attempt.
    pub retry_backoff: Duration,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            max_retries: 2,
            retry_backoff: Duration::from_millis(50),
        }
    }
}

/// Topic-addressed request/reply transport.
///
/// Implementors provide delivery (`send`) and consumption (`subscribe`);
/// reply waiting and the retry policy are shared.
#[async_trait]
pub trait BusClient: Send + Sync {
    fn config(&self) -> &BusConfig;

    /// Deliver `event` to the topic's subscriber.
    ///
    /// Returns the pending reply when `want_reply` is set.
    async fn send(
        &self,
        topic: EventTopic,
        event: BusEvent,
        want_reply: bool,
    ) -> Result<Option<PendingReply>, BusError>;

    /// Become the single consumer of `topic`.
    fn subscribe(&self, topic: EventTopic) -> Result<Subscription, BusError>;

    /// Stop accepting sends and close every subscription.
    fn close(&self);

    /// Wait for the reply to a previously sent request.
    async fn wait(&self, pending: PendingReply) -> Result<BusEvent, BusError> {
        let timeout = self.config().request_timeout;
        match tokio::time::timeout(timeout, pending.rx).await {
            Ok(Ok(Ok(event))) => Ok(event),
            Ok(Ok(Err(remote))) => Err(BusError::Remote(remote)),
            Ok(Err(_)) => Err(BusError::NoReply {
                topic: pending.topic,
            }),
            Err(_) => Err(BusError::Timeout {
                topic: pending.topic,
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    /// Send and wait, retrying undelivered requests with backoff.
    ///
    /// Timeouts are not retried: the handler may already have acted.
    async fn request(&self, topic: EventTopic, event: BusEvent) -> Result<BusEvent, BusError> {
        let max_retries = self.config().max_retries;
        let mut backoff = self.config().retry_backoff;
        let mut attempt = 0;
        loop {
            let result = match self.send(topic, event.clone(), true).await {
                Ok(Some(pending)) => self.wait(pending).await,
                Ok(None) => Err(BusError::NoReply { topic }),
                Err(e) => Err(e),
            };
            match result {
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    attempt += 1;
                    debug!(topic = %topic, attempt, error = %e, "Retrying bus request");
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                other => return other,
            }
        }
    }

    /// Fire-and-forget send.
    async fn notify(&self, topic: EventTopic, event: BusEvent) -> Result<(), BusError> {
        self.send(topic, event, false).await.map(|_| ())
    }
}

/// In-process bus.
///
/// Each topic is a bounded `tokio::sync::mpsc` queue with one consumer.
/// Suitable for single-node operation and tests; a networked deployment
/// would put a transport behind the same trait.
pub struct InMemoryBus {
    routes: RouteTable,
    config: BusConfig,
    capacity: usize,
    next_route_id: AtomicU64,
    messages_sent: AtomicU64,
    closed: AtomicBool,
}

impl InMemoryBus {
    /// Create a bus with default capacity and policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BusConfig::default(), DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus with the given policy and per-topic queue capacity.
    #[must_use]
    pub fn with_config(config: BusConfig, capacity: usize) -> Self {
        Self {
            routes: Arc::new(RwLock::new(HashMap::new())),
            config,
            capacity,
            next_route_id: AtomicU64::new(0),
            messages_sent: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether `topic` currently has a consumer.
    #[must_use]
    pub fn has_subscriber(&self, topic: EventTopic) -> bool {
        self.routes
            .read()
            .get(&topic)
            .is_some_and(|route| !route.sender.is_closed())
    }

    /// Total messages successfully queued.
    #[must_use]
    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BusClient for InMemoryBus {
    fn config(&self) -> &BusConfig {
        &self.config
    }

    async fn send(
        &self,
        topic: EventTopic,
        event: BusEvent,
        want_reply: bool,
    ) -> Result<Option<PendingReply>, BusError> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }

        // Clone the sender so the lock is not held across the await.
        let sender = self
            .routes
            .read()
            .get(&topic)
            .map(|route| route.sender.clone())
            .ok_or(BusError::Unavailable { topic })?;

        let kind = event.kind();
        let (msg, pending) = if want_reply {
            let (msg, pending) = Message::request(topic, event);
            (msg, Some(pending))
        } else {
            (Message::notification(topic, event), None)
        };

        if sender.send(msg).await.is_err() {
            warn!(topic = %topic, event = kind, "Message dropped (subscriber gone)");
            return Err(BusError::Unavailable { topic });
        }

        self.messages_sent.fetch_add(1, Ordering::Relaxed);
        debug!(topic = %topic, event = kind, want_reply, "Message sent");
        Ok(pending)
    }

    fn subscribe(&self, topic: EventTopic) -> Result<Subscription, BusError> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }

        let mut routes = self.routes.write();
        if routes
            .get(&topic)
            .is_some_and(|route| !route.sender.is_closed())
        {
            return Err(BusError::AlreadySubscribed { topic });
        }

        let (sender, receiver) = tokio::sync::mpsc::channel(self.capacity);
        let id = self.next_route_id.fetch_add(1, Ordering::Relaxed);
        routes.insert(topic, Route { id, sender });

        debug!(topic = %topic, "New subscription created");
        Ok(Subscription::new(receiver, topic, id, self.routes.clone()))
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.routes.write().clear();
        debug!("Event bus closed");
    }
}
