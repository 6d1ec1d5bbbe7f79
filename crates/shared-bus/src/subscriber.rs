//! # Subscriptions
//!
//! The consuming side of a topic. A topic has a single subscriber that
//! drains its queue in FIFO order.

use crate::events::EventTopic;
use crate::message::Message;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was closed or the topic route removed.
    #[error("Event bus closed")]
    Closed,
}

/// Registered consumer for a topic.
pub(crate) struct Route {
    pub(crate) id: u64,
    pub(crate) sender: mpsc::Sender<Message>,
}

pub(crate) type RouteTable = Arc<RwLock<HashMap<EventTopic, Route>>>;

/// A subscription handle for receiving messages on one topic.
///
/// When dropped, the topic route is removed and further sends to the topic
/// fail as unavailable.
pub struct Subscription {
    receiver: mpsc::Receiver<Message>,
    topic: EventTopic,
    id: u64,
    routes: RouteTable,
}

impl Subscription {
    pub(crate) fn new(
        receiver: mpsc::Receiver<Message>,
        topic: EventTopic,
        id: u64,
        routes: RouteTable,
    ) -> Self {
        Self {
            receiver,
            topic,
            id,
            routes,
        }
    }

    /// Receive the next message.
    ///
    /// # Returns
    ///
    /// - `Some(message)` - The next queued message
    /// - `None` - The route was closed (bus closed)
    pub async fn recv(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }

    /// Try to receive the next message without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(message))` - A message was queued
    /// - `Ok(None)` - Nothing queued
    /// - `Err(SubscriptionError::Closed)` - The route was closed
    pub fn try_recv(&mut self) -> Result<Option<Message>, SubscriptionError> {
        match self.receiver.try_recv() {
            Ok(msg) => Ok(Some(msg)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(SubscriptionError::Closed),
        }
    }

    #[must_use]
    pub fn topic(&self) -> EventTopic {
        self.topic
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut routes = self.routes.write();
        // A newer subscription may have replaced ours after a close.
        if routes.get(&self.topic).is_some_and(|r| r.id == self.id) {
            routes.remove(&self.topic);
        }
        debug!(topic = %self.topic, "Subscription dropped");
    }
}
