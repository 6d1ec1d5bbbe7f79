//! # Shared Bus - Topic-Addressed Message Bus
//!
//! Asynchronous request/reply and notification transport between the
//! consensus driver, the chain store and the transaction pool.
//!
//! ## Model
//!
//! ```text
//! ┌──────────────┐   send(topic, event, want_reply)   ┌──────────────┐
//! │   Sender     │ ─────────────────────────────────→ │  Subscriber  │
//! │              │                                    │  (1 / topic) │
//! │   wait()  ←──┼──────────── oneshot reply ──────── │  reply_ok()  │
//! └──────────────┘                                    └──────────────┘
//! ```
//!
//! - Each topic has one consumer that drains a bounded FIFO queue.
//! - `request` retries only deliveries that never reached a handler;
//!   a timed-out request is reported, never resent.
//! - Dropping a `Subscription` removes its topic route.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod error;
pub mod events;
pub mod message;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use error::BusError;
pub use events::{BusEvent, EventTopic};
pub use message::{Message, PendingReply, Responder};
pub use publisher::{BusClient, BusConfig, InMemoryBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum messages queued per topic before senders wait.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
