//! Bus error types.

use crate::events::EventTopic;
use shared_types::errors::RemoteError;
use thiserror::Error;

/// Errors from sending, waiting or subscribing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// The message was never delivered: no subscriber, or its queue closed.
    #[error("No subscriber for topic {topic}")]
    Unavailable { topic: EventTopic },

    /// Delivered, but no reply arrived in time. The request may have run.
    #[error("Request on topic {topic} timed out after {timeout_ms}ms")]
    Timeout { topic: EventTopic, timeout_ms: u64 },

    /// The handler dropped the request without answering.
    #[error("Request on topic {topic} dropped without reply")]
    NoReply { topic: EventTopic },

    /// The remote handler answered with an error.
    #[error("Remote error: {0}")]
    Remote(RemoteError),

    /// The topic already has a live subscriber.
    #[error("Topic {topic} already has a subscriber")]
    AlreadySubscribed { topic: EventTopic },

    /// The bus was closed.
    #[error("Event bus closed")]
    Closed,
}

impl BusError {
    /// Whether a retry is safe: only when the message never reached a handler.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}
