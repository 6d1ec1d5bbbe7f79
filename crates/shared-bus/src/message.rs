//! # Messages
//!
//! A `Message` is an event addressed to a topic, optionally carrying a
//! one-shot reply channel back to the sender.

use crate::events::{BusEvent, EventTopic};
use shared_types::errors::RemoteError;
use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

/// What travels back over a reply channel.
pub type ReplyResult = Result<BusEvent, RemoteError>;

/// A delivered bus message.
#[derive(Debug)]
pub struct Message {
    pub id: Uuid,
    pub topic: EventTopic,
    pub event: BusEvent,
    responder: Responder,
}

impl Message {
    /// A notification: no reply expected.
    pub fn notification(topic: EventTopic, event: BusEvent) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            topic,
            event,
            responder: Responder { id, tx: None },
        }
    }

    /// A request, plus the receiving half for its reply.
    pub fn request(topic: EventTopic, event: BusEvent) -> (Self, PendingReply) {
        let id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        let msg = Self {
            id,
            topic,
            event,
            responder: Responder { id, tx: Some(tx) },
        };
        (msg, PendingReply { id, topic, rx })
    }

    /// Reassemble a message from parts previously split off.
    pub fn from_parts(topic: EventTopic, event: BusEvent, responder: Responder) -> Self {
        Self {
            id: responder.id,
            topic,
            event,
            responder,
        }
    }

    /// Split into the event and the handle used to answer it.
    pub fn into_parts(self) -> (BusEvent, Responder) {
        (self.event, self.responder)
    }

    pub fn wants_reply(&self) -> bool {
        self.responder.wants_reply()
    }

    pub fn reply_ok(self, event: BusEvent) {
        self.responder.reply(Ok(event));
    }

    pub fn reply_err(self, err: RemoteError) {
        self.responder.reply(Err(err));
    }
}

/// The answering half of a message.
///
/// Replying to a notification is a no-op, so handlers can answer
/// unconditionally.
#[derive(Debug)]
pub struct Responder {
    id: Uuid,
    tx: Option<oneshot::Sender<ReplyResult>>,
}

impl Responder {
    pub fn wants_reply(&self) -> bool {
        self.tx.is_some()
    }

    /// Deliver the reply. Returns `false` if nobody was waiting.
    pub fn reply(self, result: ReplyResult) -> bool {
        let Some(tx) = self.tx else {
            return false;
        };
        if tx.send(result).is_err() {
            debug!(id = %self.id, "Reply dropped, requester gone");
            return false;
        }
        true
    }
}

/// The waiting half of a request.
#[derive(Debug)]
pub struct PendingReply {
    pub id: Uuid,
    pub topic: EventTopic,
    pub(crate) rx: oneshot::Receiver<ReplyResult>,
}
