//! IPC Handler
//!
//! Dispatches each message from the `consensus` topic to exactly one
//! handler and delivers at most one reply. Errors are turned into replies;
//! nothing here panics or stops the loop.

use crate::domain::{ConsensusError, ConsensusResult};
use crate::ports::{ConsensusApi, EventOutcome};
use crate::service::ConsensusDriver;
use shared_bus::{BusEvent, Message, Responder};
use shared_types::Reply;
use std::sync::Arc;
use tracing::{debug, warn};

/// IPC Handler for the consensus topic
pub struct IpcHandler {
    driver: Arc<ConsensusDriver>,
}

impl IpcHandler {
    pub fn new(driver: Arc<ConsensusDriver>) -> Self {
        Self { driver }
    }

    pub async fn handle(&self, msg: Message) {
        let topic = msg.topic;
        let (event, responder) = msg.into_parts();
        let kind = event.kind();
        debug!(event = kind, "Consensus message received");

        match event {
            BusEvent::ConsensusQuery(exec) => {
                let result = self
                    .driver
                    .query(&exec.driver, &exec.func_name, exec.param)
                    .map(BusEvent::QueryResult);
                respond(responder, kind, result);
            }
            BusEvent::AddBlock(block) => {
                self.driver.set_head(block);
                respond(responder, kind, Ok(ok_reply()));
            }
            BusEvent::CheckBlock(detail) => {
                let result = self
                    .driver
                    .check_block(&detail)
                    .await
                    .map(|()| ok_reply());
                respond(responder, kind, result);
            }
            BusEvent::MinerStart => {
                let result = self.driver.start_mining().await.map(|()| ok_reply());
                respond(responder, kind, result);
            }
            BusEvent::MinerStop => {
                let result = self.driver.stop_mining().map(|()| ok_reply());
                respond(responder, kind, result);
            }
            BusEvent::DelBlock(block) => {
                // The payload is the removed block; the store is authoritative.
                debug!(height = block.height, "Block rolled back");
                let result = self.driver.refresh_head().await.map(|()| ok_reply());
                respond(responder, kind, result);
            }
            other => {
                let msg = Message::from_parts(topic, other, responder);
                if let EventOutcome::Unhandled(msg) = self.driver.miner().handle_event(msg).await {
                    debug!(event = kind, "Event not supported by miner");
                    msg.reply_err(ConsensusError::UnsupportedAction(kind.to_string()).to_remote());
                }
            }
        }
    }
}

fn ok_reply() -> BusEvent {
    BusEvent::Reply(Reply::ok())
}

fn respond(responder: Responder, kind: &'static str, result: ConsensusResult<BusEvent>) {
    let result = result.map_err(|e| {
        if !e.is_validation() {
            warn!(event = kind, error = %e, "Consensus handler failed");
        }
        e.to_remote()
    });
    responder.reply(result);
}
