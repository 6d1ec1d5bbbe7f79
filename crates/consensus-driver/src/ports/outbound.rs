//! Outbound ports - what the driver requires from the plugged-in algorithm

use crate::domain::{Block, BlockDetail, ConsensusResult, Transaction};
use crate::ports::inbound::ConsensusApi;
use crate::query::QueryRegistry;
use async_trait::async_trait;
use shared_bus::Message;
use std::sync::Arc;

/// Result of offering an algorithm-specific event to the miner.
#[derive(Debug)]
pub enum EventOutcome {
    /// The miner consumed the message (and replied if a reply was wanted).
    Handled,
    /// Not recognised; the message is handed back so the driver can reply.
    Unhandled(Message),
}

/// Algorithm-specific behaviour plugged into the driver.
///
/// The driver owns block lifecycle; the capability supplies genesis data,
/// runs the production loop, and adds its own validity rules.
#[async_trait]
pub trait MinerCapability: Send + Sync {
    /// Driver name used to namespace queries (`solo`, `ticket`, ...).
    fn name(&self) -> &str;

    /// Transactions placed in the genesis block.
    fn create_genesis_txs(&self) -> Vec<Transaction>;

    /// Genesis block time, unix seconds.
    fn genesis_block_time(&self) -> u64;

    /// Runs once, after the head is initialised.
    async fn on_start(&self, _driver: Arc<dyn ConsensusApi>) -> ConsensusResult<()> {
        Ok(())
    }

    /// Long-running block production loop.
    ///
    /// Must return once `driver.shutdown_signal()` fires.
    async fn produce_blocks(&self, driver: Arc<dyn ConsensusApi>);

    /// Algorithm checks, run after the generic parent checks pass.
    async fn check_block(&self, parent: &Block, candidate: &BlockDetail) -> ConsensusResult<()>;

    /// Handle an event the driver does not recognise.
    async fn handle_event(&self, msg: Message) -> EventOutcome;

    /// Register algorithm-specific queries under [`MinerCapability::name`].
    fn register_queries(&self, _registry: &mut QueryRegistry) -> ConsensusResult<()> {
        Ok(())
    }
}
