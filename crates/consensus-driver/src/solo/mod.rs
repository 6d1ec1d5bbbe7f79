//! # Solo Miner
//!
//! Single-producer reference algorithm: every `write_block_seconds` it
//! pulls transactions from the pool and commits a block on top of the head.
//! It adds no validity rules of its own and handles no custom events.

use crate::domain::{Block, BlockDetail, ConsensusConfig, ConsensusResult, Transaction};
use crate::ports::{ConsensusApi, EventOutcome, MinerCapability};
use crate::query::QueryRegistry;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_bus::Message;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Driver name of the solo algorithm.
pub const SOLO_DRIVER: &str = "solo";

/// Coins minted to the genesis address.
pub const GENESIS_COINS: u64 = 100_000_000 * 100_000_000;

/// Payload of the genesis minting transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisMint {
    pub to: String,
    pub amount: u64,
}

/// Reference single-producer miner.
pub struct SoloMiner {
    config: ConsensusConfig,
}

impl SoloMiner {
    pub fn new(config: ConsensusConfig) -> Self {
        Self { config }
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    /// One production attempt. Returns the committed height, if any.
    pub async fn produce_once(&self, driver: &dyn ConsensusApi) -> ConsensusResult<Option<u64>> {
        let head = driver.current_block()?;
        let height = head.height + 1;
        let max_tx = driver.params().at(height).max_tx_number;

        let candidates = driver.request_tx(max_tx, Vec::new()).await;
        let candidates = driver.check_tx_dup(candidates).await;

        let now = Self::now().max(head.block_time);
        if candidates.is_empty() {
            let interval = self.config.empty_block_interval;
            if interval == 0 || now < head.block_time + interval {
                return Ok(None);
            }
            debug!(height, "Producing empty block");
        }

        let mut block = Block {
            version: head.version,
            parent_hash: head.hash(),
            height,
            block_time: now,
            difficulty: head.difficulty,
            ..Default::default()
        };
        let added = driver.add_txs_to_block(&mut block, candidates);
        block.seal_tx_root();

        let outcome = driver.write_block(block).await?;
        if let Err(e) = &outcome.pool_sync {
            warn!(height, error = %e, "Committed, but pool was not pruned");
        }
        info!(
            height = outcome.block.height,
            proposed = added.len(),
            committed = outcome.block.txs.len(),
            "Solo block written"
        );
        Ok(Some(outcome.block.height))
    }
}

#[async_trait]
impl MinerCapability for SoloMiner {
    fn name(&self) -> &str {
        SOLO_DRIVER
    }

    fn create_genesis_txs(&self) -> Vec<Transaction> {
        let mint = GenesisMint {
            to: self.config.genesis.clone(),
            amount: GENESIS_COINS,
        };
        let payload = serde_json::to_vec(&mint).unwrap_or_default();
        vec![Transaction::new("coins", payload, 0, 0)]
    }

    fn genesis_block_time(&self) -> u64 {
        self.config.genesis_block_time
    }

    async fn produce_blocks(&self, driver: std::sync::Arc<dyn ConsensusApi>) {
        let mut shutdown = driver.shutdown_signal();
        let mut ticker = tokio::time::interval(Duration::from_secs(self.config.write_block_seconds));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            if !driver.is_mining() {
                continue;
            }
            if !self.config.force_mining && !driver.is_caught_up().await {
                debug!("Not caught up, skipping production");
                continue;
            }
            if let Err(e) = self.produce_once(driver.as_ref()).await {
                warn!(error = %e, "Solo block production failed");
            }
        }

        info!("Solo production loop stopped");
    }

    async fn check_block(&self, _parent: &Block, _candidate: &BlockDetail) -> ConsensusResult<()> {
        Ok(())
    }

    async fn handle_event(&self, msg: Message) -> EventOutcome {
        EventOutcome::Unhandled(msg)
    }

    fn register_queries(&self, registry: &mut QueryRegistry) -> ConsensusResult<()> {
        let genesis = self.config.genesis.clone();
        registry.register(SOLO_DRIVER, "genesis_address", move |_, _| Ok(json!(genesis)))
    }
}
