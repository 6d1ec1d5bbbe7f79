//! Bus gateway adapter
//!
//! Typed requests to the chain store and the transaction pool over a
//! `BusClient`.

use crate::domain::{Block, BlockDetail, ConsensusError, ConsensusResult, Hash, Transaction};
use shared_bus::{BusClient, BusEvent, EventTopic};
use shared_types::{ReqBlocks, TxHashList};
use std::collections::HashSet;
use std::sync::Arc;

fn unexpected(expected: &'static str, got: &BusEvent) -> ConsensusError {
    ConsensusError::UnexpectedReply {
        expected,
        actual: got.kind(),
    }
}

/// Store and pool requests used by the driver.
#[derive(Clone)]
pub struct BusGateway {
    bus: Arc<dyn BusClient>,
}

impl BusGateway {
    pub fn new(bus: Arc<dyn BusClient>) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &Arc<dyn BusClient> {
        &self.bus
    }

    async fn request(&self, topic: EventTopic, event: BusEvent) -> ConsensusResult<BusEvent> {
        Ok(self.bus.request(topic, event).await?)
    }

    // === CHAIN STORE ===

    pub async fn last_block(&self) -> ConsensusResult<Option<Block>> {
        match self.request(EventTopic::Blockchain, BusEvent::GetLastBlock).await? {
            BusEvent::Block(block) => Ok(block),
            other => Err(unexpected("block", &other)),
        }
    }

    pub async fn block_at(&self, height: u64) -> ConsensusResult<Block> {
        let event = BusEvent::GetBlocks(ReqBlocks::single(height));
        match self.request(EventTopic::Blockchain, event).await? {
            BusEvent::BlockDetails(details) => details
                .into_iter()
                .next()
                .map(|detail| detail.block)
                .ok_or(ConsensusError::MissingBlock(height)),
            other => Err(unexpected("block_details", &other)),
        }
    }

    pub async fn add_block_detail(&self, detail: BlockDetail) -> ConsensusResult<Option<BlockDetail>> {
        match self
            .request(EventTopic::Blockchain, BusEvent::AddBlockDetail(detail))
            .await?
        {
            BusEvent::BlockDetail(detail) => Ok(detail),
            other => Err(unexpected("block_detail", &other)),
        }
    }

    pub async fn is_sync(&self) -> ConsensusResult<bool> {
        match self.request(EventTopic::Blockchain, BusEvent::IsSync).await? {
            BusEvent::IsCaughtUp(synced) => Ok(synced),
            other => Err(unexpected("is_caught_up", &other)),
        }
    }

    /// Hashes from `hashes` already on chain.
    pub async fn duplicate_hashes(&self, hashes: Vec<Hash>) -> ConsensusResult<Vec<Hash>> {
        let count = hashes.len();
        let event = BusEvent::TxHashList(TxHashList { hashes, count });
        match self.request(EventTopic::Blockchain, event).await? {
            BusEvent::ReplyHashes(list) => Ok(list.hashes),
            other => Err(unexpected("reply_hashes", &other)),
        }
    }

    // === TRANSACTION POOL ===

    pub async fn tx_list(&self, count: usize, exclude: Vec<Hash>) -> ConsensusResult<Vec<Transaction>> {
        let event = BusEvent::TxList(TxHashList {
            hashes: exclude,
            count,
        });
        match self.request(EventTopic::Mempool, event).await? {
            BusEvent::ReplyTxList(txs) => Ok(txs),
            other => Err(unexpected("reply_tx_list", &other)),
        }
    }

    pub async fn remove_txs(&self, hashes: Vec<Hash>) -> ConsensusResult<()> {
        let count = hashes.len();
        let event = BusEvent::DelTxList(TxHashList { hashes, count });
        let reply = self
            .request(EventTopic::Mempool, event)
            .await
            .map_err(|e| ConsensusError::PoolSyncFailure {
                count,
                reason: e.to_string(),
            })?;
        match reply {
            BusEvent::Reply(r) if r.is_ok => Ok(()),
            BusEvent::Reply(r) => Err(ConsensusError::PoolSyncFailure { count, reason: r.msg }),
            other => Err(unexpected("reply", &other)),
        }
    }
}

/// Transactions in `proposed` whose hash is absent from `committed`.
pub fn diff_txs(proposed: &[Transaction], committed: &[Transaction]) -> Vec<Transaction> {
    let kept: HashSet<Hash> = committed.iter().map(Transaction::hash).collect();
    proposed
        .iter()
        .filter(|tx| !kept.contains(&tx.hash()))
        .cloned()
        .collect()
}
