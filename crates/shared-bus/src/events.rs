//! # Bus Events
//!
//! Every request, notification and reply that flows over the bus.
//! Payload types live in `shared-types/src/ipc.rs`.

use serde::{Deserialize, Serialize};
use shared_types::entities::{Block, BlockDetail, Transaction};
use shared_types::ipc::{ChainExecutor, Reply, ReqBlocks, TxHashList};
use std::fmt;

/// All events carried by the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BusEvent {
    // =========================================================================
    // CONSENSUS (inbound to the driver)
    // =========================================================================
    /// Driver-and-function-qualified query. Reply: `QueryResult`.
    ConsensusQuery(ChainExecutor),

    /// A block was committed by the store. Notification.
    AddBlock(Block),

    /// Validate a proposed block against its parent. Reply: `Reply`.
    CheckBlock(BlockDetail),

    /// Turn mining on. Reply: `Reply`.
    MinerStart,

    /// Turn mining off. Reply: `Reply`.
    MinerStop,

    /// A block was rolled back by the store. Notification.
    DelBlock(Block),

    /// Algorithm-specific event, handed to the plugged-in miner.
    Custom {
        kind: String,
        data: serde_json::Value,
    },

    // =========================================================================
    // CHAIN STORE (`blockchain` topic)
    // =========================================================================
    /// Reply: `Block`.
    GetLastBlock,

    /// Reply: `BlockDetails`.
    GetBlocks(ReqBlocks),

    /// Execute and persist a block. Reply: `BlockDetail`.
    AddBlockDetail(BlockDetail),

    /// Reply: `IsCaughtUp`.
    IsSync,

    /// Which of these hashes are already on chain. Reply: `ReplyHashes`.
    TxHashList(TxHashList),

    // =========================================================================
    // TRANSACTION POOL (`mempool` topic)
    // =========================================================================
    /// Reply: `ReplyTxList`.
    TxList(TxHashList),

    /// Remove transactions by hash. Reply: `Reply`.
    DelTxList(TxHashList),

    // =========================================================================
    // REPLIES
    // =========================================================================
    Block(Option<Block>),
    BlockDetails(Vec<BlockDetail>),
    BlockDetail(Option<BlockDetail>),
    IsCaughtUp(bool),
    ReplyTxList(Vec<Transaction>),
    ReplyHashes(TxHashList),
    Reply(Reply),
    QueryResult(serde_json::Value),
}

impl BusEvent {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConsensusQuery(_) => "consensus_query",
            Self::AddBlock(_) => "add_block",
            Self::CheckBlock(_) => "check_block",
            Self::MinerStart => "miner_start",
            Self::MinerStop => "miner_stop",
            Self::DelBlock(_) => "del_block",
            Self::Custom { .. } => "custom",
            Self::GetLastBlock => "get_last_block",
            Self::GetBlocks(_) => "get_blocks",
            Self::AddBlockDetail(_) => "add_block_detail",
            Self::IsSync => "is_sync",
            Self::TxHashList(_) => "tx_hash_list",
            Self::TxList(_) => "tx_list",
            Self::DelTxList(_) => "del_tx_list",
            Self::Block(_) => "block",
            Self::BlockDetails(_) => "block_details",
            Self::BlockDetail(_) => "block_detail",
            Self::IsCaughtUp(_) => "is_caught_up",
            Self::ReplyTxList(_) => "reply_tx_list",
            Self::ReplyHashes(_) => "reply_hashes",
            Self::Reply(_) => "reply",
            Self::QueryResult(_) => "query_result",
        }
    }
}

/// Bus topics. Each topic has at most one consuming module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// The consensus driver.
    Consensus,
    /// The chain store.
    Blockchain,
    /// The transaction pool.
    Mempool,
}

impl EventTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consensus => "consensus",
            Self::Blockchain => "blockchain",
            Self::Mempool => "mempool",
        }
    }
}

impl fmt::Display for EventTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
