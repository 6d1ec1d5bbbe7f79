//! Inbound ports - the API the driver offers to mining algorithms

use crate::domain::{
    Block, BlockDetail, ConsensusConfig, ConsensusError, ConsensusResult, Hash, NetworkParams,
    Transaction,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

/// Result of a successful block write.
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    /// The block as the store committed it.
    pub block: Arc<Block>,
    /// Hashes of proposed transactions the store left out.
    pub dropped: Vec<Hash>,
    /// Outcome of removing `dropped` from the pool. A failure here does not
    /// undo the commit.
    pub pool_sync: Result<(), ConsensusError>,
}

/// Driver primitives available to a mining algorithm.
#[async_trait]
pub trait ConsensusApi: Send + Sync {
    fn config(&self) -> &ConsensusConfig;

    fn params(&self) -> &NetworkParams;

    /// Current head, or `NotBound` before initialisation.
    fn current_block(&self) -> ConsensusResult<Arc<Block>>;

    fn current_height(&self) -> ConsensusResult<u64>;

    fn is_mining(&self) -> bool;

    fn is_closed(&self) -> bool;

    /// Flips to `true` when the driver closes.
    fn shutdown_signal(&self) -> watch::Receiver<bool>;

    /// Instance-owned random source.
    fn rand_i64(&self) -> i64;

    /// Greedily append `txs` to `block` under the network ceilings.
    fn add_txs_to_block(&self, block: &mut Block, txs: Vec<Transaction>) -> Vec<Transaction>;

    /// Whether the store reports the node as synchronised. Bus failures
    /// read as `false`.
    async fn is_caught_up(&self) -> bool;

    /// Generic parent checks followed by the algorithm's checks.
    async fn check_block(&self, detail: &BlockDetail) -> ConsensusResult<()>;

    /// Submit a block to the store, prune dropped transactions, move the head.
    async fn write_block(&self, block: Block) -> ConsensusResult<CommitOutcome>;

    /// Up to `list_size` pool transactions not in `exclude`. Empty on failure.
    async fn request_tx(&self, list_size: usize, exclude: Vec<Hash>) -> Vec<Transaction>;

    async fn request_block(&self, height: u64) -> ConsensusResult<Block>;

    /// `None` when the store is empty.
    async fn request_last_block(&self) -> ConsensusResult<Option<Block>>;

    /// Drop in-batch duplicates and transactions already on chain.
    async fn check_tx_dup(&self, txs: Vec<Transaction>) -> Vec<Transaction>;

    /// Run a registered query.
    fn query(
        &self,
        driver: &str,
        func: &str,
        param: serde_json::Value,
    ) -> ConsensusResult<serde_json::Value>;
}
