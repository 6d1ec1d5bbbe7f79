//! # In-Memory Node Harness
//!
//! Stand-ins for the chain store and the transaction pool, served over the
//! same bus topics the real modules use.
//!
//! - The store rejects blocks that do not extend its tip, drops every
//!   transaction whose executor is `bad` (an execution failure), and
//!   notifies the consensus topic of each committed block.
//! - The pool hands out transactions in insertion order and records each
//!   removal request.

use consensus_driver::{ConsensusConfig, ConsensusDriver, SoloMiner};
use node_telemetry::{init_telemetry, TelemetryConfig};
use parking_lot::Mutex;
use shared_bus::{BusClient, BusEvent, EventTopic, InMemoryBus, Message};
use shared_types::{
    Block, BlockDetail, Hash, NetworkParams, RemoteError, Reply, ReqBlocks, StoreError,
    Transaction, TxHashList,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

/// Executor name the store refuses to execute.
pub const FAILING_EXECER: &str = "bad";

fn store_error(err: StoreError) -> RemoteError {
    let code = match err {
        StoreError::NotFound { .. } => "not_found",
        StoreError::NotOnTip { .. } => "not_on_tip",
    };
    RemoteError::new(code, err.to_string())
}

// =============================================================================
// CHAIN STORE
// =============================================================================

/// Chain store on the `blockchain` topic.
pub struct InMemoryChainStore {
    bus: Arc<InMemoryBus>,
    chain: Mutex<Vec<Block>>,
    synced: AtomicBool,
}

impl InMemoryChainStore {
    /// Serve an empty store.
    pub fn spawn(bus: Arc<InMemoryBus>) -> Arc<Self> {
        Self::spawn_with_chain(bus, Vec::new())
    }

    /// Serve a store preloaded with `chain`.
    pub fn spawn_with_chain(bus: Arc<InMemoryBus>, chain: Vec<Block>) -> Arc<Self> {
        let store = Arc::new(Self {
            bus: bus.clone(),
            chain: Mutex::new(chain),
            synced: AtomicBool::new(true),
        });
        let mut subscription = bus
            .subscribe(EventTopic::Blockchain)
            .unwrap_or_else(|e| panic!("blockchain topic taken: {e}"));

        let server = store.clone();
        tokio::spawn(async move {
            while let Some(msg) = subscription.recv().await {
                server.handle(msg).await;
            }
        });
        store
    }

    async fn handle(&self, msg: Message) {
        let result = match &msg.event {
            BusEvent::GetLastBlock => Ok(BusEvent::Block(self.last_block())),
            BusEvent::GetBlocks(req) => Ok(BusEvent::BlockDetails(self.blocks(req))),
            BusEvent::AddBlockDetail(detail) => self.add(detail).await,
            BusEvent::IsSync => Ok(BusEvent::IsCaughtUp(self.synced.load(Ordering::SeqCst))),
            BusEvent::TxHashList(list) => Ok(BusEvent::ReplyHashes(self.committed_among(list))),
            _ => return,
        };
        match result {
            Ok(event) => msg.reply_ok(event),
            Err(err) => msg.reply_err(err),
        }
    }

    async fn add(&self, detail: &BlockDetail) -> Result<BusEvent, RemoteError> {
        let mut block = detail.block.clone();
        {
            let mut chain = self.chain.lock();
            let extends_tip = match chain.last() {
                Some(tip) => tip.height + 1 == block.height && tip.hash() == block.parent_hash,
                None => block.height == 0,
            };
            if !extends_tip {
                return Err(store_error(StoreError::NotOnTip {
                    height: block.height,
                }));
            }
            block.txs.retain(|tx| tx.execer != FAILING_EXECER);
            chain.push(block.clone());
        }

        let _ = self
            .bus
            .notify(EventTopic::Consensus, BusEvent::AddBlock(block.clone()))
            .await;
        Ok(BusEvent::BlockDetail(Some(BlockDetail::unexecuted(block))))
    }

    fn blocks(&self, req: &ReqBlocks) -> Vec<BlockDetail> {
        self.chain
            .lock()
            .iter()
            .filter(|b| b.height >= req.start && b.height <= req.end)
            .cloned()
            .map(BlockDetail::unexecuted)
            .collect()
    }

    fn committed_among(&self, list: &TxHashList) -> TxHashList {
        let committed: HashSet<Hash> = self
            .chain
            .lock()
            .iter()
            .flat_map(|b| b.txs.iter().map(Transaction::hash))
            .collect();
        let hashes: Vec<Hash> = list
            .hashes
            .iter()
            .filter(|h| committed.contains(*h))
            .copied()
            .collect();
        TxHashList {
            count: hashes.len(),
            hashes,
        }
    }

    pub fn last_block(&self) -> Option<Block> {
        self.chain.lock().last().cloned()
    }

    pub fn height(&self) -> Option<u64> {
        self.chain.lock().last().map(|b| b.height)
    }

    pub fn block(&self, height: u64) -> Result<Block, StoreError> {
        self.chain
            .lock()
            .iter()
            .find(|b| b.height == height)
            .cloned()
            .ok_or(StoreError::NotFound { height })
    }

    pub fn set_synced(&self, synced: bool) {
        self.synced.store(synced, Ordering::SeqCst);
    }

    /// Remove the tip and tell consensus about it.
    pub async fn rollback(&self) -> Option<Block> {
        let removed = self.chain.lock().pop()?;
        let _ = self
            .bus
            .notify(EventTopic::Consensus, BusEvent::DelBlock(removed.clone()))
            .await;
        Some(removed)
    }
}

// =============================================================================
// MEMPOOL
// =============================================================================

/// Transaction pool on the `mempool` topic.
pub struct InMemoryMempool {
    txs: Mutex<Vec<Transaction>>,
    removals: Mutex<Vec<Vec<Hash>>>,
    reject_removals: AtomicBool,
}

impl InMemoryMempool {
    pub fn spawn(bus: Arc<InMemoryBus>) -> Arc<Self> {
        let pool = Arc::new(Self {
            txs: Mutex::new(Vec::new()),
            removals: Mutex::new(Vec::new()),
            reject_removals: AtomicBool::new(false),
        });
        let mut subscription = bus
            .subscribe(EventTopic::Mempool)
            .unwrap_or_else(|e| panic!("mempool topic taken: {e}"));

        let server = pool.clone();
        tokio::spawn(async move {
            while let Some(msg) = subscription.recv().await {
                server.handle(msg);
            }
        });
        pool
    }

    fn handle(&self, msg: Message) {
        let reply = match &msg.event {
            BusEvent::TxList(req) => BusEvent::ReplyTxList(self.list(req)),
            BusEvent::DelTxList(list) => {
                if self.reject_removals.load(Ordering::SeqCst) {
                    BusEvent::Reply(Reply::err("pool locked"))
                } else {
                    self.remove(&list.hashes);
                    BusEvent::Reply(Reply::ok())
                }
            }
            _ => return,
        };
        msg.reply_ok(reply);
    }

    fn list(&self, req: &TxHashList) -> Vec<Transaction> {
        let exclude: HashSet<&Hash> = req.hashes.iter().collect();
        self.txs
            .lock()
            .iter()
            .filter(|tx| !exclude.contains(&tx.hash()))
            .take(req.count)
            .cloned()
            .collect()
    }

    fn remove(&self, hashes: &[Hash]) {
        self.removals.lock().push(hashes.to_vec());
        let gone: HashSet<&Hash> = hashes.iter().collect();
        self.txs.lock().retain(|tx| !gone.contains(&tx.hash()));
    }

    pub fn push(&self, txs: impl IntoIterator<Item = Transaction>) {
        self.txs.lock().extend(txs);
    }

    pub fn len(&self) -> usize {
        self.txs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every removal request received, in order.
    pub fn removals(&self) -> Vec<Vec<Hash>> {
        self.removals.lock().clone()
    }

    pub fn reject_removals(&self, reject: bool) {
        self.reject_removals.store(reject, Ordering::SeqCst);
    }
}

// =============================================================================
// HELPERS
// =============================================================================

static TELEMETRY: Once = Once::new();

/// Install the process-wide log subscriber on first use.
///
/// Log level follows `RUST_LOG` / `CONSENSUS_LOG_LEVEL` like a real node.
pub fn init_test_telemetry() {
    TELEMETRY.call_once(|| {
        let config = TelemetryConfig::for_driver("driver-tests");
        if let Err(e) = init_telemetry(&config) {
            eprintln!("telemetry not installed: {e}");
        }
    });
}

/// A solo driver on the testnet parameters.
pub fn solo_driver(config: ConsensusConfig) -> Arc<ConsensusDriver> {
    init_test_telemetry();
    let miner = Arc::new(SoloMiner::new(config.clone()));
    let driver = ConsensusDriver::new(config, NetworkParams::testnet(), miner)
        .unwrap_or_else(|e| panic!("invalid driver config: {e}"));
    Arc::new(driver)
}

/// Chain of `len` linked blocks starting at genesis.
pub fn linked_chain(len: u64) -> Vec<Block> {
    let mut chain: Vec<Block> = Vec::new();
    for height in 0..len {
        let parent_hash = chain
            .last()
            .map(Block::hash)
            .unwrap_or(shared_types::ZERO_HASH);
        chain.push(Block {
            parent_hash,
            height,
            block_time: 1_600_000_000 + height,
            ..Default::default()
        });
    }
    chain
}

/// A block extending `parent` by one.
pub fn child_of(parent: &Block) -> Block {
    Block {
        version: parent.version,
        parent_hash: parent.hash(),
        height: parent.height + 1,
        block_time: parent.block_time + 1,
        difficulty: parent.difficulty,
        ..Default::default()
    }
}

/// Poll `cond` every 100ms until it holds or `within` elapses.
pub async fn eventually(within: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + within;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    cond()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telemetry_installed_once() {
        init_test_telemetry();
        init_test_telemetry();
        assert!(tracing::dispatcher::has_been_set());
    }
}
