//! Consensus Driver - core lifecycle and block primitives
//!
//! # Architecture
//! - One event-loop task drains the `consensus` topic in FIFO order
//! - One production task runs the plugged-in miner's loop
//! - Head state is swapped under a short lock, never held across a round trip
//! - Initialisation (head load or genesis, then the miner's start hook) runs
//!   exactly once, shared by `start` and miner-start

mod event_loop;

use crate::adapters::{diff_txs, BusGateway};
use crate::domain::{
    build_genesis_block, dedup_by_hash, Block, BlockAssembler, BlockDetail, ConsensusConfig,
    ConsensusError, ConsensusResult, Hash, HeadState, MiningFlag, NetworkParams, Transaction,
};
use crate::metrics;
use crate::ports::{CommitOutcome, ConsensusApi, MinerCapability};
use crate::query::QueryRegistry;
use crate::validation::BlockValidator;
use async_trait::async_trait;
use node_telemetry::{log_block_event, log_event, log_tx_event};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_bus::{BusClient, EventTopic};
use shared_types::hash_hex;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tokio::sync::{watch, OnceCell};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const SUBSYSTEM: &str = "consensus";

/// Driver lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed, not bound to a bus.
    Idle,
    /// `start` in progress.
    Starting,
    /// Bound, subscribed, dispatching.
    Running,
    /// Terminal.
    Closed,
}

/// Generic consensus driver around a pluggable mining algorithm.
pub struct ConsensusDriver {
    config: ConsensusConfig,
    params: NetworkParams,
    miner: Arc<dyn MinerCapability>,
    head: HeadState,
    mining: MiningFlag,
    gateway: OnceLock<BusGateway>,
    init: OnceCell<()>,
    lifecycle: Mutex<Lifecycle>,
    shutdown: watch::Sender<bool>,
    rng: Mutex<StdRng>,
    queries: QueryRegistry,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ConsensusDriver {
    /// Create a driver. Validates the configuration and builds the query
    /// registry (base queries plus the miner's).
    pub fn new(
        config: ConsensusConfig,
        params: NetworkParams,
        miner: Arc<dyn MinerCapability>,
    ) -> ConsensusResult<Self> {
        config.validate()?;

        let mut queries = QueryRegistry::with_base_queries()?;
        miner.register_queries(&mut queries)?;

        let (shutdown, _) = watch::channel(false);

        log_event!(
            info,
            SUBSYSTEM,
            "Consensus driver created",
            driver = %config.name,
            network = %params.name,
            miner_start = config.miner_start
        );

        Ok(Self {
            mining: MiningFlag::new(config.miner_start),
            config,
            params,
            miner,
            head: HeadState::new(),
            gateway: OnceLock::new(),
            init: OnceCell::new(),
            lifecycle: Mutex::new(Lifecycle::Idle),
            shutdown,
            rng: Mutex::new(StdRng::from_entropy()),
            queries,
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Use a deterministic random source (for testing)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.lock()
    }

    fn gateway(&self) -> ConsensusResult<&BusGateway> {
        self.gateway.get().ok_or(ConsensusError::NotBound)
    }

    // === LIFECYCLE ===

    /// Bind to `bus`, initialise the head and start the event loop and the
    /// miner's production loop.
    ///
    /// An initialisation failure leaves the driver `Idle` so `start` can be
    /// retried.
    pub async fn start(self: &Arc<Self>, bus: Arc<dyn BusClient>) -> ConsensusResult<()> {
        {
            let mut state = self.lifecycle.lock();
            match *state {
                Lifecycle::Idle => *state = Lifecycle::Starting,
                Lifecycle::Closed => return Err(ConsensusError::Closed),
                Lifecycle::Starting | Lifecycle::Running => {
                    return Err(ConsensusError::AlreadyStarted)
                }
            }
        }

        match self.bind_and_spawn(bus).await {
            Ok(()) => {
                let mut state = self.lifecycle.lock();
                if *state == Lifecycle::Starting {
                    *state = Lifecycle::Running;
                }
                log_event!(info, SUBSYSTEM, "Consensus driver running", driver = %self.config.name);
                Ok(())
            }
            Err(e) => {
                let mut state = self.lifecycle.lock();
                if *state == Lifecycle::Starting {
                    *state = Lifecycle::Idle;
                }
                log_event!(error, SUBSYSTEM, "Consensus driver failed to start", error = %e);
                Err(e)
            }
        }
    }

    async fn bind_and_spawn(self: &Arc<Self>, bus: Arc<dyn BusClient>) -> ConsensusResult<()> {
        // A retried start keeps the first bus.
        let gateway = self.gateway.get_or_init(|| BusGateway::new(bus));
        let subscription = gateway.bus().subscribe(EventTopic::Consensus)?;

        self.initialize().await?;

        let loop_handle = tokio::spawn(event_loop::run(
            self.clone(),
            subscription,
            self.shutdown.subscribe(),
        ));

        let miner = self.miner.clone();
        let api: Arc<dyn ConsensusApi> = self.clone();
        let miner_handle = tokio::spawn(async move {
            miner.produce_blocks(api).await;
        });

        self.tasks.lock().extend([loop_handle, miner_handle]);
        Ok(())
    }

    /// One-time initialisation: head (or genesis), then the miner's hook.
    pub(crate) async fn initialize(self: &Arc<Self>) -> ConsensusResult<()> {
        self.init
            .get_or_try_init(|| async {
                self.init_block().await?;
                let api: Arc<dyn ConsensusApi> = self.clone();
                self.miner.on_start(api).await
            })
            .await
            .map(|_| ())
    }

    async fn init_block(&self) -> ConsensusResult<()> {
        match self.gateway()?.last_block().await? {
            Some(block) => {
                log_block_event!(
                    info,
                    SUBSYSTEM,
                    "Loaded chain head",
                    block.height,
                    hash_hex(&block.hash())
                );
                self.head.set(block);
            }
            None => {
                let genesis = build_genesis_block(
                    &self.params,
                    self.miner.genesis_block_time(),
                    self.miner.create_genesis_txs(),
                );
                log_block_event!(
                    info,
                    SUBSYSTEM,
                    "Writing genesis block",
                    genesis.height,
                    hash_hex(&genesis.hash()),
                    tx_count = genesis.txs.len()
                );
                self.write_block(genesis).await?;
            }
        }
        Ok(())
    }

    /// Stop dispatching and force mining off. Idempotent.
    pub fn close(&self) {
        {
            let mut state = self.lifecycle.lock();
            if *state == Lifecycle::Closed {
                return;
            }
            *state = Lifecycle::Closed;
        }
        self.mining.force_stop();
        self.shutdown.send_replace(true);
        log_event!(info, SUBSYSTEM, "Consensus driver closed", driver = %self.config.name);
    }

    /// Wait for the event loop and production tasks to finish.
    pub async fn join(&self) {
        let handles: Vec<_> = self.tasks.lock().drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Driver task ended abnormally");
            }
        }
    }

    // === MINING CONTROL ===

    /// off -> on, then make sure initialisation has run.
    ///
    /// A failed initialisation turns mining back off.
    pub async fn start_mining(self: &Arc<Self>) -> ConsensusResult<()> {
        if self.is_closed() {
            return Err(ConsensusError::Closed);
        }
        self.mining.try_start()?;
        if let Err(e) = self.initialize().await {
            self.mining.force_stop();
            return Err(e);
        }
        info!(driver = %self.config.name, "Mining started");
        Ok(())
    }

    /// on -> off
    pub fn stop_mining(&self) -> ConsensusResult<()> {
        self.mining.try_stop()?;
        info!(driver = %self.config.name, "Mining stopped");
        Ok(())
    }

    // === HEAD MAINTENANCE ===

    /// Install a block the store reports as committed.
    pub(crate) fn set_head(&self, block: Block) {
        debug!(height = block.height, "Head advanced");
        self.head.set(block);
    }

    /// After a rollback: refetch the authoritative last block.
    ///
    /// The fetch happens before the head lock is taken.
    pub(crate) async fn refresh_head(&self) -> ConsensusResult<()> {
        match self.gateway()?.last_block().await? {
            Some(block) => {
                log_block_event!(
                    info,
                    SUBSYSTEM,
                    "Head refreshed after rollback",
                    block.height,
                    hash_hex(&block.hash())
                );
                self.head.set(block);
                Ok(())
            }
            None => {
                warn!("Store reported no last block after rollback");
                Ok(())
            }
        }
    }

    pub(crate) fn miner(&self) -> &Arc<dyn MinerCapability> {
        &self.miner
    }

    pub(crate) fn queries(&self) -> &QueryRegistry {
        &self.queries
    }
}

#[async_trait]
impl ConsensusApi for ConsensusDriver {
    fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    fn params(&self) -> &NetworkParams {
        &self.params
    }

    fn current_block(&self) -> ConsensusResult<Arc<Block>> {
        self.head.get().ok_or(ConsensusError::NotBound)
    }

    fn current_height(&self) -> ConsensusResult<u64> {
        self.head.height().ok_or(ConsensusError::NotBound)
    }

    fn is_mining(&self) -> bool {
        self.mining.is_mining()
    }

    fn is_closed(&self) -> bool {
        self.lifecycle() == Lifecycle::Closed
    }

    fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    fn rand_i64(&self) -> i64 {
        self.rng.lock().gen_range(0..i64::MAX)
    }

    fn add_txs_to_block(&self, block: &mut Block, txs: Vec<Transaction>) -> Vec<Transaction> {
        BlockAssembler::for_height(&self.params, block.height).add_txs_to_block(block, txs)
    }

    async fn is_caught_up(&self) -> bool {
        let Ok(gateway) = self.gateway() else {
            return false;
        };
        match gateway.is_sync().await {
            Ok(synced) => synced,
            Err(e) => {
                debug!(error = %e, "Sync status unavailable");
                false
            }
        }
    }

    async fn check_block(&self, detail: &BlockDetail) -> ConsensusResult<()> {
        let block = &detail.block;
        if block.is_genesis() {
            return Ok(());
        }

        let started = Instant::now();
        let parent = self.gateway()?.block_at(block.height - 1).await?;

        let result = match BlockValidator::validate_against_parent(&parent, block, &self.params) {
            Ok(()) => self.miner.check_block(&parent, detail).await,
            Err(e) => Err(e),
        };
        metrics::record_check_latency(started.elapsed().as_secs_f64());

        if let Err(e) = &result {
            metrics::record_block_rejected(e.code());
            log_block_event!(
                warn,
                SUBSYSTEM,
                "Block rejected",
                block.height,
                hash_hex(&block.hash()),
                error = %e
            );
        }
        result
    }

    async fn write_block(&self, block: Block) -> ConsensusResult<CommitOutcome> {
        let gateway = self.gateway()?;
        let height = block.height;
        let proposed = block.txs.clone();

        let committed = gateway
            .add_block_detail(BlockDetail::unexecuted(block))
            .await?
            .ok_or(ConsensusError::StoreInconsistency { height })?;

        let dropped_txs = diff_txs(&proposed, &committed.block.txs);
        let dropped: Vec<Hash> = dropped_txs.iter().map(Transaction::hash).collect();
        let pool_sync = if dropped.is_empty() {
            Ok(())
        } else {
            info!(height, count = dropped.len(), "Store dropped transactions, pruning pool");
            for hash in &dropped {
                log_tx_event!(debug, SUBSYSTEM, "Transaction dropped by store", hash_hex(hash), height);
            }
            let result = gateway.remove_txs(dropped.clone()).await;
            match &result {
                Ok(()) => metrics::record_txs_pruned(dropped.len()),
                Err(e) => warn!(height, error = %e, "Pool prune failed"),
            }
            result
        };

        let committed = Arc::new(committed.block);
        self.head.set_shared(committed.clone());
        metrics::record_block_committed();
        log_block_event!(
            info,
            SUBSYSTEM,
            "Block committed",
            committed.height,
            hash_hex(&committed.hash()),
            tx_count = committed.txs.len()
        );

        Ok(CommitOutcome {
            block: committed,
            dropped,
            pool_sync,
        })
    }

    async fn request_tx(&self, list_size: usize, exclude: Vec<Hash>) -> Vec<Transaction> {
        let Ok(gateway) = self.gateway() else {
            return Vec::new();
        };
        gateway.tx_list(list_size, exclude).await.unwrap_or_else(|e| {
            debug!(error = %e, "Pool request failed");
            Vec::new()
        })
    }

    async fn request_block(&self, height: u64) -> ConsensusResult<Block> {
        self.gateway()?.block_at(height).await
    }

    async fn request_last_block(&self) -> ConsensusResult<Option<Block>> {
        self.gateway()?.last_block().await
    }

    async fn check_tx_dup(&self, txs: Vec<Transaction>) -> Vec<Transaction> {
        let txs = dedup_by_hash(txs);
        if txs.is_empty() {
            return txs;
        }
        let Ok(gateway) = self.gateway() else {
            return txs;
        };
        let hashes = txs.iter().map(Transaction::hash).collect();
        match gateway.duplicate_hashes(hashes).await {
            Ok(dups) => {
                let dups: HashSet<Hash> = dups.into_iter().collect();
                txs.into_iter()
                    .filter(|tx| !dups.contains(&tx.hash()))
                    .collect()
            }
            Err(e) => {
                debug!(error = %e, "Duplicate check failed, keeping batch");
                txs
            }
        }
    }

    fn query(
        &self,
        driver: &str,
        func: &str,
        param: serde_json::Value,
    ) -> ConsensusResult<serde_json::Value> {
        self.queries.dispatch(self, driver, func, &param)
    }
}
