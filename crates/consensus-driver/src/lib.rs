//! # consensus-driver
//!
//! Generic consensus driver: turns a pluggable mining algorithm into a
//! running node by owning block lifecycle and chain-head tracking.
//!
//! ## Architecture
//!
//! The driver sits between the transaction pool and the chain store and
//! talks to both only over the message bus:
//!
//! ```text
//!             consensus topic                 blockchain topic
//! [Bus] ───────────────────→ ConsensusDriver ───────────────────→ [Store]
//!                                 │    ↑
//!                 produce_blocks  │    │ ConsensusApi
//!                                 ↓    │
//!                           MinerCapability ── mempool topic ──→ [Pool]
//! ```
//!
//! - Genesis is synthesised from the miner's data when the store is empty.
//! - Externally proposed blocks are checked against their parent, then by
//!   the miner.
//! - Commits go through the store; transactions it drops are pruned from
//!   the pool and the head moves to the store's block.
//! - Mining start/stop is a compare-and-swap flag.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use consensus_driver::{ConsensusConfig, ConsensusDriver, SoloMiner};
//! use shared_bus::InMemoryBus;
//! use shared_types::NetworkParams;
//! use std::sync::Arc;
//!
//! let config = ConsensusConfig::default();
//! let miner = Arc::new(SoloMiner::new(config.clone()));
//! let driver = Arc::new(ConsensusDriver::new(config, NetworkParams::testnet(), miner)?);
//!
//! driver.start(Arc::new(InMemoryBus::new())).await?;
//! // ...
//! driver.close();
//! ```

pub mod adapters;
pub mod domain;
pub mod ipc;
pub mod metrics;
pub mod ports;
pub mod query;
pub mod service;
pub mod solo;
pub mod validation;

// Re-export main types
pub use domain::{
    Block, BlockAssembler, BlockDetail, ConsensusConfig, ConsensusError, ConsensusResult,
    HeadState, MiningFlag, NetworkParams, Transaction,
};
pub use ipc::IpcHandler;
pub use ports::{CommitOutcome, ConsensusApi, EventOutcome, MinerCapability};
pub use query::{QueryRegistry, BASE_DRIVER};
pub use service::{ConsensusDriver, Lifecycle};
pub use solo::SoloMiner;
pub use validation::BlockValidator;
