//! Domain layer for the consensus driver
//!
//! Pure state and algorithms: no bus access happens in this module.

pub mod assembler;
pub mod config;
pub mod error;
pub mod genesis;
pub mod head;
pub mod mining;

pub use assembler::{dedup_by_hash, BlockAssembler};
pub use config::ConsensusConfig;
pub use error::{ConsensusError, ConsensusResult};
pub use genesis::build_genesis_block;
pub use head::HeadState;
pub use mining::MiningFlag;

// Re-export chain entities used across the crate
pub use shared_types::{Block, BlockDetail, Hash, NetworkParams, Transaction};
