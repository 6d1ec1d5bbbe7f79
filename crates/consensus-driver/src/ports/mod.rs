//! Ports layer - hexagonal architecture boundaries

pub mod inbound;
pub mod outbound;

pub use inbound::{CommitOutcome, ConsensusApi};
pub use outbound::{EventOutcome, MinerCapability};
