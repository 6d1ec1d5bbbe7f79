//! Error types for the consensus driver

use shared_bus::BusError;
use shared_types::errors::RemoteError;

/// Consensus driver error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsensusError {
    #[error("Invalid block height: expected {expected}, got {actual}")]
    InvalidHeight { expected: u64, actual: u64 },

    #[error("Invalid block time: block {block} < parent {parent}")]
    InvalidBlockTime { block: u64, parent: u64 },

    #[error("Invalid parent hash: expected {expected}, got {actual}")]
    InvalidParentHash { expected: String, actual: String },

    #[error("Miner is already started")]
    AlreadyMining,

    #[error("Miner is not started")]
    NotMining,

    #[error("Action not supported: {0}")]
    UnsupportedAction(String),

    #[error("Bus request to {topic} timed out")]
    BusTimeout { topic: String },

    #[error("Bus unavailable: {0}")]
    BusUnavailable(String),

    #[error("Store returned no block detail for height {height}")]
    StoreInconsistency { height: u64 },

    #[error("Failed to remove {count} transactions from pool: {reason}")]
    PoolSyncFailure { count: usize, reason: String },

    #[error("Driver is not bound to a bus")]
    NotBound,

    #[error("Driver already started")]
    AlreadyStarted,

    #[error("Driver is closed")]
    Closed,

    #[error("Query not found: {driver}.{func}")]
    QueryNotFound { driver: String, func: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Block not found at height {0}")]
    MissingBlock(u64),

    #[error("Unexpected reply: expected {expected}, got {actual}")]
    UnexpectedReply {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Remote error: {0}")]
    Remote(RemoteError),

    #[error("Rejected by consensus algorithm: {0}")]
    Algorithm(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type ConsensusResult<T> = Result<T, ConsensusError>;

impl ConsensusError {
    /// Stable tag used when the error crosses the bus.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidHeight { .. } => "invalid_height",
            Self::InvalidBlockTime { .. } => "invalid_block_time",
            Self::InvalidParentHash { .. } => "invalid_parent_hash",
            Self::AlreadyMining => "already_mining",
            Self::NotMining => "not_mining",
            Self::UnsupportedAction(_) => "unsupported_action",
            Self::BusTimeout { .. } => "bus_timeout",
            Self::BusUnavailable(_) => "bus_unavailable",
            Self::StoreInconsistency { .. } => "store_inconsistency",
            Self::PoolSyncFailure { .. } => "pool_sync_failure",
            Self::NotBound => "not_bound",
            Self::AlreadyStarted => "already_started",
            Self::Closed => "closed",
            Self::QueryNotFound { .. } => "query_not_found",
            Self::InvalidQuery(_) => "invalid_query",
            Self::MissingBlock(_) => "missing_block",
            Self::UnexpectedReply { .. } => "unexpected_reply",
            Self::Remote(_) => "remote",
            Self::Algorithm(_) => "algorithm",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }

    /// Render for a bus reply.
    pub fn to_remote(&self) -> RemoteError {
        match self {
            // Keep the originating module's tag.
            Self::Remote(remote) => remote.clone(),
            other => RemoteError::new(other.code(), other.to_string()),
        }
    }

    /// Whether this is a block validity verdict rather than an I/O failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidHeight { .. }
                | Self::InvalidBlockTime { .. }
                | Self::InvalidParentHash { .. }
                | Self::Algorithm(_)
        )
    }
}

impl From<BusError> for ConsensusError {
    fn from(err: BusError) -> Self {
        match err {
            BusError::Timeout { topic, .. } => Self::BusTimeout {
                topic: topic.to_string(),
            },
            BusError::Remote(remote) => Self::Remote(remote),
            other => Self::BusUnavailable(other.to_string()),
        }
    }
}
