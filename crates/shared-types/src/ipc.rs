//! # Bus Payloads
//!
//! Request and reply payloads carried on the message bus between the
//! consensus driver, the chain store (`blockchain` topic) and the
//! transaction pool (`mempool` topic).

use crate::entities::*;
use serde::{Deserialize, Serialize};

// =============================================================================
// CONSENSUS QUERIES
// =============================================================================

/// A driver-and-function-qualified query.
///
/// `driver` names the consensus algorithm (or `base` for the generic
/// driver); `func_name` selects the handler registered under that driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainExecutor {
    pub driver: String,
    pub func_name: String,
    pub param: serde_json::Value,
}

impl ChainExecutor {
    pub fn new(driver: impl Into<String>, func_name: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            func_name: func_name.into(),
            param: serde_json::Value::Null,
        }
    }

    pub fn with_param(mut self, param: serde_json::Value) -> Self {
        self.param = param;
        self
    }
}

// =============================================================================
// CHAIN STORE
// =============================================================================

/// Inclusive height range request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReqBlocks {
    pub start: u64,
    pub end: u64,
    /// Whether the store should include receipts.
    pub with_details: bool,
}

impl ReqBlocks {
    /// Request the single block at `height`.
    pub fn single(height: u64) -> Self {
        Self {
            start: height,
            end: height,
            with_details: false,
        }
    }
}

// =============================================================================
// TRANSACTION POOL
// =============================================================================

/// Transaction list request: up to `count` transactions, excluding `hashes`.
///
/// The same shape is used for pool removal (`count` ignored) and for the
/// store's duplicate check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TxHashList {
    pub hashes: Vec<Hash>,
    pub count: usize,
}

/// Generic acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub is_ok: bool,
    pub msg: String,
}

impl Reply {
    pub fn ok() -> Self {
        Self {
            is_ok: true,
            msg: String::new(),
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            is_ok: false,
            msg: msg.into(),
        }
    }
}
