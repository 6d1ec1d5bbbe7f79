//! # Error Types
//!
//! Errors that cross the bus between modules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An error raised by a remote module and carried back in a reply.
///
/// `code` is a stable machine-readable tag (for example `invalid_height`);
/// `message` is the human-readable rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct RemoteError {
    pub code: String,
    pub message: String,
}

impl RemoteError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by the chain store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No block at the requested height.
    #[error("Block not found at height {height}")]
    NotFound { height: u64 },

    /// Parent of the submitted block is not the current tip.
    #[error("Block at height {height} does not extend the tip")]
    NotOnTip { height: u64 },
}
