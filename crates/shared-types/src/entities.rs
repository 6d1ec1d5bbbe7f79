//! # Core Chain Entities
//!
//! Blocks, transactions, transaction groups and receipts exchanged between
//! the consensus driver, the chain store and the transaction pool.
//!
//! ## Encoding
//!
//! All hashing and size accounting uses the canonical `bincode` encoding of
//! an entity. A transaction's hash never covers its signature, so the hash
//! is stable across re-signing and usable as the pool removal key.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// A 32-byte SHA-256 digest.
pub type Hash = [u8; 32];

/// The all-zero digest used as the genesis parent hash.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Maximum number of members a transaction group may carry.
pub const MAX_TX_GROUP_SIZE: usize = 20;

/// Compute the SHA-256 digest of `data`.
#[inline]
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Lowercase hex rendering of a digest, for logs and errors.
pub fn hash_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

/// A signed, opaque unit of state change.
///
/// The driver never interprets `payload`; `execer` names the executor that
/// the store dispatches the transaction to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Transaction {
    /// Name of the executor handling this transaction.
    pub execer: String,
    /// Executor-specific payload.
    pub payload: Vec<u8>,
    /// Fee paid to the block producer.
    pub fee: u64,
    /// Sender nonce.
    pub nonce: u64,
    /// Expiry (height or unix time, executor-defined). Zero means never.
    pub expire: u64,
    /// Signature over the transaction hash.
    pub signature: Vec<u8>,
    /// Members when this transaction carries an atomic group.
    pub group: Vec<Transaction>,
}

/// Reasons a group carrier fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxGroupError {
    #[error("transaction group has {count} members, need at least 2")]
    TooSmall { count: usize },

    #[error("transaction group has {count} members, limit is {limit}")]
    TooLarge { count: usize, limit: usize },

    #[error("transaction group member {index} is itself a group")]
    Nested { index: usize },
}

impl Transaction {
    /// Create a plain (non-group) transaction.
    pub fn new(execer: impl Into<String>, payload: Vec<u8>, fee: u64, nonce: u64) -> Self {
        Self {
            execer: execer.into(),
            payload,
            fee,
            nonce,
            ..Default::default()
        }
    }

    /// Wrap `members` into a group carrier.
    ///
    /// The carrier's own execer is taken from the first member. Validity of
    /// the group is checked lazily by [`Transaction::tx_group`].
    pub fn group_of(members: Vec<Transaction>) -> Self {
        let execer = members
            .first()
            .map(|tx| tx.execer.clone())
            .unwrap_or_default();
        Self {
            execer,
            fee: members.iter().map(|tx| tx.fee).sum(),
            group: members,
            ..Default::default()
        }
    }

    /// Content hash: SHA-256 over the encoding with the signature stripped.
    pub fn hash(&self) -> Hash {
        let unsigned = Transaction {
            signature: Vec::new(),
            ..self.clone()
        };
        sha256(&bincode::serialize(&unsigned).unwrap_or_default())
    }

    /// Serialized size in bytes.
    pub fn size(&self) -> usize {
        bincode::serialized_size(self).unwrap_or(0) as usize
    }

    /// Decode the group this transaction carries.
    ///
    /// Returns `Ok(None)` for a plain transaction.
    pub fn tx_group(&self) -> Result<Option<&[Transaction]>, TxGroupError> {
        if self.group.is_empty() {
            return Ok(None);
        }
        let count = self.group.len();
        if count < 2 {
            return Err(TxGroupError::TooSmall { count });
        }
        if count > MAX_TX_GROUP_SIZE {
            return Err(TxGroupError::TooLarge {
                count,
                limit: MAX_TX_GROUP_SIZE,
            });
        }
        if let Some(index) = self.group.iter().position(|tx| !tx.group.is_empty()) {
            return Err(TxGroupError::Nested { index });
        }
        Ok(Some(&self.group))
    }
}

// =============================================================================
// BLOCKS
// =============================================================================

/// A block of ordered transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Block {
    /// Block format version.
    pub version: u32,
    /// Hash of the parent block. All-zero for genesis.
    pub parent_hash: Hash,
    /// Merkle root over the transaction hashes.
    pub tx_hash: Hash,
    /// State root after execution, filled in by the store.
    pub state_hash: Hash,
    /// Height in the chain. Genesis is 0.
    pub height: u64,
    /// Unix seconds.
    pub block_time: u64,
    /// Compact difficulty target.
    pub difficulty: u32,
    /// Ordered transactions.
    pub txs: Vec<Transaction>,
}

#[derive(Serialize)]
struct HeaderView<'a> {
    version: u32,
    parent_hash: &'a Hash,
    tx_hash: &'a Hash,
    state_hash: &'a Hash,
    height: u64,
    block_time: u64,
    difficulty: u32,
}

impl Block {
    /// Header hash. Transactions are committed through `tx_hash`.
    pub fn hash(&self) -> Hash {
        let header = HeaderView {
            version: self.version,
            parent_hash: &self.parent_hash,
            tx_hash: &self.tx_hash,
            state_hash: &self.state_hash,
            height: self.height,
            block_time: self.block_time,
            difficulty: self.difficulty,
        };
        sha256(&bincode::serialize(&header).unwrap_or_default())
    }

    /// Serialized size of the whole block in bytes.
    pub fn size(&self) -> usize {
        bincode::serialized_size(self).unwrap_or(0) as usize
    }

    /// Whether this is the genesis block.
    pub fn is_genesis(&self) -> bool {
        self.height == 0
    }

    /// Recompute `tx_hash` from the current transaction list.
    pub fn seal_tx_root(&mut self) {
        self.tx_hash = crate::merkle::calc_merkle_root(&self.txs);
    }
}

/// Execution outcome of a single transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    Ok,
    Failed,
}

/// Post-execution receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub status: ReceiptStatus,
    pub logs: Vec<String>,
}

impl Receipt {
    pub fn ok() -> Self {
        Self {
            status: ReceiptStatus::Ok,
            logs: Vec::new(),
        }
    }
}

/// A block together with its execution receipts.
///
/// Returned by the store after a commit. Transactions the store refused to
/// include are absent from `block.txs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockDetail {
    pub block: Block,
    pub receipts: Vec<Receipt>,
}

impl BlockDetail {
    /// Wrap a block that has not been executed yet.
    pub fn unexecuted(block: Block) -> Self {
        Self {
            block,
            receipts: Vec::new(),
        }
    }
}
