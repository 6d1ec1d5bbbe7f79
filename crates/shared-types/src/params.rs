//! # Network Parameters
//!
//! Chain-wide limits that vary by height: block size and transaction
//! ceilings, the proof-of-work floor, and named fork activation heights.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fork that enforces non-decreasing block time relative to the parent.
pub const FORK_CHECK_BLOCK_TIME: &str = "ForkCheckBlockTime";

/// Default maximum serialized block size (bytes).
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 20_000_000;

/// Default space kept out of transaction selection (bytes).
pub const DEFAULT_RESERVED_BLOCK_SPACE: usize = 100_000;

/// Easiest allowed compact difficulty.
pub const DEFAULT_POW_LIMIT_BITS: u32 = 0x1f00_ffff;

/// Per-height block parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightParams {
    /// Maximum number of transactions in one block.
    pub max_tx_number: usize,
    /// Proof-of-work floor in compact form.
    pub pow_limit_bits: u32,
}

/// Network-wide parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkParams {
    /// Network name, for logs.
    pub name: String,
    pub max_block_size: usize,
    pub reserved_block_space: usize,
    /// Parameter schedule keyed by the height it takes effect at.
    pub schedule: BTreeMap<u64, HeightParams>,
    /// Fork name to activation height.
    pub forks: BTreeMap<String, u64>,
}

impl NetworkParams {
    /// Local/test network: every fork active from genesis.
    pub fn testnet() -> Self {
        let mut schedule = BTreeMap::new();
        schedule.insert(
            0,
            HeightParams {
                max_tx_number: 10_000,
                pow_limit_bits: DEFAULT_POW_LIMIT_BITS,
            },
        );
        let mut forks = BTreeMap::new();
        forks.insert(FORK_CHECK_BLOCK_TIME.to_string(), 0);
        Self {
            name: "testnet".to_string(),
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            reserved_block_space: DEFAULT_RESERVED_BLOCK_SPACE,
            schedule,
            forks,
        }
    }

    /// Production network.
    pub fn mainnet() -> Self {
        let mut schedule = BTreeMap::new();
        schedule.insert(
            0,
            HeightParams {
                max_tx_number: 1_600,
                pow_limit_bits: DEFAULT_POW_LIMIT_BITS,
            },
        );
        let mut forks = BTreeMap::new();
        forks.insert(FORK_CHECK_BLOCK_TIME.to_string(), 1_200_000);
        Self {
            name: "mainnet".to_string(),
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            reserved_block_space: DEFAULT_RESERVED_BLOCK_SPACE,
            schedule,
            forks,
        }
    }

    /// Parameters in force at `height`.
    ///
    /// Falls back to the testnet defaults if the schedule is empty.
    pub fn at(&self, height: u64) -> HeightParams {
        self.schedule
            .range(..=height)
            .next_back()
            .map(|(_, params)| *params)
            .unwrap_or(HeightParams {
                max_tx_number: 10_000,
                pow_limit_bits: DEFAULT_POW_LIMIT_BITS,
            })
    }

    /// Whether fork `name` is active at `height`. Unknown forks are inactive.
    pub fn is_fork(&self, height: u64, name: &str) -> bool {
        self.forks
            .get(name)
            .is_some_and(|activation| height >= *activation)
    }

    /// Upper bound on block size available to transaction selection.
    pub fn selectable_block_size(&self) -> usize {
        self.max_block_size.saturating_sub(self.reserved_block_space)
    }

    /// Set the per-height schedule entry starting at `height`.
    pub fn with_height_params(mut self, height: u64, params: HeightParams) -> Self {
        self.schedule.insert(height, params);
        self
    }

    /// Set the activation height of a fork.
    pub fn with_fork(mut self, name: &str, height: u64) -> Self {
        self.forks.insert(name.to_string(), height);
        self
    }
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self::testnet()
    }
}
