//! Genesis Block Creation
//!
//! Bootstraps an empty chain from data supplied by the mining algorithm.

use shared_types::{calc_merkle_root, Block, NetworkParams, Transaction, ZERO_HASH};

/// Build the height-0 block.
///
/// The parent hash is all-zero and the difficulty is the network's
/// proof-of-work floor at height 0.
pub fn build_genesis_block(
    params: &NetworkParams,
    block_time: u64,
    txs: Vec<Transaction>,
) -> Block {
    Block {
        version: 0,
        parent_hash: ZERO_HASH,
        tx_hash: calc_merkle_root(&txs),
        state_hash: ZERO_HASH,
        height: 0,
        block_time,
        difficulty: params.at(0).pow_limit_bits,
        txs,
    }
}
