//! Merkle root over transaction hashes.

use crate::entities::{sha256, Hash, Transaction, ZERO_HASH};

/// Compute the Merkle root of `txs`.
///
/// Leaves are transaction hashes. Odd levels duplicate their last node.
/// An empty list yields [`ZERO_HASH`].
pub fn calc_merkle_root(txs: &[Transaction]) -> Hash {
    let leaves: Vec<Hash> = txs.iter().map(Transaction::hash).collect();
    merkle_root_of(leaves)
}

/// Merkle root over precomputed leaf hashes.
pub fn merkle_root_of(mut level: Vec<Hash>) -> Hash {
    if level.is_empty() {
        return ZERO_HASH;
    }
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            if let Some(last) = level.last().copied() {
                level.push(last);
            }
        }
        level = level
            .chunks(2)
            .map(|pair| {
                let mut buf = [0u8; 64];
                buf[..32].copy_from_slice(&pair[0]);
                buf[32..].copy_from_slice(&pair[1]);
                sha256(&buf)
            })
            .collect();
    }
    level[0]
}
