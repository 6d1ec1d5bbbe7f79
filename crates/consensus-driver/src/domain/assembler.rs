//! Block assembly: greedy transaction admission under count and size
//! ceilings.

use shared_types::{Block, Hash, NetworkParams, Transaction};
use std::collections::HashSet;

/// Selects transactions into a block skeleton.
pub struct BlockAssembler {
    max_size: usize,
    max_tx_number: usize,
}

impl BlockAssembler {
    /// Ceilings in force for a block at `height`.
    pub fn for_height(params: &NetworkParams, height: u64) -> Self {
        Self {
            max_size: params.selectable_block_size(),
            max_tx_number: params.at(height).max_tx_number,
        }
    }

    /// Append candidates to `block` in order until a ceiling would be crossed.
    ///
    /// Groups are admitted whole or not at all; a group (or lone transaction)
    /// that does not fit ends selection. Candidates whose group fails to
    /// decode are skipped. Returns exactly what was appended.
    #[tracing::instrument(skip(self, block, candidates), fields(height = block.height, candidate_count = candidates.len()))]
    pub fn add_txs_to_block(&self, block: &mut Block, candidates: Vec<Transaction>) -> Vec<Transaction> {
        let mut size = block.size();
        let mut count = block.txs.len();
        let mut added = Vec::with_capacity(candidates.len());

        for tx in candidates {
            let members = match tx.tx_group() {
                Ok(None) => vec![tx],
                Ok(Some(group)) => group.to_vec(),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping undecodable transaction group");
                    continue;
                }
            };

            let add_size: usize = members.iter().map(Transaction::size).sum();
            if count + members.len() > self.max_tx_number {
                tracing::debug!(count, limit = self.max_tx_number, "Transaction count ceiling reached");
                break;
            }
            if size + add_size > self.max_size {
                tracing::debug!(size, add_size, limit = self.max_size, "Block size ceiling reached");
                break;
            }

            count += members.len();
            size += add_size;
            block.txs.extend(members.iter().cloned());
            added.extend(members);
        }

        added
    }
}

/// Collapse duplicate hashes, keeping each hash at its last position.
pub fn dedup_by_hash(txs: Vec<Transaction>) -> Vec<Transaction> {
    let mut seen: HashSet<Hash> = HashSet::with_capacity(txs.len());
    let mut kept: Vec<Transaction> = txs
        .into_iter()
        .rev()
        .filter(|tx| seen.insert(tx.hash()))
        .collect();
    kept.reverse();
    kept
}
