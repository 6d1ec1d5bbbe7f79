use crate::domain::{Block, ConsensusError, ConsensusResult, NetworkParams};
use shared_types::{hash_hex, FORK_CHECK_BLOCK_TIME};

/// Stateless structural checks of a block against its parent.
pub struct BlockValidator;

impl BlockValidator {
    /// Height, block time and parent linkage.
    ///
    /// Genesis is accepted as-is. Algorithm-specific checks run afterwards,
    /// in the miner.
    pub fn validate_against_parent(
        parent: &Block,
        block: &Block,
        params: &NetworkParams,
    ) -> ConsensusResult<()> {
        if block.is_genesis() {
            return Ok(());
        }

        let expected = parent.height + 1;
        if block.height != expected {
            return Err(ConsensusError::InvalidHeight {
                expected,
                actual: block.height,
            });
        }

        if params.is_fork(block.height, FORK_CHECK_BLOCK_TIME) && block.block_time < parent.block_time {
            return Err(ConsensusError::InvalidBlockTime {
                block: block.block_time,
                parent: parent.block_time,
            });
        }

        let parent_hash = parent.hash();
        if block.parent_hash != parent_hash {
            return Err(ConsensusError::InvalidParentHash {
                expected: hash_hex(&parent_hash),
                actual: hash_hex(&block.parent_hash),
            });
        }

        Ok(())
    }
}
