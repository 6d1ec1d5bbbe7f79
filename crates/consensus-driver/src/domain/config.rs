//! Consensus configuration

use super::{ConsensusError, ConsensusResult};
use serde::{Deserialize, Serialize};

/// Process-lifetime consensus parameters, fixed at driver construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Algorithm name (`solo`, `ticket`, ...).
    pub name: String,

    /// Address credited by the genesis transactions.
    pub genesis: String,

    /// Genesis block time, unix seconds.
    pub genesis_block_time: u64,

    /// Start mining as soon as the driver starts.
    pub miner_start: bool,

    /// Produce blocks even when the node is not caught up.
    pub force_mining: bool,

    /// Seconds between block production attempts.
    pub write_block_seconds: u64,

    /// Seconds after which an empty block is produced anyway. Zero
    /// disables empty blocks.
    pub empty_block_interval: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            name: "solo".to_string(),
            genesis: "14KEKbYtKKQm4wMthSK9J4La4nAiidGozt".to_string(),
            genesis_block_time: 1_514_533_394,
            miner_start: true,
            force_mining: false,
            write_block_seconds: 1,
            empty_block_interval: 0,
        }
    }
}

impl ConsensusConfig {
    /// Parse from JSON; absent fields take their defaults.
    pub fn from_json(raw: &str) -> ConsensusResult<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| ConsensusError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConsensusResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConsensusError::InvalidConfig(
                "name must not be empty".to_string(),
            ));
        }
        if self.write_block_seconds == 0 {
            return Err(ConsensusError::InvalidConfig(
                "write_block_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
