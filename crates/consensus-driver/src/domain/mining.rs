use super::{ConsensusError, ConsensusResult};
use std::sync::atomic::{AtomicBool, Ordering};

/// Mining on/off switch.
///
/// Transitions are compare-and-swap, so of N racing starts exactly one
/// wins and the rest observe `AlreadyMining`.
#[derive(Debug, Default)]
pub struct MiningFlag {
    active: AtomicBool,
}

impl MiningFlag {
    pub fn new(active: bool) -> Self {
        Self {
            active: AtomicBool::new(active),
        }
    }

    pub fn is_mining(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// off -> on
    pub fn try_start(&self) -> ConsensusResult<()> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| ConsensusError::AlreadyMining)
    }

    /// on -> off
    pub fn try_stop(&self) -> ConsensusResult<()> {
        self.active
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| ConsensusError::NotMining)
    }

    pub fn force_stop(&self) {
        self.active.store(false, Ordering::Release);
    }
}
