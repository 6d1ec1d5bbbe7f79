use parking_lot::Mutex;
use shared_types::Block;
use std::sync::Arc;

/// The authoritative current block.
///
/// Replaced wholesale; readers get a shared snapshot. The lock is only held
/// for the swap, never across a bus round trip.
#[derive(Default)]
pub struct HeadState {
    current: Mutex<Option<Arc<Block>>>,
}

impl HeadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, block: Block) {
        self.set_shared(Arc::new(block));
    }

    pub fn set_shared(&self, block: Arc<Block>) {
        *self.current.lock() = Some(block);
    }

    pub fn get(&self) -> Option<Arc<Block>> {
        self.current.lock().clone()
    }

    pub fn height(&self) -> Option<u64> {
        self.current.lock().as_ref().map(|b| b.height)
    }
}
