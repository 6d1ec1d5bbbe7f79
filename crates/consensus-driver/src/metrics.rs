//! # Consensus Metrics
//!
//! Prometheus metrics for monitoring the consensus driver.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! consensus-driver = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `consensus_blocks_committed_total` - Counter of blocks written through the driver
//! - `consensus_blocks_rejected_total` - Counter of rejected blocks (by reason)
//! - `consensus_txs_pruned_total` - Counter of transactions removed from the pool after commit
//! - `consensus_check_latency_seconds` - Histogram of block check times

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter_vec, register_histogram, register_int_counter, CounterVec, Histogram,
    IntCounter,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total blocks committed through the driver
    pub static ref BLOCKS_COMMITTED: IntCounter = register_int_counter!(
        "consensus_blocks_committed_total",
        "Total number of blocks committed through the driver"
    )
    .expect("Failed to create BLOCKS_COMMITTED metric");

    /// Total blocks rejected, labeled by rejection reason
    pub static ref BLOCKS_REJECTED: CounterVec = register_counter_vec!(
        "consensus_blocks_rejected_total",
        "Total number of blocks rejected",
        &["reason"]
    )
    .expect("Failed to create BLOCKS_REJECTED metric");

    /// Total transactions pruned from the pool after the store dropped them
    pub static ref TXS_PRUNED: IntCounter = register_int_counter!(
        "consensus_txs_pruned_total",
        "Total number of transactions removed from the pool after commit"
    )
    .expect("Failed to create TXS_PRUNED metric");

    /// Histogram of block check latency
    pub static ref CHECK_LATENCY: Histogram = register_histogram!(
        "consensus_check_latency_seconds",
        "Time taken to check a block in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to create CHECK_LATENCY metric");
}

/// Record a committed block
#[cfg(feature = "metrics")]
pub fn record_block_committed() {
    BLOCKS_COMMITTED.inc();
}

/// Record a rejected block with reason
#[cfg(feature = "metrics")]
pub fn record_block_rejected(reason: &str) {
    BLOCKS_REJECTED.with_label_values(&[reason]).inc();
}

/// Record transactions pruned from the pool
#[cfg(feature = "metrics")]
pub fn record_txs_pruned(count: usize) {
    TXS_PRUNED.inc_by(count as u64);
}

/// Record block check latency
#[cfg(feature = "metrics")]
pub fn record_check_latency(seconds: f64) {
    CHECK_LATENCY.observe(seconds);
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_block_committed() {}

#[cfg(not(feature = "metrics"))]
pub fn record_block_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_txs_pruned(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_check_latency(_seconds: f64) {}
