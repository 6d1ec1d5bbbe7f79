//! # Consensus Driver Test Suite
//!
//! Drives a real `ConsensusDriver` against in-memory stand-ins for the
//! chain store and the transaction pool, all talking over `InMemoryBus`.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # In-memory store and pool served over the bus
//! └── integration/      # End-to-end flows
//!     ├── solo_flow.rs      # Block production with the solo miner
//!     └── driver_flows.rs   # Checks, rollbacks, pool sync, queries
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p driver-tests
//! cargo test -p driver-tests integration::solo_flow
//! ```

#![allow(dead_code)]

pub mod harness;
pub mod integration;
