//! # Shared Types Crate
//!
//! Chain entities, network parameters and bus payloads used by the
//! consensus driver and the modules it talks to.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses the bus is here.
//! - **Canonical Encoding**: hashes and sizes derive from `bincode`, so all
//!   modules agree on them without coordination.

pub mod entities;
pub mod errors;
pub mod ipc;
pub mod merkle;
pub mod params;

pub use entities::*;
pub use errors::*;
pub use ipc::*;
pub use merkle::calc_merkle_root;
pub use params::{HeightParams, NetworkParams, FORK_CHECK_BLOCK_TIME};
