//! Adapters layer (Hexagonal Architecture)

mod bus_gateway;

pub use bus_gateway::*;
