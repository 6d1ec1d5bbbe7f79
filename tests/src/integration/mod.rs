//! Cross-module flows: driver, store and pool over one bus.

mod driver_flows;
mod solo_flow;
