//! # Node Telemetry
//!
//! Structured logging for the consensus node.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use node_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::for_driver("solo");
//!     init_telemetry(&config).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CONSENSUS_SERVICE_NAME` | `consensus-node` | Service name in logs |
//! | `CONSENSUS_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `CONSENSUS_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `CONSENSUS_JSON_LOGS` | `false` | JSON log lines (`true` in containers) |

mod config;
mod logging;
mod tracing_setup;

pub use config::TelemetryConfig;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install structured logging for the process.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_setup::init_tracing(config)
}
