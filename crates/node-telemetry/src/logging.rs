//! Structured log macros.
//!
//! Every line carries a `subsystem` field so log shippers can split the
//! driver, the miner and the bus without parsing messages. The first
//! argument is the `tracing` level macro to use (`info`, `warn`, ...).

/// Log an event tagged with its subsystem.
#[macro_export]
macro_rules! log_event {
    ($level:ident, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(subsystem = $subsystem, $($($field)*,)? $msg)
    };
}

/// Log a block event with `block_height` and `block_hash`.
///
/// `$block_hash` must implement `Display` (pass a hex string).
#[macro_export]
macro_rules! log_block_event {
    ($level:ident, $subsystem:expr, $msg:expr, $height:expr, $hash:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            block_height = $height,
            block_hash = %$hash,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a transaction event with `tx_hash`.
#[macro_export]
macro_rules! log_tx_event {
    ($level:ident, $subsystem:expr, $msg:expr, $tx_hash:expr $(, $($field:tt)*)?) => {
        tracing::$level!(subsystem = $subsystem, tx_hash = %$tx_hash, $($($field)*,)? $msg)
    };
}
