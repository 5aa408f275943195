use thiserror::Error;

/// Configuration problems, raised when loading settings. Inside the projection core an
/// invalid configuration never errors; it yields an empty range or book instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },

    #[error("invalid order book configuration: {0}")]
    InvalidOrderBook(String),
}

/// A single tick read that did not come back. The curve builder skips these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TickFetchError {
    #[error("tick {0} unavailable")]
    Unavailable(i32),

    #[error("tick {tick} returned malformed data: {reason}")]
    Malformed { tick: i32, reason: String },
}

/// Transport-level failure of a whole read pass. Invalidates the previous book.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("pool state read failed: {0}")]
    PoolState(String),

    #[error("tick batch read failed: {0}")]
    TickBatch(String),
}
