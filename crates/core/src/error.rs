//! Error types for configuration and persistence

/// Invalid or missing configuration, surfaced at construction
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid size {0} is outside the supported range 2..=16")]
    InvalidGridSize(usize),
    #[error("grid size value {0:?} is not a number")]
    UnparsableGridSize(String),
    #[error("expected {expected} cells for the grid, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },
    #[error("tile at cell {index} has power {power}; powers start at 1")]
    InvalidTile { index: usize, power: u8 },
    #[error("unknown configuration key {0:?}")]
    UnknownKey(String),
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
    #[error("seed must not be empty")]
    EmptySeed,
}

/// Failure reported by a score store
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("score store format error: {0}")]
    Format(String),
}
