//! Error types for table construction and removal.

use thiserror::Error;

/// Returned by `ChainedHashMap::remove` when the key has no association.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveError {
    #[error("there is no element with that key")]
    KeyNotFound,
}

/// Rejected construction parameters.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("capacity must be at least 1")]
    ZeroCapacity,
    #[error("capacity {0} is not a power of two")]
    CapacityNotPowerOfTwo(usize),
    #[error("capacity {0} exceeds the maximum bucket count")]
    CapacityTooLarge(usize),
    #[error("load factor {0} is outside (0, 1]")]
    LoadFactorOutOfRange(f64),
}
