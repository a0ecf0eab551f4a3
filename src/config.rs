//! Construction parameters for `ChainedHashMap`.

use crate::error::ConfigError;

/// Bucket count used by `ChainedHashMap::new`.
pub const DEFAULT_CAPACITY: usize = 16;

/// Load factor used when none is given.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Largest bucket count the table will grow to. Spread hashes are 32 bits
/// wide, so more buckets than this could never be addressed by the mask.
pub const MAX_CAPACITY: usize = 1 << 30;

/// Capacity and load factor, validated before a table is built.
///
/// The threshold that drives growth is `floor(capacity * load_factor)`,
/// compared against the number of non-empty buckets rather than the number
/// of entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    capacity: usize,
    load_factor: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial bucket count. Must be a power of two.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the load factor. Must lie in `(0, 1]`.
    pub fn load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn initial_capacity(&self) -> usize {
        self.capacity
    }

    pub fn get_load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Checks every parameter; the first violation found is reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if !self.capacity.is_power_of_two() {
            return Err(ConfigError::CapacityNotPowerOfTwo(self.capacity));
        }
        if self.capacity > MAX_CAPACITY {
            return Err(ConfigError::CapacityTooLarge(self.capacity));
        }
        // NaN fails both comparisons.
        if !(self.load_factor > 0.0 && self.load_factor <= 1.0) {
            return Err(ConfigError::LoadFactorOutOfRange(self.load_factor));
        }
        Ok(())
    }
}

/// `floor(capacity * load_factor)`; saturates once the table cannot grow.
pub(crate) fn threshold_for(capacity: usize, load_factor: f64) -> usize {
    if capacity >= MAX_CAPACITY {
        return usize::MAX;
    }
    (capacity as f64 * load_factor) as usize
}
