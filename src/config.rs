//! Construction parameters and buffer sizing.

use crate::error::ArenaError;

/// Number of entries a fresh arena holds without growing.
pub const DEFAULT_EXPECTED_ELEMENTS: usize = 4;

/// Default ratio of occupied to total probe slots.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Minimal sane load factor (99 empty slots per 100).
pub const MIN_LOAD_FACTOR: f64 = 0.01;

/// Maximum sane load factor (1 empty slot per 100).
pub const MAX_LOAD_FACTOR: f64 = 0.99;

/// Smallest probe table ever allocated.
pub const MIN_HASH_ARRAY_LENGTH: usize = 4;

/// Largest probe table: the biggest power of two below the positive 32-bit range.
pub const MAX_HASH_ARRAY_LENGTH: usize = 1 << 30;

/// Sizing parameters for an [`ObjectArena`](crate::ObjectArena).
///
/// ```
/// use object_arena::{ArenaConfig, ObjectArena};
///
/// let cfg = ArenaConfig::new().with_expected_elements(1_000).with_load_factor(0.5);
/// let arena: ObjectArena<String> = ObjectArena::with_config(cfg).unwrap();
/// assert!(arena.capacity() >= 2_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaConfig {
    expected_elements: usize,
    load_factor: f64,
}

impl ArenaConfig {
    pub const fn new() -> Self {
        Self {
            expected_elements: DEFAULT_EXPECTED_ELEMENTS,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }

    /// Entries guaranteed to fit (inclusive) before the first growth.
    pub fn with_expected_elements(mut self, n: usize) -> Self {
        self.expected_elements = n;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn expected_elements(&self) -> usize {
        self.expected_elements
    }

    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Check the load factor range; NaN is rejected as out of range.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if (MIN_LOAD_FACTOR..=MAX_LOAD_FACTOR).contains(&self.load_factor) {
            Ok(())
        } else {
            Err(ArenaError::InvalidLoadFactor {
                load_factor: self.load_factor,
                min: MIN_LOAD_FACTOR,
                max: MAX_LOAD_FACTOR,
            })
        }
    }

    /// Probe table size able to hold `expected_elements` without growing.
    pub(crate) fn initial_buffer_size(&self) -> Result<usize, ArenaError> {
        min_buffer_size(self.expected_elements, self.load_factor)
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn min_buffer_size(elements: usize, load_factor: f64) -> Result<usize, ArenaError> {
    let exceeded = |requested: usize| ArenaError::CapacityExceeded {
        requested,
        max: MAX_HASH_ARRAY_LENGTH,
    };
    let length = (elements as f64 / load_factor).ceil();
    if length > MAX_HASH_ARRAY_LENGTH as f64 {
        // Float to int casts saturate.
        return Err(exceeded(length as usize));
    }
    let mut length = length as usize;
    if length == elements {
        // Always leave at least one empty slot.
        length += 1;
    }
    let length = length.next_power_of_two().max(MIN_HASH_ARRAY_LENGTH);
    if length > MAX_HASH_ARRAY_LENGTH {
        return Err(exceeded(length));
    }
    Ok(length)
}

/// Occupancy at which a table of `array_size` slots must grow.
pub(crate) fn expand_at_count(array_size: usize, load_factor: f64) -> usize {
    debug_assert!(array_size.is_power_of_two());
    let at = (array_size as f64 * load_factor).ceil() as usize;
    at.min(array_size - 1)
}
