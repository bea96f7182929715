//! Error taxonomy for arena operations.

use crate::key::Key;
use std::fmt;

/// Errors returned by [`ObjectArena`](crate::ObjectArena) and its
/// underlying table.
///
/// Every variant leaves the arena exactly as it was before the failing call.
#[derive(Debug, Clone, PartialEq)]
pub enum ArenaError {
    /// `get`, `remove` or `dup` was given a key with no current entry.
    UnassignedKey {
        /// The offending key.
        key: Key,
    },
    /// The probe table would have to grow past its maximum size, or the
    /// allocation for the larger table failed.
    CapacityExceeded {
        /// Slot count that was requested.
        requested: usize,
        /// Largest slot count the table supports.
        max: usize,
    },
    /// Construction was attempted with a load factor outside `[min, max]`.
    InvalidLoadFactor {
        load_factor: f64,
        min: f64,
        max: f64,
    },
    /// The 32-bit key counter has been used up.
    KeysExhausted,
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnassignedKey { key } => write!(f, "key is not assigned: {key}"),
            Self::CapacityExceeded { requested, max } => write!(
                f,
                "maximum table size exceeded: requested {requested} slots, max {max}"
            ),
            Self::InvalidLoadFactor {
                load_factor,
                min,
                max,
            } => write!(
                f,
                "the load factor should be in range [{min:.2}, {max:.2}]: {load_factor}"
            ),
            Self::KeysExhausted => write!(f, "no more keys can be assigned"),
        }
    }
}

impl std::error::Error for ArenaError {}
