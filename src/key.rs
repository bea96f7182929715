//! Arena keys and the slot hash.

use core::fmt;

/// Golden-ratio multiplicative constant used to spread sequential keys.
const PHI_C32: u32 = 0x9e37_79b9;

/// Compact integer key handed out by the arena.
///
/// Keys are assigned in increasing order starting at 0 and are never reused
/// by the same arena, even after removal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Key(i32);

impl Key {
    /// Wrap a raw key received from across a boundary.
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Key(raw)
    }

    #[inline]
    pub const fn get(self) -> i32 {
        self.0
    }

    #[inline]
    pub(crate) const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<Key> for i32 {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl From<Key> for i64 {
    fn from(key: Key) -> Self {
        i64::from(key.0)
    }
}

impl TryFrom<i64> for Key {
    type Error = core::num::TryFromIntError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        i32::try_from(raw).map(Key)
    }
}

/// Mix a nonzero raw key into a well-distributed 32-bit hash.
///
/// Sequential keys would cluster under an identity hash on a power-of-two
/// table; the multiply-and-fold spreads them across the whole range.
#[inline]
pub(crate) fn hash_key(raw: i32) -> u32 {
    debug_assert!(raw != 0, "zero key is never hashed");
    let h = (raw as u32).wrapping_mul(PHI_C32);
    h ^ (h >> 16)
}
