//! object-arena: a thread-safe arena that stores objects under compact,
//! monotonically assigned integer keys.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: let a caller that can only hold a bounded number of references
//!   across some boundary keep one reference to an arena and refer to any
//!   number of objects by cheap integer `Key`s.
//! - Layers:
//!   - KeyTable<V>: single-threaded open-addressing table. Linear probing,
//!     multiplicative hashing of sequential keys, backward-shift deletion
//!     (no tombstones) and doubling growth.
//!   - ObjectArena<V>: public API; wraps a KeyTable in a single
//!     `parking_lot::Mutex` so every call is atomic.
//!
//! Constraints
//! - Keys start at 0, only increase, and are never reissued, even after
//!   removal or a failed insertion.
//! - Key 0 doubles as the empty-slot marker in the probe array, so its value
//!   is kept outside the array.
//! - At least one probe slot is always empty; this is what terminates probes.
//! - Growth allocates the new buffers before touching the old ones; any
//!   error leaves the table as it was.
//! - The table never shrinks.
//!
//! Concurrency
//! - One exclusive lock per arena, taken for the whole of each call and
//!   released on every exit path. No reader/writer split: lookups are short
//!   and removal rewrites probe chains.
//! - `remove` hands the value back so it is dropped outside the lock.
//!
//! Notes and non-goals
//! - No persistence or serialization; the arena is purely in memory.
//! - Values are opaque to the arena. Nullable handles are modeled by the
//!   caller as `ObjectArena<Option<T>>`.
//! - Exhausting the 32-bit key space returns `ArenaError::KeysExhausted`
//!   rather than wrapping.

mod config;
mod error;
mod key;
#[cfg(feature = "bench_internal")]
pub mod key_table;
#[cfg(not(feature = "bench_internal"))]
mod key_table;
mod key_table_proptest;
mod object_arena;

// Public surface
pub use config::{
    ArenaConfig, DEFAULT_EXPECTED_ELEMENTS, DEFAULT_LOAD_FACTOR, MAX_HASH_ARRAY_LENGTH,
    MAX_LOAD_FACTOR, MIN_LOAD_FACTOR,
};
pub use error::ArenaError;
pub use key::Key;
pub use object_arena::ObjectArena;
