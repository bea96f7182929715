//! ObjectArena: thread-safe public surface over `KeyTable`.

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::key::Key;
use crate::key_table::KeyTable;
use core::fmt;
use parking_lot::Mutex;

/// Stores objects and hands back auto-assigned integer keys for them.
///
/// The intended use is a caller that can only hold a limited number of
/// references across some boundary: it keeps one reference to the arena and
/// refers to everything else by [`Key`].
///
/// Every method takes the arena's lock for its whole duration, so calls from
/// different threads are linearizable. Values that are nullable on the other
/// side of the boundary are expressed as `ObjectArena<Option<T>>`.
///
/// ```
/// use object_arena::ObjectArena;
///
/// let arena = ObjectArena::new();
/// let k1 = arena.add("x").unwrap();
/// let k2 = arena.add("y").unwrap();
/// assert_ne!(k1, k2);
/// assert_eq!(arena.get(k1).unwrap(), "x");
/// arena.remove(k1).unwrap();
/// assert!(arena.get(k1).is_err());
/// assert_eq!(arena.size(), 1);
/// ```
pub struct ObjectArena<V> {
    table: Mutex<KeyTable<V>>,
}

impl<V> ObjectArena<V> {
    /// Create an empty arena sized for 4 elements at load factor 0.75.
    pub fn new() -> Self {
        Self {
            table: Mutex::new(KeyTable::new()),
        }
    }

    pub fn with_config(config: ArenaConfig) -> Result<Self, ArenaError> {
        Ok(Self {
            table: Mutex::new(KeyTable::with_config(config)?),
        })
    }

    /// Add an object, returning the key under which it can be found.
    pub fn add(&self, value: V) -> Result<Key, ArenaError> {
        self.table.lock().insert(value)
    }

    /// Remove the object stored under `key` and hand it back.
    ///
    /// The value is dropped by the caller, after the lock is released.
    pub fn remove(&self, key: Key) -> Result<V, ArenaError> {
        self.table.lock().remove(key)
    }

    pub fn size(&self) -> usize {
        self.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }

    pub fn contains_key(&self, key: Key) -> bool {
        self.table.lock().contains_key(key)
    }

    /// Current number of probe slots.
    pub fn capacity(&self) -> usize {
        self.table.lock().capacity()
    }

    /// Snapshot of the currently assigned keys, in no particular order.
    pub fn keys(&self) -> Vec<Key> {
        self.table.lock().iter().map(|(k, _)| k).collect()
    }
}

impl<V: Clone> ObjectArena<V> {
    pub fn get(&self, key: Key) -> Result<V, ArenaError> {
        self.table.lock().get(key).cloned()
    }

    /// Store a second copy of the object under `key` and return its new key.
    ///
    /// Lookup and insertion happen under one lock acquisition; if `key` is
    /// unassigned nothing is modified.
    pub fn dup(&self, key: Key) -> Result<Key, ArenaError> {
        let mut table = self.table.lock();
        let value = table.get(key)?.clone();
        table.insert(value)
    }
}

impl<V> Default for ObjectArena<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for ObjectArena<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.lock();
        f.debug_struct("ObjectArena")
            .field("size", &table.len())
            .field("capacity", &table.capacity())
            .finish()
    }
}
