//! KeyTable: single-threaded open-addressing map from arena keys to values.
//!
//! Layout
//! - `keys[i] == 0` marks an empty probe slot; any other value is a live key.
//! - `values[i]` is `Some` exactly when `keys[i] != 0`.
//! - Key 0 never enters the probe arrays. Its value lives in `zero`, which
//!   doubles as the "zero key assigned" flag.
//!
//! Probe invariant
//! - Linear probing from `hash_key(k) & mask` reaches `k` before any empty
//!   slot. Removal keeps this true by shifting later entries back into the
//!   gap instead of leaving tombstones.
//! - `assigned <= resize_at <= capacity - 1`, so at least one slot is always
//!   empty and every probe loop terminates.

use crate::config::{self, ArenaConfig, MAX_HASH_ARRAY_LENGTH};
use crate::error::ArenaError;
use crate::key::{hash_key, Key};
use log::{debug, trace, warn};

pub struct KeyTable<V> {
    keys: Vec<i32>,
    values: Vec<Option<V>>,
    zero: Option<V>,
    mask: usize,
    /// Occupied probe slots; the zero key is not counted.
    assigned: usize,
    /// Grow when `assigned` reaches this on a nonzero insertion.
    resize_at: usize,
    /// Key issued by the next successful insertion. Wider than a key so the
    /// end of the key space is detectable.
    next_key: i64,
    load_factor: f64,
    max_capacity: usize,
}

/// Iterator over the live entries of a `KeyTable`, zero key first.
pub struct Iter<'a, V> {
    zero: Option<&'a V>,
    slots: core::iter::Zip<core::slice::Iter<'a, i32>, core::slice::Iter<'a, Option<V>>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (Key, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(v) = self.zero.take() {
            return Some((Key::from_raw(0), v));
        }
        self.slots.find_map(|(&k, v)| match v {
            Some(v) if k != 0 => Some((Key::from_raw(k), v)),
            _ => None,
        })
    }
}

impl<V> KeyTable<V> {
    /// Empty table sized for the default configuration.
    pub fn new() -> Self {
        // The defaults are in range, so sizing cannot fail.
        let capacity = config::min_buffer_size(
            config::DEFAULT_EXPECTED_ELEMENTS,
            config::DEFAULT_LOAD_FACTOR,
        )
        .unwrap_or(config::MIN_HASH_ARRAY_LENGTH);
        let (keys, values) = fresh_buffers(capacity);
        Self {
            keys,
            values,
            zero: None,
            mask: capacity - 1,
            assigned: 0,
            resize_at: config::expand_at_count(capacity, config::DEFAULT_LOAD_FACTOR),
            next_key: 0,
            load_factor: config::DEFAULT_LOAD_FACTOR,
            max_capacity: MAX_HASH_ARRAY_LENGTH,
        }
    }

    pub fn with_config(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let capacity = config.initial_buffer_size()?;
        let (keys, values) = try_alloc_buffers(capacity)?;
        let load_factor = config.load_factor();
        debug!(
            "key table sized for {} elements: {} slots, load factor {}",
            config.expected_elements(),
            capacity,
            load_factor
        );
        Ok(Self {
            keys,
            values,
            zero: None,
            mask: capacity - 1,
            assigned: 0,
            resize_at: config::expand_at_count(capacity, load_factor),
            next_key: 0,
            load_factor,
            max_capacity: MAX_HASH_ARRAY_LENGTH,
        })
    }

    /// Lower the growth ceiling so capacity failures can be provoked.
    #[cfg(test)]
    pub(crate) fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    pub fn len(&self) -> usize {
        self.assigned + usize::from(self.zero.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of probe slots (excluding the zero key's slot).
    pub fn capacity(&self) -> usize {
        self.mask + 1
    }

    pub fn contains_key(&self, key: Key) -> bool {
        if key.is_zero() {
            self.zero.is_some()
        } else {
            self.find_slot(key.get()).is_some()
        }
    }

    /// Store `value` under a fresh key.
    ///
    /// The key counter only advances when the value has been stored, so a
    /// failed growth does not burn a key.
    pub fn insert(&mut self, value: V) -> Result<Key, ArenaError> {
        let raw = i32::try_from(self.next_key).map_err(|_| ArenaError::KeysExhausted)?;
        if raw == 0 {
            debug_assert!(self.zero.is_none());
            self.zero = Some(value);
        } else if self.assigned == self.resize_at {
            self.grow_then_insert(raw, value)?;
            self.assigned += 1;
        } else {
            let slot = probe_empty(&self.keys, self.mask, raw);
            self.keys[slot] = raw;
            self.values[slot] = Some(value);
            self.assigned += 1;
        }
        self.next_key += 1;
        Ok(Key::from_raw(raw))
    }

    pub fn get(&self, key: Key) -> Result<&V, ArenaError> {
        let found = if key.is_zero() {
            self.zero.as_ref()
        } else {
            self.find_slot(key.get())
                .and_then(|slot| self.values[slot].as_ref())
        };
        found.ok_or(ArenaError::UnassignedKey { key })
    }

    /// Remove the entry for `key`, returning its value.
    pub fn remove(&mut self, key: Key) -> Result<V, ArenaError> {
        if key.is_zero() {
            return self.zero.take().ok_or(ArenaError::UnassignedKey { key });
        }
        let slot = self
            .find_slot(key.get())
            .ok_or(ArenaError::UnassignedKey { key })?;
        Ok(self.shift_conflicting_keys(slot))
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            zero: self.zero.as_ref(),
            slots: self.keys.iter().zip(self.values.iter()),
        }
    }

    fn find_slot(&self, raw: i32) -> Option<usize> {
        let mask = self.mask;
        let mut slot = hash_key(raw) as usize & mask;
        loop {
            match self.keys[slot] {
                0 => return None,
                existing if existing == raw => return Some(slot),
                _ => slot = (slot + 1) & mask,
            }
        }
    }

    /// Double the probe table, migrate every entry, then place the pending one.
    ///
    /// Both new buffers are allocated before the old ones are touched, so an
    /// error leaves the table exactly as it was.
    fn grow_then_insert(&mut self, pending_key: i32, pending_value: V) -> Result<(), ArenaError> {
        let old_capacity = self.capacity();
        let new_capacity = old_capacity * 2;
        if new_capacity > self.max_capacity {
            warn!(
                "key table cannot grow past {} slots (requested {})",
                self.max_capacity, new_capacity
            );
            return Err(ArenaError::CapacityExceeded {
                requested: new_capacity,
                max: self.max_capacity,
            });
        }
        let (mut keys, mut values) = try_alloc_buffers(new_capacity).inspect_err(|_| {
            warn!("allocation failed while growing key table to {new_capacity} slots");
        })?;

        let mask = new_capacity - 1;
        for (&existing, value) in self.keys.iter().zip(self.values.iter_mut()) {
            if existing != 0 {
                let slot = probe_empty(&keys, mask, existing);
                keys[slot] = existing;
                values[slot] = value.take();
            }
        }
        let slot = probe_empty(&keys, mask, pending_key);
        keys[slot] = pending_key;
        values[slot] = Some(pending_value);

        self.keys = keys;
        self.values = values;
        self.mask = mask;
        self.resize_at = config::expand_at_count(new_capacity, self.load_factor);
        debug!(
            "key table grew from {} to {} slots ({} entries)",
            old_capacity,
            new_capacity,
            self.assigned + 1
        );
        Ok(())
    }

    /// Clear `gap` and pull back any later entries whose probe sequence
    /// passed through it. Returns the value that occupied `gap`.
    fn shift_conflicting_keys(&mut self, gap: usize) -> V {
        let removed = self.values[gap]
            .take()
            .expect("occupied slot always holds a value");
        let mask = self.mask;
        let mut gap = gap;
        let mut distance = 0;
        loop {
            distance += 1;
            let slot = (gap + distance) & mask;
            let existing = self.keys[slot];
            if existing == 0 {
                break;
            }
            let ideal = hash_key(existing) as usize;
            let shift = slot.wrapping_sub(ideal) & mask;
            if shift >= distance {
                // The entry's probe started at or before the gap; move it back.
                trace!("shifting key {existing} from slot {slot} to {gap}");
                self.keys[gap] = existing;
                self.values[gap] = self.values[slot].take();
                gap = slot;
                distance = 0;
            }
        }
        self.keys[gap] = 0;
        debug_assert!(self.values[gap].is_none());
        self.assigned -= 1;
        removed
    }

    /// Panics if any structural invariant is violated.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        use std::collections::HashSet;

        let capacity = self.capacity();
        assert!(capacity.is_power_of_two());
        assert_eq!(self.keys.len(), capacity);
        assert_eq!(self.values.len(), capacity);
        assert!(self.assigned <= self.resize_at);
        assert!(self.resize_at < capacity);

        let mut seen = HashSet::new();
        for (slot, (&k, v)) in self.keys.iter().zip(&self.values).enumerate() {
            if k == 0 {
                assert!(v.is_none(), "empty slot {slot} holds a value");
                continue;
            }
            assert!(v.is_some(), "slot {slot} for key {k} has no value");
            assert!(seen.insert(k), "duplicate key {k}");
            assert!(i64::from(k) < self.next_key, "key {k} not yet issued");
            assert_eq!(self.find_slot(k), Some(slot), "key {k} unreachable");
        }
        assert_eq!(seen.len(), self.assigned);
    }
}

impl<V> Default for KeyTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// First empty slot on the probe sequence of `raw`.
fn probe_empty(keys: &[i32], mask: usize, raw: i32) -> usize {
    let mut slot = hash_key(raw) as usize & mask;
    while keys[slot] != 0 {
        debug_assert_ne!(keys[slot], raw, "fresh key already present");
        slot = (slot + 1) & mask;
    }
    slot
}

fn fresh_buffers<V>(capacity: usize) -> (Vec<i32>, Vec<Option<V>>) {
    let mut values = Vec::with_capacity(capacity);
    values.resize_with(capacity, || None);
    (vec![0; capacity], values)
}

fn try_alloc_buffers<V>(capacity: usize) -> Result<(Vec<i32>, Vec<Option<V>>), ArenaError> {
    let exceeded = |_| ArenaError::CapacityExceeded {
        requested: capacity,
        max: MAX_HASH_ARRAY_LENGTH,
    };
    let mut keys = Vec::new();
    keys.try_reserve_exact(capacity).map_err(exceeded)?;
    let mut values = Vec::new();
    values.try_reserve_exact(capacity).map_err(exceeded)?;
    keys.resize(capacity, 0);
    values.resize_with(capacity, || None);
    Ok((keys, values))
}
