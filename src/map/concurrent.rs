//! Concurrent HashMap Implementation
//!
//! An open-addressing hash map with linear probing. Lookups, inserts,
//! overwrites and deletes are lock-free; only growth takes an exclusive lock.
//!
//! ## Design
//!
//! - Each slot is a single atomic pointer to an entry. A null slot is empty;
//!   a non-null slot is occupied, and the key it points to never changes.
//!   Publishing the entry with one CAS means a reader can never see an
//!   occupied slot with a half-written key.
//! - Each entry holds its value behind a second atomic pointer. Delete swaps
//!   the value to null (a tombstone) and leaves the slot occupied, so probe
//!   chains of other keys stay intact.
//! - `size` counts occupied slots, not live values. It only shrinks when a
//!   grow drops tombstones.
//! - Every operation snapshots `capacity` and re-checks it after each slot
//!   read. A change means a grow published a new table; the operation
//!   restarts against it.
//!
//! ## Growth
//!
//! Growth runs under `resize_lock`:
//!
//! ```text
//! 1. allocate a table of the new capacity
//! 2. freeze the old table
//!      empty slot      CAS null -> null|FROZEN    (no more claims)
//!      tombstone       CAS null -> null|FROZEN    (no more revivals)
//!      live entry      carried by pointer into the new table
//! 3. publish the new table, then the new capacity
//! 4. retire the old table and the frozen tombstones
//! ```
//!
//! A writer that meets a frozen slot or value waits on `resize_lock` and
//! retries. Carried entries are shared by both tables, so a value written
//! through the old table mid-grow is also the value in the new one.
//!
//! ## Memory Reclamation
//!
//! Replaced values, dropped tombstones and retired tables are freed through
//! `crossbeam-epoch` once no pinned thread can still be reading them.
//!
//! ## Example
//!
//! ```rust
//! use atomkit::map::ConcurrentHashMap;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let map = Arc::new(ConcurrentHashMap::with_capacity(4));
//!
//! let writers: Vec<_> = [(1, "a"), (2, "b")]
//!     .into_iter()
//!     .map(|(key, value)| {
//!         let map = Arc::clone(&map);
//!         thread::spawn(move || map.set(key, value))
//!     })
//!     .collect();
//! for writer in writers {
//!     writer.join().unwrap()?;
//! }
//!
//! assert_eq!(map.get(&1), Some("a"));
//! assert_eq!(map.get(&2), Some("b"));
//! assert_eq!(map.size(), 2);
//! # Ok::<(), atomkit::Error>(())
//! ```

use crate::map::config::{MapConfig, DEFAULT_CAPACITY};
use crate::metrics::{AtomicMetrics, ContentionMetrics, MetricsCollector};
use crate::{Error, Result};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};
use core::sync::atomic::{AtomicUsize, Ordering};
use crossbeam_epoch::{self as epoch, Atomic, Guard, Owned, Shared};
use crossbeam_utils::CachePadded;
use fxhash::FxBuildHasher;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

/// Tag on a null slot or null value that a grow has sealed.
const FROZEN: usize = 1;

struct Entry<K, V> {
    key: K,
    value: Atomic<Value<V>>,
}

// Alignment leaves the low pointer bit free for the freeze tag.
#[repr(align(2))]
struct Value<V> {
    inner: V,
}

struct Table<K, V> {
    slots: Box<[Atomic<Entry<K, V>>]>,
    // Occupied slots in this table.
    size: AtomicUsize,
}

impl<K, V> Table<K, V> {
    fn allocate(capacity: usize) -> Result<Self> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| Error::AllocationFailed {
                requested: capacity,
            })?;
        slots.resize_with(capacity, Atomic::null);

        Ok(Self {
            slots: slots.into_boxed_slice(),
            size: AtomicUsize::new(0),
        })
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }
}

enum Probe<'g, K, V> {
    /// Occupied slot holding the key
    Found(&'g Entry<K, V>),
    /// First empty slot on the probe path
    Vacant(usize),
    /// First empty slot on the probe path is sealed by a grow
    Frozen,
    /// Every slot is occupied by other keys
    Exhausted,
    /// Capacity changed mid-probe
    Stale,
}

/// A concurrent hash map with lock-free get, set and delete
///
/// # Type Parameters
///
/// * `K` - Key type, compared structurally with `Eq`
/// * `V` - Value type; `get` hands out clones
/// * `S` - Hash builder mapping a key to its home slot, `fxhash` by default
///
/// # Examples
///
/// ```rust
/// use atomkit::map::ConcurrentHashMap;
///
/// let map: ConcurrentHashMap<&str, u32> = ConcurrentHashMap::new();
/// map.set("requests", 1)?;
/// map.set("requests", 2)?;
/// assert_eq!(map.get("requests"), Some(2));
///
/// assert!(map.delete("requests"));
/// assert_eq!(map.get("requests"), None);
/// assert_eq!(map.size(), 1); // the slot stays allocated
/// # Ok::<(), atomkit::Error>(())
/// ```
pub struct ConcurrentHashMap<K, V, S = FxBuildHasher> {
    table: CachePadded<Atomic<Table<K, V>>>,
    capacity: CachePadded<AtomicUsize>,
    resize_lock: Mutex<()>,
    hash_builder: S,
    load_factor: f64,
    metrics: AtomicMetrics,
}

impl<K, V> ConcurrentHashMap<K, V, FxBuildHasher> {
    /// Create a map with 32 slots
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a map with `capacity` slots
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0 or the slot table cannot be allocated. Use
    /// [`try_with_capacity`](Self::try_with_capacity) to handle those cases.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use atomkit::map::ConcurrentHashMap;
    ///
    /// let map: ConcurrentHashMap<u64, u64> = ConcurrentHashMap::with_capacity(100);
    /// assert_eq!(map.capacity(), 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::try_with_capacity(capacity) {
            Ok(map) => map,
            Err(err) => panic!("cannot create map with capacity {}: {}", capacity, err),
        }
    }

    /// Create a map with `capacity` slots, reporting bad sizes as errors
    ///
    /// ```rust
    /// use atomkit::{map::ConcurrentHashMap, Error};
    ///
    /// let map = ConcurrentHashMap::<u8, u8>::try_with_capacity(0);
    /// assert_eq!(map.err(), Some(Error::ZeroCapacity));
    /// ```
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        Self::with_config(MapConfig::new().with_initial_capacity(capacity))
    }

    /// Create a map from a validated [`MapConfig`]
    pub fn with_config(config: MapConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, FxBuildHasher::default())
    }
}

impl<K, V, S> ConcurrentHashMap<K, V, S> {
    /// Create a map from a [`MapConfig`] with a custom hash builder
    ///
    /// The hash builder must be deterministic for the lifetime of the map:
    /// every thread has to agree on a key's home slot for a given capacity.
    pub fn with_config_and_hasher(config: MapConfig, hash_builder: S) -> Result<Self> {
        config.validate()?;
        let table = Table::allocate(config.initial_capacity)?;

        Ok(Self {
            table: CachePadded::new(Atomic::new(table)),
            capacity: CachePadded::new(AtomicUsize::new(config.initial_capacity)),
            resize_lock: Mutex::new(()),
            hash_builder,
            load_factor: config.load_factor,
            metrics: AtomicMetrics::default(),
        })
    }

    /// Number of slots in the current table
    pub fn capacity(&self) -> usize {
        self.capacity.load(Ordering::Acquire)
    }

    /// Number of occupied slots, live or tombstoned
    ///
    /// Deleting a key does not change the size; growing the map drops
    /// tombstones and recounts.
    pub fn size(&self) -> usize {
        let guard = &epoch::pin();
        let (_, table) = self.snapshot(guard);
        table.size.load(Ordering::Acquire)
    }

    /// Whether no slot has been claimed
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Load the current table together with a capacity that matches it
    fn snapshot<'g>(&self, guard: &'g Guard) -> (usize, &'g Table<K, V>) {
        loop {
            let capacity = self.capacity.load(Ordering::Acquire);
            // Safety: the table pointer is never null, and a retired table is
            // only freed after every guard pinned before its retirement is gone.
            let table = unsafe { self.table.load(Ordering::Acquire, guard).deref() };
            if table.capacity() == capacity {
                return (capacity, table);
            }
            // A grow stored the new table but not yet its capacity.
            core::hint::spin_loop();
        }
    }

    fn capacity_changed(&self, capacity: usize) -> bool {
        self.capacity.load(Ordering::Acquire) != capacity
    }

    fn wait_for_resize(&self) {
        self.metrics.record_help();
        drop(self.resize_lock.lock());
    }
}

impl<K, V, S> ConcurrentHashMap<K, V, S>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Send + Sync + 'static,
    S: BuildHasher,
{
    /// Look up a key, returning a clone of its value
    ///
    /// Returns `None` for keys never set and for deleted keys.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.read(key, V::clone)
    }

    /// Whether the key currently has a value
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read(key, |_| ()).is_some()
    }

    /// Set `key` to `value`, inserting or overwriting
    ///
    /// A new key claims the first empty slot on its probe path. Claiming may
    /// push the map past its load factor, which grows it before returning;
    /// a probe that finds no empty slot at all grows the map and retries.
    ///
    /// # Errors
    ///
    /// [`Error::CapacityOverflow`] or [`Error::AllocationFailed`] when the map
    /// is full and cannot grow. The value is not stored in that case.
    pub fn set(&self, key: K, value: V) -> Result<()> {
        let timer = self.metrics.start();
        let mut key = key;
        let mut value = Owned::new(Value { inner: value });

        loop {
            let guard = epoch::pin();
            let (capacity, table) = self.snapshot(&guard);

            match self.probe(table, capacity, &key, &guard) {
                Probe::Stale => self.metrics.record_retry(),
                Probe::Found(entry) => match self.replace_value(entry, value, &guard) {
                    None => {
                        self.metrics.record_success(timer);
                        return Ok(());
                    }
                    Some(rejected) => {
                        value = rejected;
                        drop(guard);
                        self.wait_for_resize();
                    }
                },
                Probe::Vacant(index) => {
                    let entry = Owned::new(Entry {
                        key,
                        value: Atomic::from(value),
                    });

                    match table.slots[index].compare_exchange(
                        Shared::null(),
                        entry,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                        &guard,
                    ) {
                        Ok(_) => {
                            let size = table.size.fetch_add(1, Ordering::AcqRel) + 1;
                            drop(guard);

                            if self.over_load_factor(size, capacity) {
                                // The value is already stored. If this grow
                                // fails, the next set that finds the table
                                // full reports it.
                                if let Err(err) = self.grow_from(capacity) {
                                    warn!(%err, capacity, "load-factor grow failed");
                                }
                            }
                            self.metrics.record_success(timer);
                            return Ok(());
                        }
                        Err(err) => {
                            let frozen = err.current.tag() == FROZEN;
                            (key, value) = Self::unpublish(err.new);
                            self.metrics.record_retry();
                            if frozen {
                                drop(guard);
                                self.wait_for_resize();
                            }
                        }
                    }
                }
                Probe::Frozen => {
                    drop(guard);
                    self.wait_for_resize();
                }
                Probe::Exhausted => {
                    drop(guard);
                    trace!(capacity, "probe found no empty slot, growing");
                    self.grow_from(capacity)?;
                }
            }
        }
    }

    /// Delete a key's value, leaving its slot allocated
    ///
    /// Returns `true` only if this call removed a live value. Deleting an
    /// absent key, or one that is already tombstoned, returns `false` even
    /// though a tombstoned key still holds its slot; use
    /// [`contains_key`](Self::contains_key) for "has a value", not "has a
    /// slot". [`size`](Self::size) is unaffected.
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let timer = self.metrics.start();
        let guard = &epoch::pin();

        loop {
            let (capacity, table) = self.snapshot(guard);

            match self.probe(table, capacity, key, guard) {
                Probe::Stale => self.metrics.record_retry(),
                Probe::Found(entry) => {
                    if self.clear_value(entry, guard) {
                        self.metrics.record_success(timer);
                        return true;
                    }
                    // A frozen tombstone may have been revived in a newer table.
                    if self.capacity_changed(capacity) {
                        self.metrics.record_retry();
                        continue;
                    }
                    self.metrics.record_empty(timer);
                    return false;
                }
                Probe::Vacant(_) | Probe::Frozen | Probe::Exhausted => {
                    self.metrics.record_empty(timer);
                    return false;
                }
            }
        }
    }

    /// Grow the table to `new_capacity` slots
    ///
    /// Rehashes every live entry under the resize lock and drops tombstones.
    /// Requests at or below the current capacity do nothing, since capacity
    /// never shrinks.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use atomkit::map::ConcurrentHashMap;
    ///
    /// let map = ConcurrentHashMap::with_capacity(4);
    /// map.set(1, 10)?;
    /// map.grow(16)?;
    /// assert_eq!(map.capacity(), 16);
    /// assert_eq!(map.get(&1), Some(10));
    ///
    /// map.grow(8)?; // no-op
    /// assert_eq!(map.capacity(), 16);
    /// # Ok::<(), atomkit::Error>(())
    /// ```
    pub fn grow(&self, new_capacity: usize) -> Result<()> {
        let _resize = self.resize_lock.lock();
        let current = self.capacity.load(Ordering::Acquire);
        if new_capacity <= current {
            return Ok(());
        }
        self.rehash(current, new_capacity)
    }

    /// Visit every live entry of the current table
    ///
    /// Weakly consistent: entries set or deleted during the walk may or may
    /// not be seen, but no key is visited twice.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        let guard = &epoch::pin();
        let (_, table) = self.snapshot(guard);

        for slot in table.slots.iter() {
            // Safety: entries and values are reclaimed through the epoch.
            let Some(entry) = (unsafe { slot.load(Ordering::Acquire, guard).as_ref() }) else {
                continue;
            };
            if let Some(value) = unsafe { entry.value.load(Ordering::Acquire, guard).as_ref() } {
                f(&entry.key, &value.inner);
            }
        }
    }

    fn read<Q, R, F>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> R,
    {
        let timer = self.metrics.start();
        let guard = &epoch::pin();

        loop {
            let (capacity, table) = self.snapshot(guard);

            let entry = match self.probe(table, capacity, key, guard) {
                Probe::Stale => {
                    self.metrics.record_retry();
                    continue;
                }
                Probe::Found(entry) => entry,
                Probe::Vacant(_) | Probe::Frozen | Probe::Exhausted => {
                    self.metrics.record_empty(timer);
                    return None;
                }
            };

            let value = entry.value.load(Ordering::Acquire, guard);
            if self.capacity_changed(capacity) {
                self.metrics.record_retry();
                continue;
            }

            // Safety: replaced values are retired through the epoch.
            return match unsafe { value.as_ref() } {
                Some(value) => {
                    self.metrics.record_success(timer);
                    Some(f(&value.inner))
                }
                None => {
                    self.metrics.record_empty(timer);
                    None
                }
            };
        }
    }

    fn slot_index<Q: Hash + ?Sized>(&self, key: &Q, capacity: usize) -> usize {
        let mut hasher = self.hash_builder.build_hasher();
        key.hash(&mut hasher);
        (hasher.finish() % capacity as u64) as usize
    }

    fn probe<'g, Q>(
        &self,
        table: &'g Table<K, V>,
        capacity: usize,
        key: &Q,
        guard: &'g Guard,
    ) -> Probe<'g, K, V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let start = self.slot_index(key, capacity);

        for i in 0..capacity {
            let index = (start + i) % capacity;
            let slot = table.slots[index].load(Ordering::Acquire, guard);
            if self.capacity_changed(capacity) {
                return Probe::Stale;
            }

            // Safety: entries outlive every guard pinned while they were reachable.
            match unsafe { slot.as_ref() } {
                None if slot.tag() == FROZEN => return Probe::Frozen,
                None => return Probe::Vacant(index),
                Some(entry) if Borrow::<Q>::borrow(&entry.key) == key => return Probe::Found(entry),
                Some(_) => {}
            }
        }

        Probe::Exhausted
    }

    /// CAS a new value into an entry; hands the value back if the entry is frozen
    fn replace_value<'g>(
        &self,
        entry: &'g Entry<K, V>,
        value: Owned<Value<V>>,
        guard: &'g Guard,
    ) -> Option<Owned<Value<V>>> {
        let mut value = value;
        let mut current = entry.value.load(Ordering::Acquire, guard);

        loop {
            if current.tag() == FROZEN {
                return Some(value);
            }

            match entry.value.compare_exchange(
                current,
                value,
                Ordering::AcqRel,
                Ordering::Acquire,
                guard,
            ) {
                Ok(_) => {
                    if !current.is_null() {
                        // Safety: the old value is unreachable from the map now.
                        unsafe { guard.defer_destroy(current) };
                    }
                    return None;
                }
                Err(err) => {
                    current = err.current;
                    value = err.new;
                    self.metrics.record_retry();
                }
            }
        }
    }

    /// Tombstone an entry; `false` if it had no value
    fn clear_value<'g>(&self, entry: &'g Entry<K, V>, guard: &'g Guard) -> bool {
        let mut current = entry.value.load(Ordering::Acquire, guard);

        loop {
            // Covers frozen tombstones as well.
            if current.is_null() {
                return false;
            }

            match entry.value.compare_exchange(
                current,
                Shared::null(),
                Ordering::AcqRel,
                Ordering::Acquire,
                guard,
            ) {
                Ok(_) => {
                    // Safety: the old value is unreachable from the map now.
                    unsafe { guard.defer_destroy(current) };
                    return true;
                }
                Err(err) => {
                    current = err.current;
                    self.metrics.record_retry();
                }
            }
        }
    }

    fn unpublish(entry: Owned<Entry<K, V>>) -> (K, Owned<Value<V>>) {
        let Entry { key, value } = *entry.into_box();
        // Safety: the entry lost its claim, so its value was never shared.
        (key, unsafe { value.into_owned() })
    }

    fn over_load_factor(&self, size: usize, capacity: usize) -> bool {
        size as f64 > capacity as f64 * self.load_factor
    }

    /// Double the table unless someone already grew it past `observed`
    fn grow_from(&self, observed: usize) -> Result<()> {
        let _resize = self.resize_lock.lock();
        if self.capacity.load(Ordering::Acquire) != observed {
            return Ok(());
        }

        self.rehash(observed, Self::doubled(observed)?)
    }

    fn doubled(capacity: usize) -> Result<usize> {
        capacity.checked_mul(2).ok_or_else(|| {
            warn!(capacity, "doubling the slot table overflows usize");
            Error::CapacityOverflow { current: capacity }
        })
    }

    /// Move every live entry into a fresh table. Caller holds `resize_lock`.
    fn rehash(&self, old_capacity: usize, new_capacity: usize) -> Result<()> {
        let new_table = match Table::allocate(new_capacity) {
            Ok(table) => table,
            Err(err) => {
                warn!(old_capacity, new_capacity, "slot table allocation failed");
                return Err(err);
            }
        };

        let guard = &epoch::pin();
        let old_shared = self.table.load(Ordering::Acquire, guard);
        // Safety: only the lock holder replaces the table.
        let old_table = unsafe { old_shared.deref() };
        let mut carried = 0;

        for slot in old_table.slots.iter() {
            let Some(entry) = Self::freeze_slot(slot, guard) else {
                continue;
            };
            // Safety: non-null slots point at live entries.
            if Self::freeze_tombstone(unsafe { entry.deref() }, guard) {
                // Safety: the frozen tombstone is not carried, so nothing new can reach it.
                unsafe { guard.defer_destroy(entry) };
            } else {
                self.place(&new_table, entry, guard);
                carried += 1;
            }
        }

        new_table.size.store(carried, Ordering::Relaxed);
        self.table.store(Owned::new(new_table), Ordering::Release);
        self.capacity.store(new_capacity, Ordering::Release);

        // Safety: the old table is unpublished; live entries it pointed at
        // are owned by the new table, and dropping the slot array does not
        // touch them.
        unsafe { guard.defer_destroy(old_shared) };

        self.metrics.record_resize();
        debug!(old_capacity, new_capacity, carried, "grew slot table");
        Ok(())
    }

    /// Seal an empty slot, or return the entry that occupies it
    fn freeze_slot<'g>(
        slot: &Atomic<Entry<K, V>>,
        guard: &'g Guard,
    ) -> Option<Shared<'g, Entry<K, V>>> {
        let frozen = Shared::null().with_tag(FROZEN);
        match slot.compare_exchange(
            Shared::null(),
            frozen,
            Ordering::AcqRel,
            Ordering::Acquire,
            guard,
        ) {
            Ok(_) => None,
            Err(err) => (!err.current.is_null()).then_some(err.current),
        }
    }

    /// Seal a tombstone against revival; `false` if the entry is live
    fn freeze_tombstone(entry: &Entry<K, V>, guard: &Guard) -> bool {
        let frozen = Shared::null().with_tag(FROZEN);
        let mut current = entry.value.load(Ordering::Acquire, guard);

        loop {
            if !current.is_null() {
                return false;
            }
            match entry.value.compare_exchange(
                current,
                frozen,
                Ordering::AcqRel,
                Ordering::Acquire,
                guard,
            ) {
                Ok(_) => return true,
                Err(err) => current = err.current,
            }
        }
    }

    /// Insert a carried entry into an unpublished table
    fn place(&self, table: &Table<K, V>, entry: Shared<'_, Entry<K, V>>, guard: &Guard) {
        let capacity = table.capacity();
        // Safety: the caller passes a live, carried entry.
        let start = self.slot_index(unsafe { &entry.deref().key }, capacity);

        let vacant = (0..capacity)
            .map(|i| &table.slots[(start + i) % capacity])
            .find(|slot| slot.load(Ordering::Relaxed, guard).is_null());

        // The new table is larger than the old one, so there is always room.
        debug_assert!(vacant.is_some(), "no room while rehashing");
        if let Some(slot) = vacant {
            slot.store(entry, Ordering::Relaxed);
        }
    }
}

impl<K, V> Default for ConcurrentHashMap<K, V, FxBuildHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> fmt::Debug for ConcurrentHashMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentHashMap")
            .field("capacity", &self.capacity())
            .field("size", &self.size())
            .field("load_factor", &self.load_factor)
            .finish_non_exhaustive()
    }
}

impl<K, V, S> Drop for ConcurrentHashMap<K, V, S> {
    fn drop(&mut self) {
        // Safety: `&mut self` means no other thread can reach the table. The
        // current table is never frozen, so every value pointer is untagged.
        unsafe {
            let guard = epoch::unprotected();
            let table = self.table.load(Ordering::Relaxed, guard);

            for slot in table.deref().slots.iter() {
                let entry = slot.load(Ordering::Relaxed, guard);
                if entry.is_null() {
                    continue;
                }
                let entry = entry.into_owned();
                let value = entry.value.load(Ordering::Relaxed, guard);
                if !value.is_null() {
                    drop(value.into_owned());
                }
            }

            drop(table.into_owned());
        }
    }
}

impl<K, V, S> MetricsCollector for ConcurrentHashMap<K, V, S> {
    fn metrics(&self) -> ContentionMetrics {
        self.metrics.snapshot()
    }

    fn reset_metrics(&self) {
        self.metrics.reset();
    }

    fn set_metrics_enabled(&self, enabled: bool) {
        self.metrics.set_enabled(enabled);
    }

    fn is_metrics_enabled(&self) -> bool {
        self.metrics.is_enabled()
    }
}
