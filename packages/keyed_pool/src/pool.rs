use std::any::type_name;
use std::fmt;

use foldhash::{HashMap, HashMapExt};
use nm::Event;
use tracing::{debug, trace, warn};

use crate::metrics::{CONSTRUCTION_FAILURES, DECAYS, EVICTIONS, HITS, MISSES};
use crate::slot::{Slot, coldest};
use crate::{
    ConstructorError, Error, KeyedPoolBuilder, PoolKey, ResourceConfig, Result, ScorePolicy,
};

/// A bounded pool of expensive resources, indexed by a caller-derived [`PoolKey`].
///
/// The pool holds at most [`capacity()`][1] resources, one per slot. Requesting a key that
/// is already present reuses the existing resource. Requesting a new key either fills a
/// vacant slot or, when the pool is full, replaces the resource with the lowest hit score.
///
/// # Eviction scoring
///
/// Each slot carries a floating-point hit score, governed by the pool's [`ScorePolicy`]:
///
/// * A hit adds the hit boost (default 5.0) to the slot that was hit.
/// * A newly constructed resource starts at 0.
/// * Every call that leaves the pool full subtracts the full penalty (default 1.0) from every
///   slot, so resources that are not being hit drift downward.
/// * Every decay period (default 500 calls), all scores are divided by the period length,
///   which keeps scores from growing without bound.
///
/// When a new key arrives at a full pool, the slot with the lowest score is evicted. Ties go
/// to the slot with the lowest index.
///
/// # Borrowing
///
/// [`acquire()`][2] returns an exclusive borrow of the resource. The borrow ends before the
/// next call to `acquire()`, so a resource can never be used after it has been evicted. If
/// resources must outlive a later `acquire()`, use [`SyncKeyedPool`][crate::SyncKeyedPool],
/// which hands out shared handles.
///
/// # Example
///
/// ```
/// use keyed_pool::{KeyedPool, PoolKey};
///
/// let mut pool = KeyedPool::<String>::builder().capacity(2).build();
///
/// let key = PoolKey::from_dimensions(640, 480);
///
/// let resource = pool
///     .acquire(key, |_| Ok::<_, std::io::Error>("decoder for 640x480".to_string()))
///     .unwrap();
/// assert_eq!(resource, "decoder for 640x480");
///
/// // The second request for the same key reuses the resource.
/// let resource = pool
///     .acquire(key, |_| -> Result<String, std::io::Error> { unreachable!() })
///     .unwrap();
/// assert_eq!(resource, "decoder for 640x480");
/// ```
///
/// # Thread safety
///
/// This type is thread-mobile ([`Send`]) if `R` is, but every operation requires exclusive
/// access. For shared use from multiple threads, use [`SyncKeyedPool`][crate::SyncKeyedPool].
///
/// [1]: Self::capacity
/// [2]: Self::acquire
pub struct KeyedPool<R> {
    /// Fixed-length slot table. Occupied slots always correspond 1:1 to `key_to_slot` entries.
    slots: Vec<Slot<R>>,

    key_to_slot: HashMap<PoolKey, usize>,

    /// Successful `acquire()` calls since the last decay. Always below the decay period.
    calls_since_decay: u16,

    policy: ScorePolicy,
    resource_config: ResourceConfig,
}

impl<R> KeyedPool<R> {
    pub(crate) fn new_inner(
        capacity: usize,
        policy: ScorePolicy,
        resource_config: ResourceConfig,
    ) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, Slot::empty);

        Self {
            slots,
            key_to_slot: HashMap::with_capacity(capacity),
            calls_since_decay: 0,
            policy,
            resource_config,
        }
    }

    /// Creates a new [`KeyedPool`] with the default configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use keyed_pool::KeyedPool;
    ///
    /// let pool = KeyedPool::<u64>::new();
    ///
    /// assert_eq!(pool.capacity(), 20);
    /// assert!(pool.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a new [`KeyedPool`].
    ///
    /// Use this when you want to customize the pool configuration beyond the defaults.
    pub fn builder() -> KeyedPoolBuilder<R> {
        KeyedPoolBuilder::new()
    }

    /// Returns the resource for `key`, constructing it if the key is not in the pool.
    ///
    /// The constructor is only called on a miss. It receives the pool's [`ResourceConfig`].
    /// If the pool is full, the resource with the lowest hit score is dropped before the
    /// constructor runs, so the pool never holds more than [`capacity()`][Self::capacity]
    /// resources, even momentarily.
    ///
    /// # Errors
    ///
    /// * [`Error::ZeroCapacity`] if the pool has no slots. The constructor is not called.
    /// * [`Error::Construction`] if the constructor fails. If a resource was evicted to make
    ///   room, it stays evicted and its slot stays empty. No other score changes and the call
    ///   does not count toward the decay period.
    ///
    /// # Example
    ///
    /// ```
    /// use keyed_pool::{KeyedPool, PoolKey};
    ///
    /// let mut pool = KeyedPool::<u16>::builder().capacity(1).build();
    ///
    /// let device = *pool
    ///     .acquire(PoolKey::new(100), |config| {
    ///         Ok::<_, std::io::Error>(config.device_id())
    ///     })
    ///     .unwrap();
    ///
    /// assert_eq!(device, 0);
    /// ```
    pub fn acquire<F, E>(&mut self, key: PoolKey, constructor: F) -> Result<&mut R>
    where
        F: FnOnce(&ResourceConfig) -> std::result::Result<R, E>,
        E: Into<ConstructorError>,
    {
        if self.slots.is_empty() {
            return Err(Error::ZeroCapacity);
        }

        let index = if let Some(&index) = self.key_to_slot.get(&key) {
            self.record_hit(key, index);
            index
        } else {
            self.construct_into_slot(key, constructor)?
        };

        if self.is_full() {
            let penalty = self.policy.full_penalty();
            for slot in &mut self.slots {
                slot.penalize(penalty);
            }
        }

        self.advance_decay_clock();

        Ok(self
            .slots
            .get_mut(index)
            .and_then(Slot::resource_mut)
            .expect("key map only points at occupied slots within the slot table"))
    }

    fn record_hit(&mut self, key: PoolKey, index: usize) {
        HITS.with(Event::observe_once);

        let boost = self.policy.hit_boost();
        let slot = self
            .slots
            .get_mut(index)
            .expect("key map only points at slots within the slot table");
        slot.boost(boost);

        trace!(%key, index, hit_score = slot.hit_score(), "keyed pool hit");
    }

    /// Constructs a resource for `key` in a vacant slot or in place of the coldest resource.
    ///
    /// The coldest resource is dropped before the constructor runs, so at most `capacity`
    /// resources exist at any time. If construction fails, its slot stays empty.
    fn construct_into_slot<F, E>(&mut self, key: PoolKey, constructor: F) -> Result<usize>
    where
        F: FnOnce(&ResourceConfig) -> std::result::Result<R, E>,
        E: Into<ConstructorError>,
    {
        MISSES.with(Event::observe_once);

        let index = self
            .slots
            .iter()
            .position(Slot::is_empty)
            .or_else(|| coldest(&self.slots))
            .expect("slot table is not empty, so there is always a vacant or coldest slot");

        let slot = self
            .slots
            .get_mut(index)
            .expect("chosen slot index is within the slot table");

        if let Some((evicted_key, evicted)) = slot.vacate() {
            self.key_to_slot.remove(&evicted_key);
            drop(evicted);

            EVICTIONS.with(Event::observe_once);
            debug!(%key, %evicted_key, index, "evicted pooled resource");
        }

        let resource = match constructor(&self.resource_config) {
            Ok(resource) => resource,
            Err(source) => {
                CONSTRUCTION_FAILURES.with(Event::observe_once);

                let source: ConstructorError = source.into();
                warn!(%key, index, error = %source, "failed to construct pooled resource");

                return Err(Error::Construction { key, source });
            }
        };

        self.slots
            .get_mut(index)
            .expect("chosen slot index is within the slot table")
            .fill(key, resource);

        self.key_to_slot.insert(key, index);
        debug!(%key, index, "constructed pooled resource");

        Ok(index)
    }

    fn advance_decay_clock(&mut self) {
        self.calls_since_decay = self.calls_since_decay.saturating_add(1);

        if self.calls_since_decay < self.policy.decay_period().get() {
            return;
        }

        self.calls_since_decay = 0;

        let divisor = self.policy.decay_divisor();
        for slot in &mut self.slots {
            slot.decay(divisor);
        }

        DECAYS.with(Event::observe_once);
        trace!(divisor, "decayed keyed pool hit scores");
    }

    /// The maximum number of resources the pool can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The number of resources currently in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.key_to_slot.len()
    }

    /// Whether the pool holds no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.key_to_slot.is_empty()
    }

    /// Whether every slot in the pool holds a resource.
    ///
    /// A pool with zero capacity is never full.
    #[must_use]
    pub fn is_full(&self) -> bool {
        !self.slots.is_empty() && self.len() == self.capacity()
    }

    /// Whether the pool currently holds a resource for `key`.
    #[must_use]
    pub fn contains_key(&self, key: PoolKey) -> bool {
        self.key_to_slot.contains_key(&key)
    }

    /// Returns the resource for `key` without constructing anything and without affecting
    /// hit scores or the decay period.
    #[must_use]
    pub fn get(&self, key: PoolKey) -> Option<&R> {
        let index = *self.key_to_slot.get(&key)?;
        self.slots.get(index).and_then(Slot::resource)
    }

    /// The current hit score of the resource for `key`, if it is in the pool.
    #[must_use]
    pub fn hit_score(&self, key: PoolKey) -> Option<f32> {
        let index = *self.key_to_slot.get(&key)?;
        self.slots.get(index).map(Slot::hit_score)
    }

    /// The keys of all resources in the pool, in slot order.
    pub fn keys(&self) -> impl Iterator<Item = PoolKey> + '_ {
        self.slots.iter().filter_map(Slot::key)
    }

    /// The score policy that drives eviction.
    #[must_use]
    pub fn policy(&self) -> ScorePolicy {
        self.policy
    }

    /// The configuration passed to resource constructors.
    #[must_use]
    pub fn resource_config(&self) -> ResourceConfig {
        self.resource_config
    }

    /// Drops every resource in the pool and resets all scores and the decay period.
    ///
    /// The capacity is unchanged.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            drop(slot.vacate());
        }

        self.key_to_slot.clear();
        self.calls_since_decay = 0;

        debug!(capacity = self.capacity(), "cleared keyed pool");
    }
}

impl<R> Default for KeyedPool<R> {
    fn default() -> Self {
        Self::new()
    }
}

// Debug implementations have no API contract to test.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl<R> fmt::Debug for KeyedPool<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("calls_since_decay", &self.calls_since_decay)
            .field("policy", &self.policy)
            .field("resource_config", &self.resource_config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::Cell;
    use std::collections::HashSet;
    use std::io;
    use std::num::NonZero;
    use std::rc::Rc;

    use new_zealand::nz;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(KeyedPool<u32>: Send);
    assert_not_impl_any!(KeyedPool<Rc<u32>>: Send);

    const A: PoolKey = PoolKey::new(0xA);
    const B: PoolKey = PoolKey::new(0xB);
    const C: PoolKey = PoolKey::new(0xC);

    fn ok(value: u32) -> impl FnOnce(&ResourceConfig) -> io::Result<u32> {
        move |_: &ResourceConfig| Ok(value)
    }

    fn fail() -> impl FnOnce(&ResourceConfig) -> io::Result<u32> {
        |_: &ResourceConfig| Err(io::Error::other("out of device memory"))
    }

    fn assert_score(pool: &KeyedPool<u32>, key: PoolKey, expected: f32) {
        let actual = pool.hit_score(key).expect("key must be in the pool");
        assert!(
            (actual - expected).abs() < 1e-5,
            "score of {key} is {actual}, expected {expected}"
        );
    }

    fn assert_bijection<R>(pool: &KeyedPool<R>) {
        let occupied: Vec<(usize, PoolKey)> = pool
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.key().map(|key| (index, key)))
            .collect();

        assert_eq!(occupied.len(), pool.key_to_slot.len());

        for (index, key) in occupied {
            assert_eq!(pool.key_to_slot.get(&key), Some(&index));
        }
    }

    #[test]
    fn smoke_test() {
        let mut pool = KeyedPool::<u32>::builder().capacity(2).build();

        assert!(pool.is_empty());
        assert!(!pool.is_full());

        assert_eq!(*pool.acquire(A, ok(1)).unwrap(), 1);
        assert_eq!(pool.len(), 1);
        assert!(pool.contains_key(A));

        assert_eq!(*pool.acquire(B, ok(2)).unwrap(), 2);
        assert!(pool.is_full());

        assert_eq!(pool.get(A), Some(&1));
        assert_eq!(pool.get(B), Some(&2));
        assert_eq!(pool.get(C), None);
        assert_eq!(pool.keys().collect::<Vec<_>>(), vec![A, B]);
    }

    #[test]
    fn hit_reuses_resource() {
        let mut pool = KeyedPool::<u32>::builder().capacity(2).build();
        let constructed = Cell::new(0);

        for _ in 0..2 {
            pool.acquire(A, |_| {
                constructed.set(constructed.get() + 1);
                Ok::<_, io::Error>(7)
            })
            .unwrap();
        }

        assert_eq!(constructed.get(), 1);
        assert_score(&pool, A, 5.0);
    }

    #[test]
    fn acquired_resource_is_mutable_in_place() {
        let mut pool = KeyedPool::<u32>::builder().capacity(1).build();

        *pool.acquire(A, ok(1)).unwrap() += 10;

        assert_eq!(*pool.acquire(A, ok(0)).unwrap(), 11);
    }

    #[test]
    fn full_pool_evicts_coldest() {
        let mut pool = KeyedPool::<u32>::builder().capacity(2).build();

        pool.acquire(A, ok(1)).unwrap();
        assert_score(&pool, A, 0.0);

        // Filling the pool applies the penalty to both slots.
        pool.acquire(B, ok(2)).unwrap();
        assert_score(&pool, A, -1.0);
        assert_score(&pool, B, -1.0);

        pool.acquire(C, ok(3)).unwrap();

        assert!(!pool.contains_key(A));
        assert!(pool.contains_key(B));
        assert_eq!(pool.get(C), Some(&3));

        // C took over slot 0 with a fresh score, then the penalty applied again.
        assert_score(&pool, C, -1.0);
        assert_score(&pool, B, -2.0);
        assert_eq!(pool.keys().collect::<Vec<_>>(), vec![C, B]);
    }

    #[test]
    fn hit_protects_from_eviction() {
        let mut pool = KeyedPool::<u32>::builder().capacity(2).build();

        pool.acquire(A, ok(1)).unwrap();
        pool.acquire(B, ok(2)).unwrap();
        pool.acquire(A, ok(0)).unwrap();

        // A: 0 - 1 + 5 - 1 = 3, B: 0 - 1 - 1 = -2
        assert_score(&pool, A, 3.0);
        assert_score(&pool, B, -2.0);

        pool.acquire(C, ok(3)).unwrap();

        assert!(pool.contains_key(A));
        assert!(!pool.contains_key(B));
    }

    #[test]
    fn ties_evict_lowest_slot_index() {
        let mut pool = KeyedPool::<u32>::builder()
            .capacity(3)
            .full_penalty(0.0)
            .build();

        pool.acquire(A, ok(1)).unwrap();
        pool.acquire(B, ok(2)).unwrap();
        pool.acquire(C, ok(3)).unwrap();

        // Bump A so B and C tie at the minimum.
        pool.acquire(A, ok(0)).unwrap();

        pool.acquire(PoolKey::new(0xD), ok(4)).unwrap();

        assert!(pool.contains_key(A));
        assert!(!pool.contains_key(B));
        assert!(pool.contains_key(C));
        assert_eq!(pool.slots[1].key(), Some(PoolKey::new(0xD)));
    }

    #[test]
    fn scores_decay_at_end_of_period() {
        let mut pool = KeyedPool::<u32>::builder()
            .capacity(3)
            .decay_period(nz!(4))
            .build();

        pool.acquire(A, ok(1)).unwrap();
        pool.acquire(A, ok(0)).unwrap();
        pool.acquire(A, ok(0)).unwrap();
        assert_score(&pool, A, 10.0);

        // The fourth call boosts to 15 and then divides by the period.
        pool.acquire(A, ok(0)).unwrap();
        assert_score(&pool, A, 15.0 / 4.0);

        // The clock restarted, so the next three calls do not decay.
        pool.acquire(A, ok(0)).unwrap();
        pool.acquire(A, ok(0)).unwrap();
        pool.acquire(A, ok(0)).unwrap();
        assert_score(&pool, A, 15.0 / 4.0 + 15.0);
    }

    #[test]
    fn decay_applies_to_every_slot() {
        let mut pool = KeyedPool::<u32>::builder()
            .capacity(2)
            .decay_period(nz!(5))
            .build();

        pool.acquire(A, ok(1)).unwrap(); // A 0
        pool.acquire(B, ok(2)).unwrap(); // A -1, B -1
        pool.acquire(A, ok(0)).unwrap(); // A 3, B -2
        pool.acquire(A, ok(0)).unwrap(); // A 7, B -3

        // Fifth call: A 11, B -4, then both divided by 5.
        pool.acquire(A, ok(0)).unwrap();

        assert_score(&pool, A, 11.0 / 5.0);
        assert_score(&pool, B, -4.0 / 5.0);
    }

    #[test]
    fn single_slot_scenario_does_not_retain_evicted_resource() {
        let mut pool = KeyedPool::<u32>::builder().capacity(1).build();
        let constructed = Cell::new(0);

        let acquire = |pool: &mut KeyedPool<u32>, key: u32| {
            *pool
                .acquire(PoolKey::new(key), |_| {
                    constructed.set(constructed.get() + 1);
                    Ok::<_, io::Error>(key * 10)
                })
                .unwrap()
        };

        assert_eq!(acquire(&mut pool, 100), 1000);
        assert_eq!(acquire(&mut pool, 200), 2000);
        assert!(!pool.contains_key(PoolKey::new(100)));
        assert_eq!(acquire(&mut pool, 100), 1000);

        assert_eq!(constructed.get(), 3);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn evicted_resource_is_dropped() {
        let mut pool = KeyedPool::<Rc<()>>::builder().capacity(1).build();
        let tracker = Rc::new(());

        let first = Rc::clone(&tracker);
        pool.acquire(A, move |_| Ok::<_, io::Error>(first)).unwrap();
        assert_eq!(Rc::strong_count(&tracker), 2);

        pool.acquire(B, |_| Ok::<_, io::Error>(Rc::new(()))).unwrap();
        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    #[test]
    fn zero_capacity_never_constructs() {
        let mut pool = KeyedPool::<u32>::builder().capacity(0).build();

        for key in [A, B, A] {
            let result = pool.acquire(key, |_| -> io::Result<u32> {
                panic!("constructor must not be called for a zero-capacity pool")
            });

            assert!(matches!(result, Err(Error::ZeroCapacity)));
        }

        assert!(pool.is_empty());
        assert!(!pool.is_full());
    }

    #[test]
    fn failed_construction_into_vacant_slot_changes_nothing() {
        let mut pool = KeyedPool::<u32>::builder()
            .capacity(2)
            .decay_period(nz!(2))
            .build();

        pool.acquire(A, ok(1)).unwrap();

        let error = pool.acquire(B, fail()).unwrap_err();
        assert!(matches!(error, Error::Construction { key, .. } if key == B));

        assert_eq!(pool.len(), 1);
        assert!(!pool.contains_key(B));
        assert_eq!(pool.calls_since_decay, 1);
        assert_bijection(&pool);

        // The next successful call completes the decay period.
        pool.acquire(A, ok(0)).unwrap();
        assert_eq!(pool.calls_since_decay, 0);
        assert_score(&pool, A, 2.5);
    }

    #[test]
    fn failed_construction_when_full_leaves_victim_slot_empty() {
        let mut pool = KeyedPool::<u32>::builder().capacity(2).build();

        pool.acquire(A, ok(1)).unwrap();
        pool.acquire(B, ok(2)).unwrap();
        pool.acquire(B, ok(0)).unwrap();

        // A is the coldest and is evicted before the constructor for C fails.
        pool.acquire(C, fail()).unwrap_err();

        assert!(!pool.contains_key(A));
        assert!(!pool.contains_key(C));
        assert!(pool.slots[0].is_empty());
        assert_eq!(pool.get(B), Some(&2));
        assert_score(&pool, B, 3.0);
        assert_eq!(pool.calls_since_decay, 3);
        assert_bijection(&pool);

        // The empty slot is reused without evicting anything else.
        pool.acquire(C, ok(3)).unwrap();
        assert_eq!(pool.slots[0].key(), Some(C));
        assert_eq!(pool.get(B), Some(&2));
    }

    #[test]
    fn eviction_drops_victim_before_constructing() {
        struct Counted(Rc<Cell<usize>>);

        impl Drop for Counted {
            fn drop(&mut self) {
                self.0.set(self.0.get() - 1);
            }
        }

        let live = Rc::new(Cell::new(0_usize));
        let counted = |live: &Rc<Cell<usize>>| {
            live.set(live.get() + 1);
            Counted(Rc::clone(live))
        };

        let mut pool = KeyedPool::<Counted>::builder().capacity(1).build();
        let mut live_during_construction = Vec::new();

        for key in [1, 2, 3, 9] {
            pool.acquire(PoolKey::new(key), |_| {
                live_during_construction.push(live.get());
                Ok::<_, io::Error>(counted(&live))
            })
            .unwrap();

            assert_eq!(live.get(), 1);
        }

        assert_eq!(live_during_construction, vec![0, 0, 0, 0]);
    }

    #[test]
    fn constructor_receives_resource_config() {
        let mut pool = KeyedPool::<(u16, crate::LogLevel)>::builder()
            .device_id(3)
            .log_level(crate::LogLevel::Info)
            .build();

        let resource = pool
            .acquire(A, |config| {
                Ok::<_, io::Error>((config.device_id(), config.log_level()))
            })
            .unwrap();

        assert_eq!(*resource, (3, crate::LogLevel::Info));
    }

    #[test]
    fn get_does_not_affect_scores() {
        let mut pool = KeyedPool::<u32>::builder().capacity(1).build();

        pool.acquire(A, ok(1)).unwrap();
        let before = pool.hit_score(A);

        assert_eq!(pool.get(A), Some(&1));
        assert_eq!(pool.hit_score(A), before);
        assert_eq!(pool.calls_since_decay, 1);
    }

    #[test]
    fn clear_empties_pool() {
        let mut pool = KeyedPool::<u32>::builder().capacity(2).build();

        pool.acquire(A, ok(1)).unwrap();
        pool.acquire(B, ok(2)).unwrap();

        pool.clear();

        assert!(pool.is_empty());
        assert_eq!(pool.capacity(), 2);
        assert_eq!(pool.calls_since_decay, 0);
        assert!(pool.slots.iter().all(Slot::is_empty));
        assert_bijection(&pool);

        // Slots are reused from the start.
        pool.acquire(C, ok(3)).unwrap();
        assert_eq!(pool.slots[0].key(), Some(C));
    }

    #[test]
    fn random_sequences_preserve_invariants() {
        let mut rng = SmallRng::seed_from_u64(0x5EED);

        for capacity in 1..=6 {
            let decay_period = NonZero::new(rng.random_range(1..=8_u16)).unwrap();

            let mut pool = KeyedPool::<u32>::builder()
                .capacity(capacity)
                .decay_period(decay_period)
                .build();

            let mut live = HashSet::new();

            for _ in 0..2_000 {
                let key = PoolKey::new(rng.random_range(0..12));
                let should_fail = rng.random_ratio(1, 10);

                let result = pool.acquire(key, |_| {
                    if should_fail {
                        Err(io::Error::other("simulated failure"))
                    } else {
                        Ok(key.get())
                    }
                });

                match result {
                    Ok(resource) => {
                        assert_eq!(*resource, key.get());
                        live.insert(key);
                    }
                    Err(Error::Construction { key: failed, .. }) => {
                        assert_eq!(failed, key);
                        assert!(!pool.contains_key(key));
                    }
                    Err(other) => panic!("unexpected error: {other}"),
                }

                assert!(pool.len() <= capacity);
                assert!(pool.calls_since_decay < decay_period.get());
                assert_bijection(&pool);

                live.retain(|key| pool.contains_key(*key));
                assert_eq!(live.len(), pool.len());
            }
        }
    }
}
