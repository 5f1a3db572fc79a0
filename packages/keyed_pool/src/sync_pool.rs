use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    ConstructorError, KeyedPool, KeyedPoolBuilder, PoolKey, ResourceConfig, Result, ScorePolicy,
};

/// A thread-safe [`KeyedPool`] that hands out shared resource handles.
///
/// Every operation runs under a single lock, including resource construction and eviction,
/// so the pool invariants hold for all observers. Resources are returned as [`Arc<R>`]: a
/// resource evicted from the pool stays alive until the last handle to it is dropped.
///
/// Cloning a `SyncKeyedPool` creates another handle to the same pool.
///
/// # Example
///
/// ```
/// use std::thread;
///
/// use keyed_pool::{PoolKey, SyncKeyedPool};
///
/// let pool = SyncKeyedPool::<String>::builder().capacity(1).build_sync();
///
/// let first = pool
///     .acquire(PoolKey::new(1), |_| Ok::<_, std::io::Error>("one".to_string()))
///     .unwrap();
///
/// // Evicts "one" from the pool, but our handle keeps it alive.
/// let pool_clone = pool.clone();
/// thread::spawn(move || {
///     pool_clone
///         .acquire(PoolKey::new(2), |_| Ok::<_, std::io::Error>("two".to_string()))
///         .unwrap();
/// })
/// .join()
/// .unwrap();
///
/// assert!(!pool.contains_key(PoolKey::new(1)));
/// assert_eq!(*first, "one");
/// ```
pub struct SyncKeyedPool<R> {
    inner: Arc<Mutex<KeyedPool<Arc<R>>>>,
}

impl<R> SyncKeyedPool<R> {
    pub(crate) fn new_inner(pool: KeyedPool<Arc<R>>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    /// Creates a new [`SyncKeyedPool`] with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build_sync()
    }

    /// Starts building a new pool. Finish with [`build_sync()`][KeyedPoolBuilder::build_sync].
    pub fn builder() -> KeyedPoolBuilder<R> {
        KeyedPoolBuilder::new()
    }

    /// Returns a shared handle to the resource for `key`, constructing it on a miss.
    ///
    /// Scoring and eviction follow the same rules as [`KeyedPool::acquire()`]. The lock is
    /// held while the constructor runs, so concurrent callers wait for the construction to
    /// finish.
    ///
    /// # Errors
    ///
    /// Same as [`KeyedPool::acquire()`].
    pub fn acquire<F, E>(&self, key: PoolKey, constructor: F) -> Result<Arc<R>>
    where
        F: FnOnce(&ResourceConfig) -> std::result::Result<R, E>,
        E: Into<ConstructorError>,
    {
        let mut pool = self.inner.lock();
        let resource = pool.acquire(key, |config| constructor(config).map(Arc::new))?;

        Ok(Arc::clone(resource))
    }

    /// The maximum number of resources the pool can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// The number of resources currently in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the pool holds no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Whether the pool currently holds a resource for `key`.
    #[must_use]
    pub fn contains_key(&self, key: PoolKey) -> bool {
        self.inner.lock().contains_key(key)
    }

    /// The current hit score of the resource for `key`, if it is in the pool.
    #[must_use]
    pub fn hit_score(&self, key: PoolKey) -> Option<f32> {
        self.inner.lock().hit_score(key)
    }

    /// The score policy that drives eviction.
    #[must_use]
    pub fn policy(&self) -> ScorePolicy {
        self.inner.lock().policy()
    }

    /// Removes every resource from the pool. Outstanding handles stay valid.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl<R> Clone for SyncKeyedPool<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> Default for SyncKeyedPool<R> {
    fn default() -> Self {
        Self::new()
    }
}

// Debug implementations have no API contract to test.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl<R> fmt::Debug for SyncKeyedPool<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("inner", &*self.inner.lock())
            .finish()
    }
}
