use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::num::NonZero;

use crate::policy::{DEFAULT_DECAY_PERIOD, DEFAULT_FULL_PENALTY, DEFAULT_HIT_BOOST};
use crate::{KeyedPool, LogLevel, ResourceConfig, ScorePolicy, SyncKeyedPool};

pub(crate) const DEFAULT_CAPACITY: usize = 20;

/// Builder for creating an instance of [`KeyedPool`] or [`SyncKeyedPool`].
///
/// You only need to use this builder if you want to customize the pool configuration.
/// The defaults are:
///
/// | Setting        | Default            |
/// |----------------|--------------------|
/// | `capacity`     | 20                 |
/// | `hit_boost`    | 5.0                |
/// | `full_penalty` | 1.0                |
/// | `decay_period` | 500                |
/// | `device_id`    | 0                  |
/// | `log_level`    | [`LogLevel::Error`]|
///
/// # Examples
///
/// ```
/// use keyed_pool::{KeyedPool, LogLevel};
/// use new_zealand::nz;
///
/// let pool = KeyedPool::<Vec<u8>>::builder()
///     .capacity(4)
///     .decay_period(nz!(100))
///     .log_level(LogLevel::Info)
///     .build();
///
/// assert_eq!(pool.capacity(), 4);
/// ```
#[must_use]
pub struct KeyedPoolBuilder<R> {
    capacity: usize,
    hit_boost: f32,
    full_penalty: f32,
    decay_period: NonZero<u16>,
    device_id: u16,
    log_level: LogLevel,

    _resource: PhantomData<fn() -> R>,
}

impl<R> fmt::Debug for KeyedPoolBuilder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("capacity", &self.capacity)
            .field("hit_boost", &self.hit_boost)
            .field("full_penalty", &self.full_penalty)
            .field("decay_period", &self.decay_period)
            .field("device_id", &self.device_id)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl<R> KeyedPoolBuilder<R> {
    pub(crate) fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            hit_boost: DEFAULT_HIT_BOOST,
            full_penalty: DEFAULT_FULL_PENALTY,
            decay_period: DEFAULT_DECAY_PERIOD,
            device_id: 0,
            log_level: LogLevel::default(),
            _resource: PhantomData,
        }
    }

    /// Sets the maximum number of resources the pool holds at once.
    ///
    /// A capacity of zero is accepted but every `acquire()` on the resulting pool fails with
    /// [`Error::ZeroCapacity`][crate::Error::ZeroCapacity].
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the amount added to a slot's score each time its key is requested again.
    pub fn hit_boost(mut self, hit_boost: f32) -> Self {
        self.hit_boost = hit_boost;
        self
    }

    /// Sets the amount subtracted from every slot's score on each call that leaves the
    /// pool full.
    pub fn full_penalty(mut self, full_penalty: f32) -> Self {
        self.full_penalty = full_penalty;
        self
    }

    /// Sets how many calls pass between score decays. At the end of each period, every
    /// score is divided by this same number.
    pub fn decay_period(mut self, decay_period: NonZero<u16>) -> Self {
        self.decay_period = decay_period;
        self
    }

    /// Sets the device identifier passed to resource constructors.
    pub fn device_id(mut self, device_id: u16) -> Self {
        self.device_id = device_id;
        self
    }

    /// Sets the log level passed to resource constructors.
    pub fn log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    fn parts(&self) -> (ScorePolicy, ResourceConfig) {
        (
            ScorePolicy::new(self.hit_boost, self.full_penalty, self.decay_period),
            ResourceConfig::new(self.device_id, self.log_level),
        )
    }

    /// Builds a single-threaded pool that lends out borrowed resources.
    #[must_use]
    pub fn build(self) -> KeyedPool<R> {
        let (policy, resource_config) = self.parts();
        KeyedPool::new_inner(self.capacity, policy, resource_config)
    }

    /// Builds a thread-safe pool that hands out shared resource handles.
    #[must_use]
    pub fn build_sync(self) -> SyncKeyedPool<R> {
        let (policy, resource_config) = self.parts();
        SyncKeyedPool::new_inner(KeyedPool::new_inner(
            self.capacity,
            policy,
            resource_config,
        ))
    }
}
