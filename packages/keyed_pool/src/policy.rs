use std::num::NonZero;

use new_zealand::nz;

pub(crate) const DEFAULT_HIT_BOOST: f32 = 5.0;
pub(crate) const DEFAULT_FULL_PENALTY: f32 = 1.0;
pub(crate) const DEFAULT_DECAY_PERIOD: NonZero<u16> = nz!(500);

/// Tuning constants for the hit-score bookkeeping that drives eviction.
///
/// * Every hit adds `hit_boost` to the score of the slot that was hit.
/// * Every call that leaves the pool full subtracts `full_penalty` from every slot.
/// * Every `decay_period` calls, all scores are divided by `decay_period`.
///
/// The slot with the lowest score is evicted when a new key arrives at a full pool.
///
/// # Example
///
/// ```
/// use keyed_pool::ScorePolicy;
///
/// let policy = ScorePolicy::default();
///
/// assert_eq!(policy.decay_period().get(), 500);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScorePolicy {
    hit_boost: f32,
    full_penalty: f32,
    decay_period: NonZero<u16>,
}

impl ScorePolicy {
    pub(crate) const fn new(hit_boost: f32, full_penalty: f32, decay_period: NonZero<u16>) -> Self {
        Self {
            hit_boost,
            full_penalty,
            decay_period,
        }
    }

    /// Amount added to a slot's score when its key is requested again.
    #[must_use]
    pub const fn hit_boost(&self) -> f32 {
        self.hit_boost
    }

    /// Amount subtracted from every slot's score on each call that leaves the pool full.
    #[must_use]
    pub const fn full_penalty(&self) -> f32 {
        self.full_penalty
    }

    /// Number of calls between score decays, also used as the decay divisor.
    #[must_use]
    pub const fn decay_period(&self) -> NonZero<u16> {
        self.decay_period
    }

    pub(crate) fn decay_divisor(&self) -> f32 {
        f32::from(self.decay_period.get())
    }
}

impl Default for ScorePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_HIT_BOOST, DEFAULT_FULL_PENALTY, DEFAULT_DECAY_PERIOD)
    }
}
