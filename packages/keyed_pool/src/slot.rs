use crate::PoolKey;

/// One fixed position in the pool. Holds at most one resource and its eviction score.
pub(crate) struct Slot<R> {
    occupant: Option<Occupant<R>>,
    hit_score: f32,
}

struct Occupant<R> {
    key: PoolKey,
    resource: R,
}

impl<R> Slot<R> {
    pub(crate) const fn empty() -> Self {
        Self {
            occupant: None,
            hit_score: 0.0,
        }
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    pub(crate) fn key(&self) -> Option<PoolKey> {
        self.occupant.as_ref().map(|o| o.key)
    }

    pub(crate) fn resource(&self) -> Option<&R> {
        self.occupant.as_ref().map(|o| &o.resource)
    }

    pub(crate) fn resource_mut(&mut self) -> Option<&mut R> {
        self.occupant.as_mut().map(|o| &mut o.resource)
    }

    pub(crate) const fn hit_score(&self) -> f32 {
        self.hit_score
    }

    pub(crate) fn boost(&mut self, amount: f32) {
        self.hit_score += amount;
    }

    pub(crate) fn penalize(&mut self, amount: f32) {
        self.hit_score -= amount;
    }

    pub(crate) fn decay(&mut self, divisor: f32) {
        self.hit_score /= divisor;
    }

    /// Stores a new resource under `key` with a zero score. The slot must be empty.
    pub(crate) fn fill(&mut self, key: PoolKey, resource: R) {
        debug_assert!(self.is_empty(), "only empty slots can be filled");

        self.hit_score = 0.0;
        self.occupant = Some(Occupant { key, resource });
    }

    pub(crate) fn vacate(&mut self) -> Option<(PoolKey, R)> {
        self.hit_score = 0.0;

        self.occupant
            .take()
            .map(|previous| (previous.key, previous.resource))
    }
}

/// Index of the slot with the lowest score. On ties, the lowest index wins.
///
/// Returns `None` only for an empty slice.
pub(crate) fn coldest<R>(slots: &[Slot<R>]) -> Option<usize> {
    let mut coldest: Option<(usize, f32)> = None;

    for (index, slot) in slots.iter().enumerate() {
        match coldest {
            Some((_, score)) if slot.hit_score >= score => {}
            _ => coldest = Some((index, slot.hit_score)),
        }
    }

    coldest.map(|(index, _)| index)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn slots_with_scores(scores: &[f32]) -> Vec<Slot<()>> {
        scores
            .iter()
            .map(|&score| {
                let mut slot = Slot::empty();
                slot.boost(score);
                slot
            })
            .collect()
    }

    #[test]
    fn coldest_of_empty_is_none() {
        assert_eq!(coldest::<()>(&[]), None);
    }

    #[test]
    fn coldest_picks_minimum() {
        let slots = slots_with_scores(&[3.0, -2.0, 7.0, 0.5]);

        assert_eq!(coldest(&slots), Some(1));
    }

    #[test]
    fn coldest_breaks_ties_by_lowest_index() {
        let slots = slots_with_scores(&[4.0, 1.0, 1.0, 1.0]);

        assert_eq!(coldest(&slots), Some(1));
    }

    #[test]
    fn fill_starts_at_zero_score() {
        let mut slot = Slot::empty();
        slot.penalize(2.0);

        slot.fill(PoolKey::new(1), "first");

        assert_eq!(slot.key(), Some(PoolKey::new(1)));
        assert_eq!(slot.resource(), Some(&"first"));
        assert!(slot.hit_score().abs() < f32::EPSILON);
    }

    #[test]
    fn refill_after_vacate() {
        let mut slot = Slot::empty();
        slot.fill(PoolKey::new(1), "first");
        slot.boost(5.0);

        assert_eq!(slot.vacate(), Some((PoolKey::new(1), "first")));
        slot.fill(PoolKey::new(2), "second");

        assert_eq!(slot.key(), Some(PoolKey::new(2)));
        assert!(slot.hit_score().abs() < f32::EPSILON);
    }

    #[test]
    fn vacate_empties_slot() {
        let mut slot = Slot::empty();
        slot.fill(PoolKey::new(9), 99_u32);
        slot.penalize(3.0);

        assert_eq!(slot.vacate(), Some((PoolKey::new(9), 99)));
        assert!(slot.is_empty());
        assert!(slot.hit_score().abs() < f32::EPSILON);
    }

    #[test]
    fn score_arithmetic() {
        let mut slot = Slot::<()>::empty();

        slot.boost(5.0);
        slot.penalize(1.0);
        slot.decay(2.0);

        assert!((slot.hit_score() - 2.0).abs() < f32::EPSILON);
    }
}
