//! Stochastic selection primitives shared by the generation stages.
//!
//! Both samplers prefer elements they have not handed out yet and refill their
//! pools once exhausted, which spreads usage across the whole universe instead
//! of concentrating it on a few elements.

use crate::random::RandomSource;

/// Provided/required split returned by [`InterfaceSampler::sample`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledRoles<T> {
    pub provided: Vec<T>,
    pub required: Vec<T>,
}

impl<T> Default for SampledRoles<T> {
    fn default() -> Self {
        Self {
            provided: Vec::new(),
            required: Vec::new(),
        }
    }
}

impl<T: PartialEq> SampledRoles<T> {
    /// Elements handed out on both sides of the split.
    pub fn overlap(&self) -> usize {
        self.required
            .iter()
            .filter(|item| self.provided.contains(item))
            .count()
    }
}

/// Draws provided/required interface sets for one component at a time.
///
/// Within one call the two sets are disjoint unless demand exceeds the
/// universe, in which case exactly `p + r - |universe|` elements are shared.
#[derive(Debug, Clone)]
pub struct InterfaceSampler<T> {
    universe: Vec<T>,
    remaining_provided: Vec<T>,
    remaining_required: Vec<T>,
}

impl<T: Clone + PartialEq> InterfaceSampler<T> {
    pub fn new(universe: Vec<T>) -> Self {
        Self {
            remaining_provided: universe.clone(),
            remaining_required: universe.clone(),
            universe,
        }
    }

    pub fn universe_len(&self) -> usize {
        self.universe.len()
    }

    pub fn sample(
        &mut self,
        count_provided: usize,
        count_required: usize,
        rng: &mut RandomSource,
    ) -> SampledRoles<T> {
        let size = self.universe.len();
        if size == 0 {
            return SampledRoles::default();
        }

        let provided_count = count_provided.min(size);
        let required_count = count_required.min(size);
        let overlap = (provided_count + required_count).saturating_sub(size);

        if self.remaining_provided.len() < provided_count {
            self.remaining_provided = self.universe.clone();
        }
        let provided = draw(&mut self.remaining_provided, provided_count, rng);

        self.remaining_required
            .retain(|item| !provided.contains(item));
        let fresh = required_count - overlap;
        if self.remaining_required.len() < fresh {
            self.remaining_required = self
                .universe
                .iter()
                .filter(|item| !provided.contains(item))
                .cloned()
                .collect();
        }
        let mut required = draw(&mut self.remaining_required, fresh, rng);

        if overlap > 0 {
            tracing::trace!(
                provided = provided_count,
                required = required_count,
                universe = size,
                overlap,
                "interface demand exceeds supply; sharing interfaces"
            );
            for idx in rng.sample_indices(provided.len(), overlap) {
                required.push(provided[idx].clone());
            }
        }

        SampledRoles { provided, required }
    }
}

/// Removes and returns `amount` random elements of `pool`, in draw order.
fn draw<T: Clone>(pool: &mut Vec<T>, amount: usize, rng: &mut RandomSource) -> Vec<T> {
    let indices = rng.sample_indices(pool.len(), amount);
    let picked: Vec<T> = indices.iter().map(|&idx| pool[idx].clone()).collect();

    let mut taken = vec![false; pool.len()];
    for idx in indices {
        taken[idx] = true;
    }
    let mut position = 0;
    pool.retain(|_| {
        let keep = !taken[position];
        position += 1;
        keep
    });
    picked
}

/// Returns every element of a fixed pool once per rotation, in random order.
#[derive(Debug, Clone)]
pub struct UniqueRotationSampler<T> {
    pool: Vec<T>,
    remaining: Vec<T>,
}

impl<T: Clone> UniqueRotationSampler<T> {
    pub fn new(pool: Vec<T>) -> Self {
        Self {
            remaining: pool.clone(),
            pool,
        }
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Next element of the current rotation; `None` only for an empty pool.
    pub fn sample(&mut self, rng: &mut RandomSource) -> Option<T> {
        if self.remaining.is_empty() {
            self.remaining = self.pool.clone();
        }
        let idx = rng.index(self.remaining.len())?;
        Some(self.remaining.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn distinct(items: &[u32]) -> bool {
        items.iter().collect::<HashSet<_>>().len() == items.len()
    }

    #[test]
    fn test_disjoint_when_supply_suffices() {
        let mut rng = RandomSource::seeded(1);
        let mut sampler = InterfaceSampler::new((0..6).collect::<Vec<u32>>());
        for _ in 0..50 {
            let roles = sampler.sample(3, 3, &mut rng);
            assert_eq!(roles.provided.len(), 3);
            assert_eq!(roles.required.len(), 3);
            assert_eq!(roles.overlap(), 0);
            assert!(distinct(&roles.provided));
            assert!(distinct(&roles.required));
        }
    }

    #[test]
    fn test_overlap_when_demand_exceeds_supply() {
        let mut rng = RandomSource::seeded(2);
        let mut sampler = InterfaceSampler::new(vec![10u32, 20, 30]);
        let roles = sampler.sample(2, 2, &mut rng);
        assert_eq!(roles.provided.len(), 2);
        assert_eq!(roles.required.len(), 2);
        assert_eq!(roles.overlap(), 1);
        assert!(distinct(&roles.required));
        let union: HashSet<_> = roles.provided.iter().chain(&roles.required).collect();
        assert_eq!(union.len(), 3);
    }

    #[test]
    fn test_requests_capped_at_universe() {
        let mut rng = RandomSource::seeded(3);
        let mut sampler = InterfaceSampler::new(vec![1u32, 2]);
        let roles = sampler.sample(5, 7, &mut rng);
        assert_eq!(roles.provided.len(), 2);
        assert_eq!(roles.required.len(), 2);
    }

    #[test]
    fn test_single_element_universe() {
        let mut rng = RandomSource::seeded(4);
        let mut sampler = InterfaceSampler::new(vec![42u32]);
        let roles = sampler.sample(1, 1, &mut rng);
        assert_eq!(roles.provided, vec![42]);
        assert_eq!(roles.required, vec![42]);
    }

    #[test]
    fn test_empty_universe_yields_nothing() {
        let mut rng = RandomSource::seeded(5);
        let mut sampler: InterfaceSampler<u32> = InterfaceSampler::new(vec![]);
        let roles = sampler.sample(2, 2, &mut rng);
        assert!(roles.provided.is_empty());
        assert!(roles.required.is_empty());
    }

    #[test]
    fn test_provided_rotates_before_repeating() {
        let mut rng = RandomSource::seeded(6);
        let mut sampler = InterfaceSampler::new((0..4).collect::<Vec<u32>>());
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.extend(sampler.sample(1, 0, &mut rng).provided);
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_rotation_sampler_covers_pool_each_round() {
        let mut rng = RandomSource::seeded(7);
        let mut sampler = UniqueRotationSampler::new(vec!['a', 'b', 'c']);
        for _ in 0..3 {
            let mut round: Vec<char> = (0..3).filter_map(|_| sampler.sample(&mut rng)).collect();
            round.sort_unstable();
            assert_eq!(round, vec!['a', 'b', 'c']);
        }
    }

    #[test]
    fn test_rotation_sampler_empty_pool() {
        let mut rng = RandomSource::seeded(8);
        let mut sampler: UniqueRotationSampler<u8> = UniqueRotationSampler::new(vec![]);
        assert!(sampler.is_empty());
        assert_eq!(sampler.sample(&mut rng), None);
    }
}
