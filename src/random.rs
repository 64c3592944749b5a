//! Explicit random source threaded through every generation stage.
//!
//! A run owns exactly one [`RandomSource`]; two runs built from the same seed
//! perform the same sequence of draws and therefore produce identical models.

use rand::distributions::Alphanumeric;
use rand::distributions::uniform::SampleUniform;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const NAME_SUFFIX_LEN: usize = 8;
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Seed of run `run_index` in a batch started from `base`.
pub fn derive_run_seed(base: u64, run_index: u64) -> u64 {
    base.wrapping_add(run_index)
}

#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
    seed: u64,
}

impl RandomSource {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seeds from OS entropy; the drawn seed is kept so the run can be replayed.
    pub fn from_entropy() -> Self {
        Self::seeded(rand::random::<u64>())
    }

    /// Random source for one run of a batch.
    pub fn for_run(base: Option<u64>, run_index: u64) -> Self {
        match base {
            Some(seed) => Self::seeded(derive_run_seed(seed, run_index)),
            None => Self::from_entropy(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform draw from the inclusive range `[lo, hi]`; returns `lo` when the range is empty.
    pub fn between<T>(&mut self, lo: T, hi: T) -> T
    where
        T: SampleUniform + PartialOrd + Copy,
    {
        if lo >= hi {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    pub fn coin(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    /// Uniform index into a collection of `len` elements.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.gen_range(0..len))
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    /// `amount` distinct indices below `len`, in draw order. `amount` is capped at `len`.
    pub fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut self.rng, len, amount.min(len)).into_vec()
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    pub fn alphanumeric(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| char::from(self.rng.sample(Alphanumeric)))
            .collect()
    }

    /// Entity name of the form `<prefix>_<8 uppercase letters>`.
    pub fn name(&mut self, prefix: &str) -> String {
        let mut out = String::with_capacity(prefix.len() + 1 + NAME_SUFFIX_LEN);
        out.push_str(prefix);
        out.push('_');
        for _ in 0..NAME_SUFFIX_LEN {
            let idx = self.rng.gen_range(0..UPPERCASE.len());
            out.push(UPPERCASE[idx] as char);
        }
        out
    }
}
