//! Seeded random number streams.
//!
//! Every random draw made by the simulation goes through a [`RandomSource`] owned by the
//! engine. Draws are partitioned into independent streams, each keyed by a type declared
//! with [`define_rng!`]. A stream is created lazily the first time it is used and is seeded
//! with the base seed offset by a hash of the stream's name, so adding draws to one stream
//! never shifts the sequence seen by another.
mod macros;
mod sampling_algorithms;

use std::any::TypeId;

use log::trace;
pub use macros::define_rng;
use rand::distr::uniform::{SampleRange, SampleUniform};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
pub use sampling_algorithms::sample_multiple_from_known_length;

use crate::hashing::{hash_str, HashMap};

pub trait RngId: Copy + 'static {
    fn get_name() -> &'static str;
}

pub struct RandomSource {
    base_seed: u64,
    rngs: HashMap<TypeId, SmallRng>,
}

impl RandomSource {
    #[must_use]
    pub fn new(base_seed: u64) -> Self {
        RandomSource {
            base_seed,
            rngs: HashMap::default(),
        }
    }

    /// Resets the base seed. Existing streams are dropped and re-seeded on next use.
    pub fn init(&mut self, base_seed: u64) {
        trace!("initializing random source (seed={base_seed})");
        self.base_seed = base_seed;
        self.rngs.clear();
    }

    #[must_use]
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    fn get_rng<R: RngId>(&mut self) -> &mut SmallRng {
        let base_seed = self.base_seed;
        self.rngs.entry(TypeId::of::<R>()).or_insert_with(|| {
            trace!(
                "creating new RNG (seed={}) for stream {}",
                base_seed,
                R::get_name()
            );
            SmallRng::seed_from_u64(base_seed.wrapping_add(hash_str(R::get_name())))
        })
    }

    /// Applies `sampler` to the generator of the given stream.
    pub fn sample<R: RngId, T>(
        &mut self,
        _rng_id: R,
        sampler: impl FnOnce(&mut SmallRng) -> T,
    ) -> T {
        sampler(self.get_rng::<R>())
    }

    /// Returns true with probability `p`. Values above 1 behave as certainty and values
    /// below 0 (or NaN) as impossibility.
    pub fn sample_bool<R: RngId>(&mut self, rng_id: R, p: f64) -> bool {
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        self.sample(rng_id, |rng| rng.random_bool(p))
    }

    /// Gets a random sample within the range provided by `range`.
    pub fn sample_range<R: RngId, S, T>(&mut self, rng_id: R, range: S) -> T
    where
        S: SampleRange<T>,
        T: SampleUniform,
    {
        self.sample(rng_id, |rng| rng.random_range(range))
    }

    /// Picks `requested` distinct items uniformly at random, preserving their order in
    /// `items`.
    pub fn sample_multiple<R: RngId, T: Copy>(
        &mut self,
        rng_id: R,
        items: &[T],
        requested: usize,
    ) -> Vec<T> {
        self.sample(rng_id, |rng| {
            sample_multiple_from_known_length(rng, items.iter().copied(), requested)
        })
    }
}

impl std::fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomSource")
            .field("base_seed", &self.base_seed)
            .field("streams", &self.rngs.len())
            .finish()
    }
}
