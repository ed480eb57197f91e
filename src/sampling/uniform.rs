use crate::core::sampler::Sampler;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand::seq::index;

/// Uniform sampling without replacement: every subset of the requested size
/// is equally likely.
pub struct UniformSampler<R = StdRng> {
    rng: R,
}

impl UniformSampler<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> UniformSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> Sampler for UniformSampler<R> {
    fn draw(&mut self, population: usize, amount: usize) -> Vec<usize> {
        // 全量抽样无需随机数
        if amount >= population {
            return (0..population).collect();
        }

        index::sample(&mut self.rng, population, amount).into_vec()
    }
}
