//! Jitter policy — bounded random delays in ten equal steps.
//!
//! A draw picks `k` uniformly from `1..=10` and returns `k * (max / 10)`, so a
//! delay is never zero (for `max` of at least ten nanoseconds) and never
//! exceeds `max`.

use rand::Rng;
use std::time::Duration;

/// Number of equal steps `max` is divided into.
pub const STEPS: u32 = 10;

/// Source of randomized delays bounded by `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jitter {
    max: Duration,
}

impl Jitter {
    pub fn new(max: Duration) -> Self {
        Self { max }
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Width of one step, `max / 10`.
    pub fn step(&self) -> Duration {
        self.max / STEPS
    }

    /// Draw a delay from the calling thread's RNG. Draws are independent
    /// across calls and tasks.
    pub fn sample(&self) -> Duration {
        self.sample_with(&mut rand::thread_rng())
    }

    /// Draw a delay from a caller-supplied RNG.
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let k = rng.gen_range(1..=STEPS);
        self.step() * k
    }
}
