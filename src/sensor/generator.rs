//! Random-walk temperature source

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Largest change between two consecutive values
pub const MAX_STEP: f64 = 0.1;

/// Produces a slowly drifting temperature
///
/// Each call to [`next_value`](Self::next_value) moves the current value by a
/// uniformly distributed step in `[-MAX_STEP, MAX_STEP)`.
#[derive(Debug)]
pub struct TemperatureGenerator<R = StdRng> {
    current: f64,
    rng: R,
}

impl TemperatureGenerator<StdRng> {
    /// Start at `initial` with an OS-seeded generator
    pub fn new(initial: f64) -> Self {
        Self::with_rng(initial, StdRng::from_entropy())
    }

    /// Start at `initial` with a reproducible sequence
    pub fn seeded(initial: f64, seed: u64) -> Self {
        Self::with_rng(initial, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> TemperatureGenerator<R> {
    /// Start at `initial` using the given random source
    pub fn with_rng(initial: f64, rng: R) -> Self {
        Self {
            current: initial,
            rng,
        }
    }

    /// Advance the walk and return the new value
    pub fn next_value(&mut self) -> f64 {
        self.current += self.rng.gen_range(-MAX_STEP..MAX_STEP);
        self.current
    }

    /// Value returned by the last step (or the initial value)
    pub fn current(&self) -> f64 {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_are_bounded() {
        let mut generator = TemperatureGenerator::seeded(20.0, 7);
        let mut previous = generator.current();

        for _ in 0..1_000 {
            let value = generator.next_value();
            assert!((value - previous).abs() <= MAX_STEP + 1e-9);
            previous = value;
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = TemperatureGenerator::seeded(20.0, 42);
        let mut b = TemperatureGenerator::seeded(20.0, 42);

        for _ in 0..10 {
            assert_eq!(a.next_value(), b.next_value());
        }
    }

    #[test]
    fn test_starts_at_initial() {
        let generator = TemperatureGenerator::new(-3.5);
        assert_eq!(generator.current(), -3.5);
    }
}
