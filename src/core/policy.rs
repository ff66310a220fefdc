//! Injected timing and randomness policies.
//!
//! The core never decides how long anything takes or which priority a new
//! patient gets. Those choices come through [`DelayPolicy`] and
//! [`RandomSource`] so tests can pin them down.

use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::Patient;
use crate::util::serde::Priority;

/// Supplies inter-arrival times and treatment durations.
pub trait DelayPolicy: Send + Sync {
    /// Wait before the next patient arrives.
    fn arrival_interval(&self) -> Duration;
    /// How long a treatment holds its lease.
    fn treatment_duration(&self, patient: &Patient) -> Duration;
}

/// Supplies priorities for new patients and capacity increments.
pub trait RandomSource: Send {
    /// Priority for the next arriving patient.
    fn next_priority(&mut self) -> Priority;
    /// Increment in `0..=max`.
    fn next_increment(&mut self, max: u32) -> u32;
}

/// Constant delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelays {
    /// Wait between arrivals.
    pub arrival: Duration,
    /// Treatment length for every patient.
    pub treatment: Duration,
}

impl DelayPolicy for FixedDelays {
    fn arrival_interval(&self) -> Duration {
        self.arrival
    }

    fn treatment_duration(&self, _patient: &Patient) -> Duration {
        self.treatment
    }
}

/// Uniformly random arrival gaps and a fixed treatment length.
#[derive(Debug)]
pub struct UniformDelays {
    arrival_min: Duration,
    arrival_max: Duration,
    treatment: Duration,
    rng: Mutex<StdRng>,
}

impl UniformDelays {
    /// Arrivals spaced uniformly in `arrival_min..=arrival_max`.
    ///
    /// A `seed` makes the sequence reproducible.
    #[must_use]
    pub fn new(
        arrival_min: Duration,
        arrival_max: Duration,
        treatment: Duration,
        seed: Option<u64>,
    ) -> Self {
        let (arrival_min, arrival_max) = if arrival_min <= arrival_max {
            (arrival_min, arrival_max)
        } else {
            (arrival_max, arrival_min)
        };
        Self {
            arrival_min,
            arrival_max,
            treatment,
            rng: Mutex::new(seeded_rng(seed)),
        }
    }
}

impl DelayPolicy for UniformDelays {
    fn arrival_interval(&self) -> Duration {
        let min = u64::try_from(self.arrival_min.as_millis()).unwrap_or(u64::MAX);
        let max = u64::try_from(self.arrival_max.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(self.rng.lock().random_range(min..=max))
    }

    fn treatment_duration(&self, _patient: &Patient) -> Duration {
        self.treatment
    }
}

/// [`RandomSource`] backed by a seedable `StdRng`.
#[derive(Debug)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Reproducible source for a given seed.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded if `seed` is set, otherwise from entropy.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        Self { rng: seeded_rng(seed) }
    }
}

impl RandomSource for SeededRandom {
    fn next_priority(&mut self) -> Priority {
        Priority::ALL[self.rng.random_range(0..Priority::ALL.len())]
    }

    fn next_increment(&mut self, max: u32) -> u32 {
        self.rng.random_range(0..=max)
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
}
