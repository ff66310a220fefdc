//! Builders to construct a simulation from configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::config::SimulationConfig;
use crate::core::{DelayPolicy, Observer, RandomSource, SeededRandom, SimulationError, UniformDelays};
use crate::runtime::Simulation;

/// Stream a [`RandomSource`] is drawn for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomStream {
    /// Patient priorities.
    Arrivals,
    /// Capacity increments.
    Capacity,
}

impl RandomStream {
    /// Offset applied to the configured seed so the two streams differ.
    #[must_use]
    pub const fn seed_offset(self) -> u64 {
        match self {
            Self::Arrivals => 0,
            Self::Capacity => 1,
        }
    }
}

/// Build a simulation with uniform arrivals and seeded random streams.
///
/// # Errors
///
/// Returns [`SimulationError::InvalidConfig`] if `cfg` fails validation.
pub fn build_simulation(
    cfg: &SimulationConfig,
    observer: Arc<dyn Observer>,
) -> Result<Simulation, SimulationError> {
    build_simulation_with(
        cfg,
        observer,
        |cfg| {
            Ok(Arc::new(UniformDelays::new(
                Duration::from_millis(cfg.arrival.min_ms),
                Duration::from_millis(cfg.arrival.max_ms),
                cfg.treatment(),
                cfg.seed,
            )))
        },
        |cfg, stream| {
            let seed = cfg.seed.map(|s| s.wrapping_add(stream.seed_offset()));
            Ok(Box::new(SeededRandom::new(seed)))
        },
    )
}

/// Build a simulation using provided factories for delays and randomness.
///
/// # Errors
///
/// Returns [`SimulationError::InvalidConfig`] if `cfg` fails validation, or
/// whatever a factory returns.
pub fn build_simulation_with<FD, FR>(
    cfg: &SimulationConfig,
    observer: Arc<dyn Observer>,
    delay_factory: FD,
    mut random_factory: FR,
) -> Result<Simulation, SimulationError>
where
    FD: FnOnce(&SimulationConfig) -> Result<Arc<dyn DelayPolicy>, SimulationError>,
    FR: FnMut(&SimulationConfig, RandomStream) -> Result<Box<dyn RandomSource>, SimulationError>,
{
    cfg.validate().map_err(SimulationError::InvalidConfig)?;

    let delays = delay_factory(cfg)?;
    let arrivals = random_factory(cfg, RandomStream::Arrivals)?;
    let capacity = random_factory(cfg, RandomStream::Capacity)?;
    Simulation::new(cfg.clone(), delays, observer, arrivals, capacity)
}
