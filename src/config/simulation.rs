//! Simulation configuration structures.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{ResourceCapacities, SimulationError};
use crate::util::serde::ResourceKind;

/// Environment variable naming a JSON config file.
pub const CONFIG_PATH_ENV: &str = "ER_SIM_CONFIG";
/// Environment override for the worker count.
pub const WORKERS_ENV: &str = "ER_SIM_WORKERS";
/// Environment override for the run duration in milliseconds.
pub const RUN_MS_ENV: &str = "ER_SIM_RUN_MS";
/// Environment override for the random seed.
pub const SEED_ENV: &str = "ER_SIM_SEED";

/// Inter-arrival gap range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalConfig {
    /// Shortest gap in milliseconds.
    pub min_ms: u64,
    /// Longest gap in milliseconds.
    pub max_ms: u64,
}

impl Default for ArrivalConfig {
    fn default() -> Self {
        Self {
            min_ms: 1_000,
            max_ms: 5_000,
        }
    }
}

/// Capacity controller settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityControllerConfig {
    /// Milliseconds between ticks.
    pub interval_ms: u64,
    /// Largest increment drawn per pool per tick.
    pub max_increment: u32,
}

impl Default for CapacityControllerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 10_000,
            max_increment: 1,
        }
    }
}

/// Fatigue controller settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FatigueConfig {
    /// Milliseconds between break attempts.
    pub interval_ms: u64,
    /// Break length in milliseconds.
    pub break_ms: u64,
    /// Pool whose staff take breaks.
    pub target: ResourceKind,
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            interval_ms: 20_000,
            break_ms: 5_000,
            target: ResourceKind::Doctor,
        }
    }
}

/// Root simulation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Concurrent treatment workers.
    pub worker_count: usize,
    /// Wall-clock run length before shutdown, in milliseconds.
    pub run_duration_ms: u64,
    /// Initial pool sizes.
    pub capacities: ResourceCapacities,
    /// Arrival gap range.
    pub arrival: ArrivalConfig,
    /// Treatment length in milliseconds.
    pub treatment_ms: u64,
    /// Capacity controller settings.
    pub capacity_controller: CapacityControllerConfig,
    /// Fatigue controller settings.
    pub fatigue: FatigueConfig,
    /// Seed for every random draw. Unset means seeded from the OS.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            worker_count: 3,
            run_duration_ms: 30_000,
            capacities: ResourceCapacities::default(),
            arrival: ArrivalConfig::default(),
            treatment_ms: 2_000,
            capacity_controller: CapacityControllerConfig::default(),
            fatigue: FatigueConfig::default(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_count == 0 {
            return Err("worker_count must be greater than 0".into());
        }
        if self.run_duration_ms == 0 {
            return Err("run_duration_ms must be greater than 0".into());
        }
        for (name, units) in [
            ("doctors", self.capacities.doctors),
            ("nurses", self.capacities.nurses),
            ("exam_rooms", self.capacities.exam_rooms),
        ] {
            if units == 0 {
                return Err(format!("capacities.{name} must be greater than 0"));
            }
        }
        if self.arrival.min_ms == 0 {
            return Err("arrival.min_ms must be greater than 0".into());
        }
        if self.arrival.min_ms > self.arrival.max_ms {
            return Err("arrival.min_ms must not exceed arrival.max_ms".into());
        }
        if self.treatment_ms == 0 {
            return Err("treatment_ms must be greater than 0".into());
        }
        if self.capacity_controller.interval_ms == 0 {
            return Err("capacity_controller.interval_ms must be greater than 0".into());
        }
        if self.fatigue.interval_ms == 0 {
            return Err("fatigue.interval_ms must be greater than 0".into());
        }
        if self.fatigue.target == ResourceKind::Ventilator {
            return Err("fatigue.target must be a staff or room pool".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Config`] if the file cannot be read or parsed
    /// and [`SimulationError::InvalidConfig`] if validation fails.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| SimulationError::Config(format!("{}: {e}", path.display())))?;
        let cfg: Self = serde_json::from_str(&text)
            .map_err(|e| SimulationError::Config(format!("{}: parse error: {e}", path.display())))?;
        cfg.validate().map_err(SimulationError::InvalidConfig)?;
        Ok(cfg)
    }

    /// Build configuration from the environment.
    ///
    /// Loads `.env` if present, starts from the file named by
    /// `ER_SIM_CONFIG` (or defaults) and applies `ER_SIM_WORKERS`,
    /// `ER_SIM_RUN_MS` and `ER_SIM_SEED` overrides.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Config`] for unreadable files or malformed
    /// overrides and [`SimulationError::InvalidConfig`] if validation fails.
    pub fn from_env() -> Result<Self, SimulationError> {
        let _ = dotenvy::dotenv();
        let mut cfg = match env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_json_file(path)?,
            Err(_) => Self::default(),
        };
        if let Some(workers) = env_override(WORKERS_ENV)? {
            cfg.worker_count = workers;
        }
        if let Some(run_ms) = env_override(RUN_MS_ENV)? {
            cfg.run_duration_ms = run_ms;
        }
        if let Some(seed) = env_override(SEED_ENV)? {
            cfg.seed = Some(seed);
        }
        cfg.validate().map_err(SimulationError::InvalidConfig)?;
        Ok(cfg)
    }

    /// Run length.
    #[must_use]
    pub const fn run_duration(&self) -> Duration {
        Duration::from_millis(self.run_duration_ms)
    }

    /// Treatment length.
    #[must_use]
    pub const fn treatment(&self) -> Duration {
        Duration::from_millis(self.treatment_ms)
    }
}

fn env_override<T: std::str::FromStr>(key: &str) -> Result<Option<T>, SimulationError>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| SimulationError::Config(format!("{key}={raw}: {e}"))),
        Err(_) => Ok(None),
    }
}
