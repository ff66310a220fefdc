//! Builders for wiring a simulation from configuration.

pub mod simulation_builder;

pub use simulation_builder::{build_simulation, build_simulation_with, RandomStream};
