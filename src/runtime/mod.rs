//! Simulation lifecycle and runtime adapters.

pub mod simulation;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_adapter;

pub use simulation::{RunningSimulation, Simulation, SimulationReport};
#[cfg(feature = "tokio-runtime")]
pub use tokio_adapter::{dequeue_async, run_async};
