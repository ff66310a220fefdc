//! Async entry points for callers already inside a tokio runtime.
//!
//! The simulation itself stays on OS threads with parking_lot condvars. These
//! helpers move the blocking waits onto tokio's blocking pool.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::core::{AdmissionQueue, Dequeued, SimulationError};
use crate::runtime::{Simulation, SimulationReport};

/// Run a simulation to completion without blocking the async executor.
///
/// # Errors
///
/// Propagates [`Simulation::run`] errors. A panic inside the blocking task is
/// reported as [`SimulationError::ComponentPanicked`].
pub async fn run_async(simulation: Simulation) -> Result<SimulationReport, SimulationError> {
    tokio::task::spawn_blocking(move || simulation.run())
        .await
        .map_err(|e| SimulationError::ComponentPanicked(format!("simulation task: {e}")))?
}

/// Wait for the next patient from an async context.
///
/// Returns `None` if nothing arrived within `timeout`. The wait runs on the
/// blocking pool with its own deadline, so a timed-out call leaves the queue
/// untouched.
///
/// # Errors
///
/// Returns [`SimulationError::ComponentPanicked`] if the blocking task panics.
pub async fn dequeue_async(
    queue: Arc<AdmissionQueue>,
    timeout: Duration,
) -> Result<Option<Dequeued>, SimulationError> {
    let got = tokio::task::spawn_blocking(move || queue.dequeue_timeout(timeout))
        .await
        .map_err(|e| SimulationError::ComponentPanicked(format!("dequeue task: {e}")))?;
    if got.is_none() {
        debug!(?timeout, "async dequeue timed out");
    }
    Ok(got)
}
