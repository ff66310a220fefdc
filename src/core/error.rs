//! Error types for simulation components.

use thiserror::Error;

use crate::util::serde::ResourceKind;

/// Errors produced while configuring, starting or adjusting a simulation.
///
/// Degraded treatment outcomes (no ventilator, skipped break, zero capacity
/// increment) are reported as events and never appear here.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Configuration could not be loaded or parsed.
    #[error("config error: {0}")]
    Config(String),
    /// A capacity decrease asked for more units than are currently idle.
    #[error("insufficient slack in {kind} pool: requested {requested}, available {available}")]
    InsufficientSlack {
        /// Pool being adjusted.
        kind: ResourceKind,
        /// Units the caller tried to remove.
        requested: u32,
        /// Units idle at the time of the request.
        available: u32,
    },
    /// An OS thread for a component could not be spawned.
    #[error("failed to spawn {component}: {source}")]
    Spawn {
        /// Thread name of the component.
        component: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A component thread panicked before reaching its terminal state.
    #[error("component panicked: {0}")]
    ComponentPanicked(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
