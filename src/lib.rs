//! # ER Admission
//!
//! Priority-based admission of patients to a fixed set of concurrent
//! treatment workers, gated by four shared resource pools.
//!
//! Patients arrive with a priority (High, Medium, Low) and wait in a single
//! priority queue ordered by priority, then arrival order. Each treatment
//! needs one doctor, one nurse and one exam room; High priority patients
//! also try for a ventilator without blocking and are treated anyway if none
//! is free. Two background controllers change capacity while the simulation
//! runs: one grows the staff and room pools, the other sends idle staff on
//! bounded breaks.
//!
//! ## Guarantees
//!
//! - **Ordering**: a dequeue returns the waiting patient with the highest
//!   priority, ties broken first-come first-served.
//! - **Accounting**: `0 <= available <= capacity` for every pool at all
//!   times, and every treatment returns exactly what it took.
//! - **Deadlock freedom**: blocking acquisitions follow one global order,
//!   doctor then nurse then exam room. The ventilator is only ever tried.
//! - **Drain on shutdown**: workers finish the patient they hold and empty
//!   the queue before terminating.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use er_admission::builders::build_simulation;
//! use er_admission::config::SimulationConfig;
//! use er_admission::core::LogObserver;
//!
//! # fn main() -> er_admission::core::AppResult<()> {
//! let cfg = SimulationConfig {
//!     run_duration_ms: 5_000,
//!     seed: Some(7),
//!     ..SimulationConfig::default()
//! };
//! let report = build_simulation(&cfg, Arc::new(LogObserver))?.run()?;
//! assert_eq!(report.remaining_in_queue, 0);
//! println!("treated {} of {} arrivals", report.treated(), report.arrivals);
//! # Ok(())
//! # }
//! ```
//!
//! For full lifecycle scenarios, see `tests/simulation_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Pools, queue, workers, controllers and the events they emit.
pub mod core;
/// Configuration models and environment loading.
pub mod config;
/// Builders to construct a simulation from configuration.
pub mod builders;
/// Observer sinks that forward or render events.
pub mod infra;
/// Simulation lifecycle and async adapters.
pub mod runtime;
/// Shared utilities.
pub mod util;
