//! Simulation lifecycle on dedicated OS threads.
//!
//! [`Simulation::start`] spawns N treatment workers, one arrival source, one
//! capacity controller and one fatigue controller. Shutdown is ordered so
//! that nothing queued is abandoned:
//!
//! 1. trigger the shutdown signal (sleepers wake, the fatigue controller
//!    returns any staff on break);
//! 2. join the arrival source and both controllers, so no new patient can
//!    appear;
//! 3. shut the admission queue, waking idle workers;
//! 4. join the workers, which drain the queue to empty before terminating.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::SimulationConfig;
use crate::core::{
    AdmissionQueue, ArrivalSource, CapacityController, DelayPolicy, FatigueController,
    FatigueSummary, HospitalResources, Observer, PatientFactory, RandomSource, ResourceSnapshot,
    ShutdownSignal, SimulationError, TreatmentWorker, WorkerProbe, WorkerSummary,
};

/// Totals collected after every component has terminated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Identifier of this run.
    pub run_id: Uuid,
    /// Wall-clock time from start to full drain.
    pub elapsed_ms: u128,
    /// Patients produced by the arrival source.
    pub arrivals: u64,
    /// Per-worker totals, ordered by worker id.
    pub workers: Vec<WorkerSummary>,
    /// Units added by the capacity controller.
    pub capacity_added: u64,
    /// Fatigue controller totals.
    pub fatigue: FatigueSummary,
    /// Pool levels after the drain.
    pub final_resources: ResourceSnapshot,
    /// Patients still queued at the end. Always zero after a clean drain.
    pub remaining_in_queue: usize,
}

impl SimulationReport {
    /// Treatments completed across all workers.
    #[must_use]
    pub fn treated(&self) -> u64 {
        self.workers.iter().map(|w| w.treated).sum()
    }

    /// Treatments that went ahead without a needed ventilator.
    #[must_use]
    pub fn degraded(&self) -> u64 {
        self.workers.iter().map(|w| w.degraded).sum()
    }
}

/// A configured, not yet started simulation.
///
/// Shared state is created here and injected into every component when the
/// simulation starts. Use the accessors to pre-load the queue or inspect
/// pools from tests.
pub struct Simulation {
    config: SimulationConfig,
    run_id: Uuid,
    queue: Arc<AdmissionQueue>,
    resources: HospitalResources,
    factory: Arc<PatientFactory>,
    delays: Arc<dyn DelayPolicy>,
    observer: Arc<dyn Observer>,
    arrival_random: Box<dyn RandomSource>,
    capacity_random: Box<dyn RandomSource>,
    shutdown: ShutdownSignal,
}

impl Simulation {
    /// Assemble a simulation from validated config and injected policies.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidConfig`] if `config` fails validation.
    pub fn new(
        config: SimulationConfig,
        delays: Arc<dyn DelayPolicy>,
        observer: Arc<dyn Observer>,
        arrival_random: Box<dyn RandomSource>,
        capacity_random: Box<dyn RandomSource>,
    ) -> Result<Self, SimulationError> {
        config.validate().map_err(SimulationError::InvalidConfig)?;
        Ok(Self {
            run_id: Uuid::new_v4(),
            queue: Arc::new(AdmissionQueue::new()),
            resources: HospitalResources::new(config.capacities),
            factory: Arc::new(PatientFactory::new()),
            delays,
            observer,
            arrival_random,
            capacity_random,
            shutdown: ShutdownSignal::new(),
            config,
        })
    }

    /// Identifier of this run.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Shared admission queue.
    #[must_use]
    pub const fn queue(&self) -> &Arc<AdmissionQueue> {
        &self.queue
    }

    /// Shared resource pools.
    #[must_use]
    pub const fn resources(&self) -> &HospitalResources {
        &self.resources
    }

    /// Patient factory used by the arrival source.
    #[must_use]
    pub const fn factory(&self) -> &Arc<PatientFactory> {
        &self.factory
    }

    /// Shutdown signal; triggering it early ends [`run`](Self::run) early.
    #[must_use]
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Run for the configured duration, then shut down and drain.
    ///
    /// # Errors
    ///
    /// Propagates spawn failures and component panics.
    pub fn run(self) -> Result<SimulationReport, SimulationError> {
        let duration = self.config.run_duration();
        self.run_for(duration)
    }

    /// Run for `duration` (or until the shutdown signal fires), then shut
    /// down and drain.
    ///
    /// # Errors
    ///
    /// Propagates spawn failures and component panics.
    pub fn run_for(self, duration: Duration) -> Result<SimulationReport, SimulationError> {
        let running = self.start()?;
        running.shutdown.sleep(duration);
        running.shutdown_and_wait()
    }

    /// Spawn every component and return immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Spawn`] if any thread fails to start. Threads
    /// already started are shut down and joined first.
    pub fn start(self) -> Result<RunningSimulation, SimulationError> {
        let Self {
            config,
            run_id,
            queue,
            resources,
            factory,
            delays,
            observer,
            arrival_random,
            capacity_random,
            shutdown,
        } = self;

        info!(
            %run_id,
            workers = config.worker_count,
            resources = %resources.snapshot(),
            "simulation starting"
        );

        let mut running = RunningSimulation {
            run_id,
            started: Instant::now(),
            queue: Arc::clone(&queue),
            resources: resources.clone(),
            shutdown: shutdown.clone(),
            workers: Vec::with_capacity(config.worker_count),
            arrival: None,
            capacity: None,
            fatigue: None,
        };

        for worker_id in 1..=config.worker_count {
            let worker = TreatmentWorker::new(
                worker_id,
                Arc::clone(&queue),
                resources.clone(),
                Arc::clone(&delays),
                Arc::clone(&observer),
            );
            let probe = worker.probe();
            match spawn_component(format!("er-worker-{worker_id}"), move || worker.run()) {
                Ok(handle) => running.workers.push((probe, handle)),
                Err(e) => return Err(running.abort(e)),
            }
        }

        let arrival = ArrivalSource::new(
            Arc::clone(&queue),
            resources.clone(),
            factory,
            Arc::clone(&delays),
            arrival_random,
            Arc::clone(&observer),
            shutdown.clone(),
        );
        match spawn_component("er-arrivals".into(), move || arrival.run()) {
            Ok(handle) => running.arrival = Some(handle),
            Err(e) => return Err(running.abort(e)),
        }

        let capacity = CapacityController::new(
            Arc::clone(&queue),
            resources.clone(),
            capacity_random,
            Arc::clone(&observer),
            shutdown.clone(),
            Duration::from_millis(config.capacity_controller.interval_ms),
            config.capacity_controller.max_increment,
        );
        match spawn_component("er-capacity".into(), move || capacity.run()) {
            Ok(handle) => running.capacity = Some(handle),
            Err(e) => return Err(running.abort(e)),
        }

        let fatigue = FatigueController::new(
            resources,
            config.fatigue.target,
            observer,
            shutdown,
            Duration::from_millis(config.fatigue.interval_ms),
            Duration::from_millis(config.fatigue.break_ms),
        );
        match spawn_component("er-fatigue".into(), move || fatigue.run()) {
            Ok(handle) => running.fatigue = Some(handle),
            Err(e) => return Err(running.abort(e)),
        }

        Ok(running)
    }
}

/// Handles to a started simulation.
pub struct RunningSimulation {
    run_id: Uuid,
    started: Instant,
    queue: Arc<AdmissionQueue>,
    resources: HospitalResources,
    shutdown: ShutdownSignal,
    workers: Vec<(WorkerProbe, JoinHandle<WorkerSummary>)>,
    arrival: Option<JoinHandle<u64>>,
    capacity: Option<JoinHandle<u64>>,
    fatigue: Option<JoinHandle<FatigueSummary>>,
}

impl RunningSimulation {
    /// Identifier of this run.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Shared admission queue.
    #[must_use]
    pub const fn queue(&self) -> &Arc<AdmissionQueue> {
        &self.queue
    }

    /// Shared resource pools.
    #[must_use]
    pub const fn resources(&self) -> &HospitalResources {
        &self.resources
    }

    /// Probes for every worker, ordered by worker id.
    pub fn probes(&self) -> impl Iterator<Item = &WorkerProbe> {
        self.workers.iter().map(|(probe, _)| probe)
    }

    /// Shutdown signal shared by every component.
    #[must_use]
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Broadcast shutdown and wait for every component to terminate.
    ///
    /// Workers finish the patient they hold and drain the queue before
    /// terminating.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::ComponentPanicked`] naming the first
    /// component that panicked. Every other component is still joined.
    pub fn shutdown_and_wait(mut self) -> Result<SimulationReport, SimulationError> {
        self.shutdown.trigger();

        let mut first_panic: Option<String> = None;
        let arrivals = join_component("er-arrivals", self.arrival.take(), &mut first_panic);
        let capacity_added = join_component("er-capacity", self.capacity.take(), &mut first_panic);
        let fatigue = join_component("er-fatigue", self.fatigue.take(), &mut first_panic);
        debug!(queued = self.queue.len(), "producers stopped, draining queue");

        self.queue.shutdown();

        let mut workers = Vec::with_capacity(self.workers.len());
        for (probe, handle) in self.workers.drain(..) {
            let name = format!("er-worker-{}", probe.worker_id());
            workers.push(join_component(&name, Some(handle), &mut first_panic));
        }

        if let Some(component) = first_panic {
            return Err(SimulationError::ComponentPanicked(component));
        }

        let report = SimulationReport {
            run_id: self.run_id,
            elapsed_ms: self.started.elapsed().as_millis(),
            arrivals,
            workers,
            capacity_added,
            fatigue,
            final_resources: self.resources.snapshot(),
            remaining_in_queue: self.queue.len(),
        };
        info!(
            run_id = %report.run_id,
            arrivals = report.arrivals,
            treated = report.treated(),
            degraded = report.degraded(),
            capacity_added = report.capacity_added,
            breaks = report.fatigue.breaks_taken,
            "simulation finished"
        );
        Ok(report)
    }

    fn abort(self, err: SimulationError) -> SimulationError {
        error!(run_id = %self.run_id, "simulation failed to start: {err}");
        if let Err(join_err) = self.shutdown_and_wait() {
            warn!("cleanup after failed start: {join_err}");
        }
        err
    }
}

impl Drop for RunningSimulation {
    /// Dropping without [`shutdown_and_wait`](Self::shutdown_and_wait) stops
    /// every component but does not join them. Workers still drain the queue
    /// in the background.
    fn drop(&mut self) {
        let unjoined = self.arrival.is_some()
            || self.capacity.is_some()
            || self.fatigue.is_some()
            || !self.workers.is_empty();
        if !unjoined {
            return;
        }
        warn!(run_id = %self.run_id, "running simulation dropped without shutdown_and_wait");
        self.shutdown.trigger();
        self.queue.shutdown();
    }
}

fn spawn_component<T, F>(name: String, f: F) -> Result<JoinHandle<T>, SimulationError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    thread::Builder::new()
        .name(name.clone())
        .spawn(f)
        .map_err(|source| SimulationError::Spawn {
            component: name,
            source,
        })
}

fn join_component<T: Default>(
    name: &str,
    handle: Option<JoinHandle<T>>,
    first_panic: &mut Option<String>,
) -> T {
    let Some(handle) = handle else {
        return T::default();
    };
    match handle.join() {
        Ok(value) => {
            debug!(component = name, "component joined");
            value
        }
        Err(_) => {
            error!(component = name, "component panicked");
            first_panic.get_or_insert_with(|| name.to_string());
            T::default()
        }
    }
}
