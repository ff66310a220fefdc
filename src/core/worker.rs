//! Treatment workers: dequeue, lease, treat, release, repeat.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{
    AdmissionQueue, DelayPolicy, Dequeued, EventKind, HospitalResources, Observer, Patient,
    PatientRef, SimEvent, TreatmentLease, VentilatorOutcome,
};
use crate::util::serde::PatientId;

/// Lifecycle state of a [`TreatmentWorker`].
///
/// Normal cycle: `Idle → Dequeuing → AcquiringResources → Treating →
/// Releasing → Idle`. When dequeue reports shutdown: `Dequeuing → Draining →
/// Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum WorkerState {
    /// Between cycles.
    Idle = 0,
    /// Waiting on the admission queue.
    Dequeuing = 1,
    /// Taking doctor, nurse, exam room (and maybe a ventilator).
    AcquiringResources = 2,
    /// Holding the lease for the treatment duration.
    Treating = 3,
    /// Returning every unit.
    Releasing = 4,
    /// Saw the shutdown result; winding down.
    Draining = 5,
    /// Loop exited.
    Terminated = 6,
}

impl WorkerState {
    const fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Idle,
            1 => Self::Dequeuing,
            2 => Self::AcquiringResources,
            3 => Self::Treating,
            4 => Self::Releasing,
            5 => Self::Draining,
            _ => Self::Terminated,
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug)]
struct WorkerShared {
    state: AtomicU8,
    treated: AtomicU64,
    degraded: AtomicU64,
}

/// Read-only window onto a running worker.
#[derive(Debug, Clone)]
pub struct WorkerProbe {
    worker_id: usize,
    shared: Arc<WorkerShared>,
}

impl WorkerProbe {
    /// Worker id.
    #[must_use]
    pub const fn worker_id(&self) -> usize {
        self.worker_id
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    /// Treatments completed so far.
    #[must_use]
    pub fn treated(&self) -> u64 {
        self.shared.treated.load(Ordering::Relaxed)
    }
}

/// Outcome of one completed treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentRecord {
    /// Patient treated.
    pub patient_id: PatientId,
    /// Ventilator result.
    pub ventilator: VentilatorOutcome,
}

/// Totals returned when a worker terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkerSummary {
    /// Worker id.
    pub worker_id: usize,
    /// Treatments completed.
    pub treated: u64,
    /// Treatments that went ahead without a needed ventilator.
    pub degraded: u64,
}

/// One of N concurrent workers.
///
/// A worker never holds the queue guard while waiting on a pool, and always
/// finishes a treatment it has started, even after shutdown.
pub struct TreatmentWorker {
    id: usize,
    queue: Arc<AdmissionQueue>,
    resources: HospitalResources,
    delays: Arc<dyn DelayPolicy>,
    observer: Arc<dyn Observer>,
    shared: Arc<WorkerShared>,
}

impl TreatmentWorker {
    /// Create a worker. Ids conventionally start at 1.
    #[must_use]
    pub fn new(
        id: usize,
        queue: Arc<AdmissionQueue>,
        resources: HospitalResources,
        delays: Arc<dyn DelayPolicy>,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self {
            id,
            queue,
            resources,
            delays,
            observer,
            shared: Arc::new(WorkerShared {
                state: AtomicU8::new(WorkerState::Idle as u8),
                treated: AtomicU64::new(0),
                degraded: AtomicU64::new(0),
            }),
        }
    }

    /// Worker id.
    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Handle for observing this worker from another thread.
    #[must_use]
    pub fn probe(&self) -> WorkerProbe {
        WorkerProbe {
            worker_id: self.id,
            shared: Arc::clone(&self.shared),
        }
    }

    fn set_state(&self, state: WorkerState) {
        self.shared.state.store(state as u8, Ordering::Release);
    }

    /// Loop until the queue reports shutdown, then return totals.
    pub fn run(self) -> WorkerSummary {
        debug!(worker_id = self.id, "treatment worker started");
        while self.run_once().is_some() {}
        let summary = WorkerSummary {
            worker_id: self.id,
            treated: self.shared.treated.load(Ordering::Relaxed),
            degraded: self.shared.degraded.load(Ordering::Relaxed),
        };
        info!(
            worker_id = self.id,
            treated = summary.treated,
            degraded = summary.degraded,
            "treatment worker terminated"
        );
        summary
    }

    /// Run a single cycle. Returns `None` once the worker has terminated.
    pub fn run_once(&self) -> Option<TreatmentRecord> {
        self.set_state(WorkerState::Idle);
        self.set_state(WorkerState::Dequeuing);
        let patient = match self.queue.dequeue() {
            Dequeued::Patient(patient) => patient,
            Dequeued::Shutdown => {
                self.set_state(WorkerState::Draining);
                debug!(worker_id = self.id, "queue drained, worker exiting");
                self.set_state(WorkerState::Terminated);
                return None;
            }
        };
        Some(self.treat(&patient))
    }

    fn treat(&self, patient: &Patient) -> TreatmentRecord {
        self.set_state(WorkerState::AcquiringResources);
        debug!(worker_id = self.id, patient_id = patient.id, priority = %patient.priority, "acquiring resources");
        let lease = TreatmentLease::acquire(&self.resources, patient.priority);
        let ventilator = lease.ventilator();
        if lease.is_degraded() {
            self.shared.degraded.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(worker_id = self.id, patient_id = patient.id, "ventilator unavailable for {}", patient.label);
        }

        self.set_state(WorkerState::Treating);
        self.observer.record(SimEvent::new(
            EventKind::TreatmentStarted {
                worker_id: self.id,
                patient: PatientRef::from(patient),
                ventilator,
            },
            self.resources.snapshot(),
        ));
        thread::sleep(self.delays.treatment_duration(patient));

        self.set_state(WorkerState::Releasing);
        lease.release();
        self.shared.treated.fetch_add(1, Ordering::Relaxed);
        self.observer.record(SimEvent::new(
            EventKind::TreatmentFinished {
                worker_id: self.id,
                patient: PatientRef::from(patient),
            },
            self.resources.snapshot(),
        ));
        self.set_state(WorkerState::Idle);

        TreatmentRecord {
            patient_id: patient.id,
            ventilator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FixedDelays, InMemoryObserver, ResourceCapacities};
    use crate::util::serde::Priority;
    use std::time::Duration;

    fn worker(
        capacities: ResourceCapacities,
    ) -> (TreatmentWorker, Arc<AdmissionQueue>, Arc<InMemoryObserver>, HospitalResources) {
        let queue = Arc::new(AdmissionQueue::new());
        let resources = HospitalResources::new(capacities);
        let observer = Arc::new(InMemoryObserver::default());
        let delays = Arc::new(FixedDelays {
            arrival: Duration::from_millis(1),
            treatment: Duration::from_millis(1),
        });
        let w = TreatmentWorker::new(
            1,
            Arc::clone(&queue),
            resources.clone(),
            delays,
            observer.clone(),
        );
        (w, queue, observer, resources)
    }

    #[test]
    fn test_single_cycle_releases_everything() {
        let (w, queue, observer, resources) = worker(ResourceCapacities::default());
        queue.enqueue(Patient::new(1, "Patient_1", Priority::High, 1));

        let record = w.run_once().unwrap();
        assert_eq!(record.patient_id, 1);
        assert_eq!(record.ventilator, VentilatorOutcome::Allocated);
        assert_eq!(w.probe().state(), WorkerState::Idle);
        assert_eq!(w.probe().treated(), 1);
        assert_eq!(
            resources.snapshot(),
            HospitalResources::new(ResourceCapacities::default()).snapshot()
        );
        assert_eq!(observer.events().len(), 2);
    }

    #[test]
    fn test_terminates_on_shutdown() {
        let (w, queue, _observer, _resources) = worker(ResourceCapacities::default());
        queue.enqueue(Patient::new(1, "Patient_1", Priority::Low, 1));
        queue.shutdown();
        let probe = w.probe();
        let summary = w.run();
        assert_eq!(summary.treated, 1);
        assert_eq!(probe.state(), WorkerState::Terminated);
    }

    fn wait_for(probe: &WorkerProbe, state: WorkerState) -> WorkerState {
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while probe.state() != state && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        probe.state()
    }

    #[test]
    fn test_state_reports_acquiring_then_treating() {
        let queue = Arc::new(AdmissionQueue::new());
        let resources = HospitalResources::new(ResourceCapacities::default());
        let delays = Arc::new(FixedDelays {
            arrival: Duration::from_millis(1),
            treatment: Duration::from_millis(150),
        });
        let w = TreatmentWorker::new(
            1,
            Arc::clone(&queue),
            resources.clone(),
            delays,
            Arc::new(InMemoryObserver::default()),
        );
        let probe = w.probe();
        let doctors: Vec<_> = (0..resources.doctors.capacity())
            .map(|_| resources.doctors.acquire_permit())
            .collect();
        queue.enqueue(Patient::new(1, "Patient_1", Priority::Medium, 1));

        let handle = std::thread::spawn(move || w.run_once());
        assert_eq!(wait_for(&probe, WorkerState::AcquiringResources), WorkerState::AcquiringResources);
        assert_eq!(probe.treated(), 0);

        drop(doctors);
        assert_eq!(wait_for(&probe, WorkerState::Treating), WorkerState::Treating);

        let record = handle.join().unwrap().unwrap();
        assert_eq!(record.patient_id, 1);
        assert_eq!(probe.state(), WorkerState::Idle);
        assert_eq!(probe.treated(), 1);
        assert_eq!(resources.doctors.available(), resources.doctors.capacity());
    }

    #[test]
    fn test_state_round_trip() {
        for state in [
            WorkerState::Idle,
            WorkerState::Dequeuing,
            WorkerState::AcquiringResources,
            WorkerState::Treating,
            WorkerState::Releasing,
            WorkerState::Draining,
            WorkerState::Terminated,
        ] {
            assert_eq!(WorkerState::from_u8(state as u8), state);
        }
    }
}
