//! Thread-safe priority waiting list with blocking dequeue.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::core::Patient;
use crate::infra::queue::InMemoryQueue;

/// Storage backend for waiting patients.
///
/// Implementations must dequeue in `(priority rank, arrival sequence)` order.
/// They are not synchronized; [`AdmissionQueue`] provides the locking.
pub trait PatientQueue: Send {
    /// Insert a patient.
    fn enqueue(&mut self, patient: Patient);
    /// Remove the most urgent, earliest-arrived patient.
    fn dequeue(&mut self) -> Option<Patient>;
    /// Look at the patient `dequeue` would return.
    fn peek(&self) -> Option<&Patient>;
    /// Number of waiting patients.
    fn len(&self) -> usize;
    /// Whether no patient is waiting.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of a blocking dequeue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dequeued {
    /// The next patient to treat.
    Patient(Patient),
    /// The queue is shut down and fully drained.
    Shutdown,
}

impl Dequeued {
    /// The patient, if any.
    #[must_use]
    pub fn into_patient(self) -> Option<Patient> {
        match self {
            Self::Patient(p) => Some(p),
            Self::Shutdown => None,
        }
    }
}

struct QueueState<Q> {
    patients: Q,
    shutdown: bool,
}

/// Ordered waiting list shared by arrival sources and treatment workers.
///
/// Dequeue blocks until a patient is waiting or the queue is shut down.
/// After shutdown, patients already queued keep coming out until the queue
/// is empty; only then does dequeue return [`Dequeued::Shutdown`].
pub struct AdmissionQueue<Q = InMemoryQueue> {
    state: Mutex<QueueState<Q>>,
    ready: Condvar,
}

impl Default for AdmissionQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl AdmissionQueue {
    /// Create an empty queue backed by a binary heap.
    #[must_use]
    pub fn new() -> Self {
        Self::with_storage(InMemoryQueue::new())
    }
}

impl<Q: PatientQueue> AdmissionQueue<Q> {
    /// Create a queue over a specific storage backend.
    pub const fn with_storage(patients: Q) -> Self {
        Self {
            state: Mutex::new(QueueState {
                patients,
                shutdown: false,
            }),
            ready: Condvar::new(),
        }
    }

    /// Insert a patient and wake one blocked dequeuer. Returns the depth
    /// after insertion.
    ///
    /// Patients enqueued after shutdown are still accepted and drained.
    pub fn enqueue(&self, patient: Patient) -> usize {
        let mut state = self.state.lock();
        if state.shutdown {
            tracing::warn!(patient_id = patient.id, "patient enqueued after shutdown; it will be drained");
        }
        state.patients.enqueue(patient);
        let depth = state.patients.len();
        drop(state);
        self.ready.notify_one();
        depth
    }

    /// Block until a patient is waiting or the queue is shut down and empty.
    pub fn dequeue(&self) -> Dequeued {
        let mut state = self.state.lock();
        loop {
            if let Some(patient) = state.patients.dequeue() {
                return Dequeued::Patient(patient);
            }
            if state.shutdown {
                return Dequeued::Shutdown;
            }
            self.ready.wait(&mut state);
        }
    }

    /// Like [`dequeue`](Self::dequeue) but gives up after `timeout`.
    ///
    /// Returns `None` on timeout without removing anything. A timeout too
    /// large to express as a deadline waits without one.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Option<Dequeued> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return Some(self.dequeue());
        };
        let mut state = self.state.lock();
        loop {
            if let Some(patient) = state.patients.dequeue() {
                return Some(Dequeued::Patient(patient));
            }
            if state.shutdown {
                return Some(Dequeued::Shutdown);
            }
            if self.ready.wait_until(&mut state, deadline).timed_out() {
                return state.patients.dequeue().map(Dequeued::Patient);
            }
        }
    }

    /// Take the next patient if one is waiting. Never blocks.
    pub fn try_dequeue(&self) -> Option<Patient> {
        self.state.lock().patients.dequeue()
    }

    /// Set the shutdown flag and wake every blocked dequeuer.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        state.shutdown = true;
        let remaining = state.patients.len();
        drop(state);
        tracing::debug!(remaining, "admission queue shutting down");
        self.ready.notify_all();
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shutdown(&self) -> bool {
        self.state.lock().shutdown
    }

    /// Waiting patients right now.
    pub fn len(&self) -> usize {
        self.state.lock().patients.len()
    }

    /// Whether no patient is waiting right now.
    pub fn is_empty(&self) -> bool {
        self.state.lock().patients.is_empty()
    }

    /// Run `f` with the current depth while holding the queue guard.
    ///
    /// Enqueues and dequeues wait until `f` returns, so a report built inside
    /// `f` sees no queue movement. `f` must not block on a resource pool.
    pub fn report<R>(&self, f: impl FnOnce(usize) -> R) -> R {
        let state = self.state.lock();
        f(state.patients.len())
    }
}
