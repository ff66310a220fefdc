//! In-memory priority storage for waiting patients.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::core::{Patient, PatientQueue};

/// Wrapper making a patient orderable by `(priority rank, arrival sequence)`.
///
/// `BinaryHeap` pops the greatest element, so the comparison is reversed:
/// the smaller key is the greater entry.
#[derive(Debug)]
struct QueuedPatient {
    patient: Patient,
}

impl PartialEq for QueuedPatient {
    fn eq(&self, other: &Self) -> bool {
        self.patient.queue_key() == other.patient.queue_key()
    }
}

impl Eq for QueuedPatient {}

impl PartialOrd for QueuedPatient {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedPatient {
    fn cmp(&self, other: &Self) -> Ordering {
        other.patient.queue_key().cmp(&self.patient.queue_key())
    }
}

/// Binary-heap queue of patients. O(log n) enqueue and dequeue.
#[derive(Debug, Default)]
pub struct InMemoryQueue {
    patients: BinaryHeap<QueuedPatient>,
}

impl InMemoryQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty queue with room for `capacity` patients.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            patients: BinaryHeap::with_capacity(capacity),
        }
    }
}

impl PatientQueue for InMemoryQueue {
    fn enqueue(&mut self, patient: Patient) {
        self.patients.push(QueuedPatient { patient });
    }

    fn dequeue(&mut self) -> Option<Patient> {
        self.patients.pop().map(|q| q.patient)
    }

    fn peek(&self) -> Option<&Patient> {
        self.patients.peek().map(|q| &q.patient)
    }

    fn len(&self) -> usize {
        self.patients.len()
    }
}
