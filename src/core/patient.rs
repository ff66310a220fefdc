//! Patients and the factory that stamps their identity.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::util::serde::{PatientId, Priority};

/// A unit of work awaiting treatment. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    /// Unique identifier.
    pub id: PatientId,
    /// Human-readable label, `Patient_<id>` when built by [`PatientFactory`].
    pub label: String,
    /// Triage priority.
    pub priority: Priority,
    /// Global arrival order, the tie-break within a priority tier.
    pub arrival_sequence: u64,
}

impl Patient {
    /// Build a patient from explicit parts.
    pub fn new(
        id: PatientId,
        label: impl Into<String>,
        priority: Priority,
        arrival_sequence: u64,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            priority,
            arrival_sequence,
        }
    }

    /// Ordering key compared lexicographically by the admission queue.
    #[must_use]
    pub const fn queue_key(&self) -> (u8, u64) {
        (self.priority.rank(), self.arrival_sequence)
    }
}

/// Assigns ids and arrival sequence numbers atomically.
///
/// Ids start at 1. The sequence counter is separate so that patients built
/// elsewhere (tests, replays) can share one arrival order with generated ones.
#[derive(Debug)]
pub struct PatientFactory {
    next_id: AtomicU64,
    next_sequence: AtomicU64,
}

impl Default for PatientFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientFactory {
    /// Create a factory whose first patient gets id 1 and sequence 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            next_sequence: AtomicU64::new(1),
        }
    }

    /// Take the next arrival sequence number.
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence.fetch_add(1, Ordering::Relaxed)
    }

    /// Create a new patient with the given priority.
    ///
    /// The label is derived from the same id value that is stored.
    pub fn admit(&self, priority: Priority) -> Patient {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let arrival_sequence = self.next_sequence();
        Patient::new(id, format!("Patient_{id}"), priority, arrival_sequence)
    }

    /// Number of patients created so far.
    pub fn admitted(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed) - 1
    }
}
