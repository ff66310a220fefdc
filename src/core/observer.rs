//! Observer events and in-process sinks.
//!
//! Components report arrivals, treatment start/finish and controller activity
//! as [`SimEvent`]s. Sinks are informational only and must return quickly;
//! anything slow belongs behind `infra::observer::ChannelObserver`.

use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::{Patient, ResourceSnapshot, VentilatorOutcome};
use crate::util::clock::now_ms;
use crate::util::serde::{PatientId, Priority, ResourceKind};

/// Who a table row is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventRole {
    /// Row keyed by patient id.
    Patient,
    /// Row keyed by the treating worker's id.
    Doctor,
}

impl fmt::Display for EventRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Patient => "Patient",
            Self::Doctor => "Doctor",
        })
    }
}

/// Identity of the patient an event refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRef {
    /// Patient id.
    pub id: PatientId,
    /// Patient label.
    pub label: String,
    /// Patient priority.
    pub priority: Priority,
}

impl From<&Patient> for PatientRef {
    fn from(p: &Patient) -> Self {
        Self {
            id: p.id,
            label: p.label.clone(),
            priority: p.priority,
        }
    }
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// A patient joined the admission queue.
    PatientArrived {
        /// The patient.
        patient: PatientRef,
        /// Queue depth after the insert.
        queue_depth: usize,
    },
    /// A worker holds a full lease and started treating.
    TreatmentStarted {
        /// Worker id, starting at 1.
        worker_id: usize,
        /// The patient.
        patient: PatientRef,
        /// Ventilator result.
        ventilator: VentilatorOutcome,
    },
    /// A worker released its lease.
    TreatmentFinished {
        /// Worker id, starting at 1.
        worker_id: usize,
        /// The patient.
        patient: PatientRef,
    },
    /// Shift change or emergency added units.
    CapacityAdded {
        /// Doctors added.
        doctors: u32,
        /// Nurses added.
        nurses: u32,
        /// Exam rooms added.
        exam_rooms: u32,
    },
    /// A staff unit went on break.
    BreakStarted {
        /// Pool the unit was taken from.
        kind: ResourceKind,
    },
    /// A staff unit returned from break.
    BreakEnded {
        /// Pool the unit returned to.
        kind: ResourceKind,
    },
    /// No idle unit could go on break this cycle.
    BreakSkipped {
        /// Pool that was fully busy.
        kind: ResourceKind,
    },
}

/// A timestamped event with the pool levels observed when it was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimEvent {
    /// Milliseconds since the Unix epoch.
    pub at_ms: u128,
    /// Event payload.
    pub kind: EventKind,
    /// Pool levels at emission time. Display only.
    pub resources: ResourceSnapshot,
}

/// Flattened `(role, id, label, priority, status)` view of a patient event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    /// Row role.
    pub role: EventRole,
    /// Patient id or worker id depending on `role`.
    pub id: u64,
    /// Patient label.
    pub label: String,
    /// Patient priority.
    pub priority: Priority,
    /// Human-readable status.
    pub status: &'static str,
}

impl SimEvent {
    /// Stamp an event with the current time.
    #[must_use]
    pub fn new(kind: EventKind, resources: ResourceSnapshot) -> Self {
        Self {
            at_ms: now_ms(),
            kind,
            resources,
        }
    }

    /// Table row for patient events, `None` for controller events.
    #[must_use]
    pub fn status_row(&self) -> Option<StatusRow> {
        let (role, id, patient, status) = match &self.kind {
            EventKind::PatientArrived { patient, .. } => {
                (EventRole::Patient, patient.id, patient, "Arrived")
            }
            EventKind::TreatmentStarted {
                worker_id,
                patient,
                ventilator,
            } => {
                let status = if *ventilator == VentilatorOutcome::Unavailable {
                    "Treating (ventilator unavailable)"
                } else {
                    "Treating..."
                };
                (EventRole::Doctor, *worker_id as u64, patient, status)
            }
            EventKind::TreatmentFinished { worker_id, patient } => {
                (EventRole::Doctor, *worker_id as u64, patient, "Finished")
            }
            _ => return None,
        };
        Some(StatusRow {
            role,
            id,
            label: patient.label.clone(),
            priority: patient.priority,
            status,
        })
    }
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(row) = self.status_row() {
            return write!(
                f,
                "{} {} {} [{}] {} ({})",
                row.role, row.id, row.label, row.priority, row.status, self.resources
            );
        }
        match &self.kind {
            EventKind::CapacityAdded {
                doctors,
                nurses,
                exam_rooms,
            } => write!(
                f,
                "Additional resources: {doctors} doctor(s), {nurses} nurse(s), and {exam_rooms} exam room(s) added due to shift changes or emergencies"
            ),
            EventKind::BreakStarted { kind } => write!(f, "A {kind} has gone on a break"),
            EventKind::BreakEnded { kind } => {
                write!(f, "A {kind} has returned from a break, increasing availability")
            }
            EventKind::BreakSkipped { kind } => {
                write!(f, "No idle {kind} available for a break")
            }
            _ => Ok(()),
        }
    }
}

/// Event sink abstraction. Called concurrently from every component.
pub trait Observer: Send + Sync {
    /// Record an event. Must not block meaningfully.
    fn record(&self, event: SimEvent);
}

/// In-memory bounded sink for testing and dev.
#[derive(Debug)]
pub struct InMemoryObserver {
    events: Mutex<VecDeque<SimEvent>>,
    max_events: usize,
}

impl Default for InMemoryObserver {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl InMemoryObserver {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events.min(1024))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<SimEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Stored events matching a predicate.
    pub fn matching(&self, pred: impl Fn(&EventKind) -> bool) -> Vec<SimEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| pred(&e.kind))
            .cloned()
            .collect()
    }
}

impl Observer for InMemoryObserver {
    fn record(&self, event: SimEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Sink that emits every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn record(&self, event: SimEvent) {
        match &event.kind {
            EventKind::TreatmentStarted {
                ventilator: VentilatorOutcome::Unavailable,
                ..
            }
            | EventKind::BreakSkipped { .. } => tracing::warn!(target: "er_admission::events", "{event}"),
            _ => tracing::info!(target: "er_admission::events", "{event}"),
        }
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn record(&self, _event: SimEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{HospitalResources, ResourceCapacities};

    fn snapshot() -> ResourceSnapshot {
        HospitalResources::new(ResourceCapacities::default()).snapshot()
    }

    fn patient_ref() -> PatientRef {
        PatientRef::from(&Patient::new(5, "Patient_5", Priority::High, 5))
    }

    #[test]
    fn test_in_memory_observer_bounded() {
        let sink = InMemoryObserver::new(2);
        for kind in [ResourceKind::Doctor, ResourceKind::Nurse, ResourceKind::ExamRoom] {
            sink.record(SimEvent::new(EventKind::BreakSkipped { kind }, snapshot()));
        }
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::BreakSkipped { kind: ResourceKind::Nurse });
    }

    #[test]
    fn test_status_row_for_degraded_treatment() {
        let event = SimEvent::new(
            EventKind::TreatmentStarted {
                worker_id: 2,
                patient: patient_ref(),
                ventilator: VentilatorOutcome::Unavailable,
            },
            snapshot(),
        );
        let row = event.status_row().unwrap();
        assert_eq!(row.role, EventRole::Doctor);
        assert_eq!(row.id, 2);
        assert_eq!(row.label, "Patient_5");
        assert!(row.status.contains("unavailable"));
    }

    #[test]
    fn test_controller_events_have_no_row() {
        let event = SimEvent::new(
            EventKind::CapacityAdded {
                doctors: 1,
                nurses: 0,
                exam_rooms: 1,
            },
            snapshot(),
        );
        assert!(event.status_row().is_none());
        assert!(event.to_string().contains("1 doctor(s)"));
    }

    #[test]
    fn test_event_serializes_tagged() {
        let event = SimEvent::new(
            EventKind::PatientArrived {
                patient: patient_ref(),
                queue_depth: 1,
            },
            snapshot(),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"]["type"], "patient_arrived");
        assert_eq!(json["kind"]["patient"]["priority"], "high");
    }
}
