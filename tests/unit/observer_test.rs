//! Tests for events and observer sinks

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use er_admission::core::{
    EventKind, EventRole, HospitalResources, InMemoryObserver, Observer, Patient, PatientRef,
    ResourceCapacities, SimEvent, VentilatorOutcome,
};
use er_admission::infra::observer::{ChannelObserver, TableObserver};
use er_admission::util::serde::{Priority, ResourceKind};

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn resources() -> HospitalResources {
    HospitalResources::new(ResourceCapacities::default())
}

fn started(ventilator: VentilatorOutcome) -> SimEvent {
    let patient = Patient::new(4, "Patient_4", Priority::High, 4);
    SimEvent::new(
        EventKind::TreatmentStarted {
            worker_id: 2,
            patient: PatientRef::from(&patient),
            ventilator,
        },
        resources().snapshot(),
    )
}

#[test]
fn test_treatment_row_is_keyed_by_worker() {
    let row = started(VentilatorOutcome::Allocated).status_row().unwrap();
    assert_eq!(row.role, EventRole::Doctor);
    assert_eq!(row.id, 2);
    assert_eq!(row.label, "Patient_4");
    assert_eq!(row.status, "Treating...");
}

#[test]
fn test_controller_events_render_as_lines() {
    let event = SimEvent::new(
        EventKind::CapacityAdded {
            doctors: 1,
            nurses: 0,
            exam_rooms: 1,
        },
        resources().snapshot(),
    );
    assert!(event.status_row().is_none());
    assert!(event.to_string().starts_with("Additional resources: 1 doctor(s)"));

    let on_break = SimEvent::new(
        EventKind::BreakStarted {
            kind: ResourceKind::Doctor,
        },
        resources().snapshot(),
    );
    assert_eq!(on_break.to_string(), "A doctor has gone on a break");
}

#[test]
fn test_event_serializes_with_type_tag() {
    let json = serde_json::to_value(started(VentilatorOutcome::Unavailable)).unwrap();
    assert_eq!(json["kind"]["type"], "treatment_started");
    assert_eq!(json["kind"]["ventilator"], "unavailable");
}

#[test]
fn test_in_memory_observer_is_bounded() {
    let observer = InMemoryObserver::new(2);
    for _ in 0..5 {
        observer.record(started(VentilatorOutcome::Allocated));
    }
    assert_eq!(observer.events().len(), 2);
}

#[test]
fn test_table_rows_line_up_with_header() {
    let header = TableObserver::header();
    let title = header.lines().next().unwrap();
    let row = TableObserver::format_event(&started(VentilatorOutcome::Unavailable));
    assert_eq!(row.len(), title.len());
    assert!(row.contains("Treating (ventilator unavailable)"));
    assert!(title.trim_start().starts_with("Entity"));
}

#[test]
fn test_table_writes_through_channel() {
    let buf = Captured::default();
    let table = Arc::new(TableObserver::new(buf.clone()));
    table.write_header().unwrap();
    let (observer, pump) = ChannelObserver::forwarding_to(table).unwrap();
    observer.record(started(VentilatorOutcome::NotRequired));
    drop(observer);
    assert_eq!(pump.join().unwrap(), 1);

    let text = String::from_utf8(buf.0.lock().clone()).unwrap();
    assert_eq!(text.lines().count(), 3);
    assert!(text.contains("Patient_4"));
}
