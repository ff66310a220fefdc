//! Tests for utility types

use er_admission::util::{now_ms, PatientId, Priority, ResourceKind};

#[test]
fn test_priority_ordering() {
    assert!(Priority::High < Priority::Medium);
    assert!(Priority::Medium < Priority::Low);
    let mut sorted = vec![Priority::Low, Priority::High, Priority::Medium];
    sorted.sort();
    assert_eq!(sorted, Priority::ALL.to_vec());
}

#[test]
fn test_only_high_needs_ventilator() {
    assert!(Priority::High.needs_ventilator());
    assert!(!Priority::Medium.needs_ventilator());
    assert!(!Priority::Low.needs_ventilator());
}

#[test]
fn test_priority_display_and_serde() {
    assert_eq!(Priority::Medium.to_string(), "Medium");
    assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
    let parsed: Priority = serde_json::from_str("\"low\"").unwrap();
    assert_eq!(parsed, Priority::Low);
}

#[test]
fn test_resource_kind_names() {
    assert_eq!(ResourceKind::ExamRoom.to_string(), "exam room");
    assert_eq!(ResourceKind::ExamRoom.plural(), "Rooms");
    assert_eq!(
        serde_json::to_string(&ResourceKind::ExamRoom).unwrap(),
        "\"exam_room\""
    );
    assert!(!ResourceKind::MANDATORY.contains(&ResourceKind::Ventilator));
}

#[test]
fn test_patient_id() {
    let id: PatientId = 12345;
    assert_eq!(id, 12345);
}

#[test]
fn test_now_ms_is_after_epoch() {
    assert!(now_ms() > 1_600_000_000_000);
}
