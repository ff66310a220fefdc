//! Tests for error types

use std::error::Error as _;
use std::io;

use er_admission::core::{AppResult, SimulationError};
use er_admission::util::serde::ResourceKind;

#[test]
fn test_invalid_config_error() {
    let err = SimulationError::InvalidConfig("worker_count must be greater than 0".to_string());
    assert_eq!(
        format!("{err}"),
        "invalid configuration: worker_count must be greater than 0"
    );
}

#[test]
fn test_config_error() {
    let err = SimulationError::Config("missing.json: not found".to_string());
    assert_eq!(format!("{err}"), "config error: missing.json: not found");
}

#[test]
fn test_insufficient_slack_error() {
    let err = SimulationError::InsufficientSlack {
        kind: ResourceKind::ExamRoom,
        requested: 3,
        available: 1,
    };
    assert_eq!(
        format!("{err}"),
        "insufficient slack in exam room pool: requested 3, available 1"
    );
}

#[test]
fn test_spawn_error_keeps_source() {
    let err = SimulationError::Spawn {
        component: "er-worker-1".to_string(),
        source: io::Error::new(io::ErrorKind::WouldBlock, "no threads left"),
    };
    assert_eq!(format!("{err}"), "failed to spawn er-worker-1: no threads left");
    assert!(err.source().is_some());
}

#[test]
fn test_component_panicked_error() {
    let err = SimulationError::ComponentPanicked("er-fatigue".to_string());
    assert_eq!(format!("{err}"), "component panicked: er-fatigue");
}

#[test]
fn test_converts_into_app_result() {
    fn fails() -> AppResult<()> {
        let joined: Result<(), SimulationError> =
            Err(SimulationError::ComponentPanicked("er-arrivals".into()));
        joined?;
        Ok(())
    }
    let err = fails().unwrap_err();
    assert!(err.downcast_ref::<SimulationError>().is_some());
}
