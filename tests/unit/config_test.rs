//! Tests for configuration validation

use std::fs;

use er_admission::config::{ArrivalConfig, FatigueConfig, SimulationConfig};
use er_admission::core::{ResourceCapacities, SimulationError};
use er_admission::util::serde::ResourceKind;

#[test]
fn test_default_config_is_valid() {
    let cfg = SimulationConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.capacities, ResourceCapacities {
        doctors: 3,
        nurses: 2,
        exam_rooms: 2,
        ventilators: 1,
    });
    assert_eq!(cfg.arrival, ArrivalConfig { min_ms: 1_000, max_ms: 5_000 });
    assert_eq!(cfg.capacity_controller.interval_ms, 10_000);
    assert_eq!(cfg.fatigue.target, ResourceKind::Doctor);
}

#[test]
fn test_zero_workers_rejected() {
    let cfg = SimulationConfig {
        worker_count: 0,
        ..SimulationConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_zero_mandatory_capacity_rejected() {
    let cfg = SimulationConfig {
        capacities: ResourceCapacities {
            nurses: 0,
            ..ResourceCapacities::default()
        },
        ..SimulationConfig::default()
    };
    let err = cfg.validate().unwrap_err();
    assert!(err.contains("nurses"));
}

#[test]
fn test_zero_ventilators_allowed() {
    let cfg = SimulationConfig {
        capacities: ResourceCapacities {
            ventilators: 0,
            ..ResourceCapacities::default()
        },
        ..SimulationConfig::default()
    };
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_inverted_arrival_range_rejected() {
    let cfg = SimulationConfig {
        arrival: ArrivalConfig { min_ms: 10, max_ms: 5 },
        ..SimulationConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_ventilator_breaks_rejected() {
    let cfg = SimulationConfig {
        fatigue: FatigueConfig {
            target: ResourceKind::Ventilator,
            ..FatigueConfig::default()
        },
        ..SimulationConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_partial_json_fills_defaults() {
    let cfg = SimulationConfig::from_json_str(
        r#"{"worker_count": 5, "capacities": {"doctors": 4, "nurses": 2, "exam_rooms": 2, "ventilators": 0}, "seed": 9}"#,
    )
    .unwrap();
    assert_eq!(cfg.worker_count, 5);
    assert_eq!(cfg.capacities.doctors, 4);
    assert_eq!(cfg.capacities.ventilators, 0);
    assert_eq!(cfg.seed, Some(9));
    assert_eq!(cfg.treatment_ms, 2_000);
}

#[test]
fn test_json_parse_and_validation_errors() {
    assert!(SimulationConfig::from_json_str("{not json").is_err());
    assert!(SimulationConfig::from_json_str(r#"{"treatment_ms": 0}"#).is_err());
}

#[test]
fn test_json_file_round_trip() {
    let path = std::env::temp_dir().join(format!("er-sim-config-{}.json", std::process::id()));
    let cfg = SimulationConfig {
        worker_count: 7,
        seed: Some(3),
        ..SimulationConfig::default()
    };
    fs::write(&path, serde_json::to_string_pretty(&cfg).unwrap()).unwrap();
    let loaded = SimulationConfig::from_json_file(&path).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(loaded, cfg);
}

#[test]
fn test_missing_file_is_config_error() {
    let err = SimulationConfig::from_json_file("/nonexistent/er-sim.json").unwrap_err();
    assert!(matches!(err, SimulationError::Config(_)));
}
