//! Tests for builder modules

use std::sync::Arc;

use er_admission::builders::{build_simulation, RandomStream};
use er_admission::config::SimulationConfig;
use er_admission::core::{NoopObserver, ResourceCapacities};

#[test]
fn test_builder_uses_configured_capacities() {
    let cfg = SimulationConfig {
        capacities: ResourceCapacities {
            doctors: 5,
            nurses: 4,
            exam_rooms: 3,
            ventilators: 0,
        },
        seed: Some(1),
        ..SimulationConfig::default()
    };
    let sim = build_simulation(&cfg, Arc::new(NoopObserver)).unwrap();
    let snap = sim.resources().snapshot();
    assert_eq!(snap.doctors.capacity, 5);
    assert_eq!(snap.nurses.capacity, 4);
    assert_eq!(snap.exam_rooms.capacity, 3);
    assert_eq!(snap.ventilators.capacity, 0);
    assert!(sim.queue().is_empty());
    assert!(!sim.shutdown_signal().is_triggered());
}

#[test]
fn test_each_build_gets_fresh_run_id() {
    let cfg = SimulationConfig::default();
    let a = build_simulation(&cfg, Arc::new(NoopObserver)).unwrap();
    let b = build_simulation(&cfg, Arc::new(NoopObserver)).unwrap();
    assert_ne!(a.run_id(), b.run_id());
}

#[test]
fn test_random_streams_use_distinct_offsets() {
    assert_ne!(
        RandomStream::Arrivals.seed_offset(),
        RandomStream::Capacity.seed_offset()
    );
}
