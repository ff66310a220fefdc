//! Admission and scheduling core: pools, queue, workers and controllers.

pub mod admission_queue;
pub mod arrival;
pub mod controllers;
pub mod error;
pub mod hospital;
pub mod lease;
pub mod observer;
pub mod patient;
pub mod policy;
pub mod resource_pool;
pub mod shutdown;
pub mod worker;

pub use admission_queue::{AdmissionQueue, Dequeued, PatientQueue};
pub use arrival::ArrivalSource;
pub use controllers::{
    BreakOutcome, CapacityController, CapacityIncrement, FatigueController, FatigueSummary,
};
pub use error::{AppResult, SimulationError};
pub use hospital::{HospitalResources, ResourceCapacities, ResourceSnapshot};
pub use lease::{TreatmentLease, VentilatorOutcome};
pub use observer::{
    EventKind, EventRole, InMemoryObserver, LogObserver, NoopObserver, Observer, PatientRef,
    SimEvent, StatusRow,
};
pub use patient::{Patient, PatientFactory};
pub use policy::{DelayPolicy, FixedDelays, RandomSource, SeededRandom, UniformDelays};
pub use resource_pool::{PoolPermit, PoolSnapshot, ResourcePool};
pub use shutdown::ShutdownSignal;
pub use worker::{TreatmentRecord, TreatmentWorker, WorkerProbe, WorkerState, WorkerSummary};
