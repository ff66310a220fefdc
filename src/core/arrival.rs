//! Patient arrivals.

use std::sync::Arc;

use tracing::debug;

use crate::core::{
    AdmissionQueue, DelayPolicy, EventKind, HospitalResources, Observer, Patient, PatientFactory,
    PatientRef, RandomSource, ShutdownSignal, SimEvent,
};

/// Generates patients at policy-determined intervals and enqueues them.
pub struct ArrivalSource {
    queue: Arc<AdmissionQueue>,
    resources: HospitalResources,
    factory: Arc<PatientFactory>,
    delays: Arc<dyn DelayPolicy>,
    random: Box<dyn RandomSource>,
    observer: Arc<dyn Observer>,
    shutdown: ShutdownSignal,
}

impl ArrivalSource {
    /// Create an arrival source.
    #[must_use]
    pub fn new(
        queue: Arc<AdmissionQueue>,
        resources: HospitalResources,
        factory: Arc<PatientFactory>,
        delays: Arc<dyn DelayPolicy>,
        random: Box<dyn RandomSource>,
        observer: Arc<dyn Observer>,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            queue,
            resources,
            factory,
            delays,
            random,
            observer,
            shutdown,
        }
    }

    /// Create, enqueue and report one patient.
    pub fn admit_one(&mut self) -> Patient {
        let patient = self.factory.admit(self.random.next_priority());
        let queue_depth = self.queue.enqueue(patient.clone());
        debug!(patient_id = patient.id, priority = %patient.priority, queue_depth, "patient arrived");
        self.observer.record(SimEvent::new(
            EventKind::PatientArrived {
                patient: PatientRef::from(&patient),
                queue_depth,
            },
            self.resources.snapshot(),
        ));
        patient
    }

    /// Admit patients until shutdown. Returns how many arrived.
    pub fn run(mut self) -> u64 {
        let mut arrivals = 0;
        while !self.shutdown.sleep(self.delays.arrival_interval()) {
            self.admit_one();
            arrivals += 1;
        }
        debug!(arrivals, "arrival source stopped");
        arrivals
    }
}
