//! Controllers that change pool capacity while workers run.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::core::{
    AdmissionQueue, EventKind, HospitalResources, Observer, RandomSource, ShutdownSignal, SimEvent,
};
use crate::util::serde::ResourceKind;

/// Units added by one capacity tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapacityIncrement {
    /// Doctors added.
    pub doctors: u32,
    /// Nurses added.
    pub nurses: u32,
    /// Exam rooms added.
    pub exam_rooms: u32,
}

impl CapacityIncrement {
    /// Whether nothing was added.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.doctors == 0 && self.nurses == 0 && self.exam_rooms == 0
    }

    /// Total units added.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.doctors as u64 + self.nurses as u64 + self.exam_rooms as u64
    }
}

/// Periodically grows the doctor, nurse and exam room pools, modelling
/// shift changes and emergencies. Never shrinks anything.
pub struct CapacityController {
    queue: Arc<AdmissionQueue>,
    resources: HospitalResources,
    random: Box<dyn RandomSource>,
    observer: Arc<dyn Observer>,
    shutdown: ShutdownSignal,
    interval: Duration,
    max_increment: u32,
}

impl CapacityController {
    /// Create a controller that adds `0..=max_increment` units per pool
    /// every `interval`.
    #[must_use]
    pub fn new(
        queue: Arc<AdmissionQueue>,
        resources: HospitalResources,
        random: Box<dyn RandomSource>,
        observer: Arc<dyn Observer>,
        shutdown: ShutdownSignal,
        interval: Duration,
        max_increment: u32,
    ) -> Self {
        Self {
            queue,
            resources,
            random,
            observer,
            shutdown,
            interval,
            max_increment,
        }
    }

    /// Draw increments and apply them. An all-zero draw changes nothing and
    /// reports nothing.
    ///
    /// Non-zero increments are applied and reported under the queue guard so
    /// the report cannot interleave with arrivals or dequeues.
    pub fn tick(&mut self) -> CapacityIncrement {
        let increment = CapacityIncrement {
            doctors: self.random.next_increment(self.max_increment),
            nurses: self.random.next_increment(self.max_increment),
            exam_rooms: self.random.next_increment(self.max_increment),
        };
        if increment.is_zero() {
            debug!("capacity tick added nothing");
            return increment;
        }

        self.queue.report(|queue_depth| {
            for (kind, units) in [
                (ResourceKind::Doctor, increment.doctors),
                (ResourceKind::Nurse, increment.nurses),
                (ResourceKind::ExamRoom, increment.exam_rooms),
            ] {
                if let Err(e) = self.resources.pool(kind).adjust_capacity(i64::from(units)) {
                    error!(%kind, "failed to grow capacity: {e}");
                }
            }
            info!(
                doctors = increment.doctors,
                nurses = increment.nurses,
                exam_rooms = increment.exam_rooms,
                queue_depth,
                "capacity added"
            );
            self.observer.record(SimEvent::new(
                EventKind::CapacityAdded {
                    doctors: increment.doctors,
                    nurses: increment.nurses,
                    exam_rooms: increment.exam_rooms,
                },
                self.resources.snapshot(),
            ));
        });
        increment
    }

    /// Tick every interval until shutdown. Returns total units added.
    pub fn run(mut self) -> u64 {
        let mut added = 0;
        while !self.shutdown.sleep(self.interval) {
            added += self.tick().total();
        }
        debug!(added, "capacity controller stopped");
        added
    }
}

/// Result of one fatigue cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakOutcome {
    /// A unit was taken off the floor and has returned.
    Taken,
    /// Every unit was busy, so nobody went on break.
    Skipped,
}

/// Break totals returned when the fatigue controller stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FatigueSummary {
    /// Breaks completed.
    pub breaks_taken: u64,
    /// Cycles skipped because the pool was exhausted.
    pub breaks_skipped: u64,
}

/// Periodically sends one idle staff unit on a bounded break.
///
/// The unit is taken with a non-blocking acquire and returned with a
/// release, so only capacity that is idle at that moment is ever removed.
pub struct FatigueController {
    resources: HospitalResources,
    target: ResourceKind,
    observer: Arc<dyn Observer>,
    shutdown: ShutdownSignal,
    interval: Duration,
    break_duration: Duration,
}

impl FatigueController {
    /// Create a controller acting on `target` every `interval`.
    #[must_use]
    pub fn new(
        resources: HospitalResources,
        target: ResourceKind,
        observer: Arc<dyn Observer>,
        shutdown: ShutdownSignal,
        interval: Duration,
        break_duration: Duration,
    ) -> Self {
        Self {
            resources,
            target,
            observer,
            shutdown,
            interval,
            break_duration,
        }
    }

    /// Attempt one break. Blocks for up to the break duration when a unit is
    /// taken; returns early on shutdown.
    pub fn tick(&self) -> BreakOutcome {
        let pool = self.resources.pool(self.target);
        let Some(permit) = pool.try_acquire_permit() else {
            debug!(kind = %self.target, "no idle unit for a break");
            self.record(EventKind::BreakSkipped { kind: self.target });
            return BreakOutcome::Skipped;
        };

        self.record(EventKind::BreakStarted { kind: self.target });
        self.shutdown.sleep(self.break_duration);
        permit.release();
        info!(kind = %self.target, "staff returned from break");
        self.record(EventKind::BreakEnded { kind: self.target });
        BreakOutcome::Taken
    }

    fn record(&self, kind: EventKind) {
        self.observer
            .record(SimEvent::new(kind, self.resources.snapshot()));
    }

    /// Cycle every interval until shutdown.
    pub fn run(self) -> FatigueSummary {
        let mut summary = FatigueSummary::default();
        while !self.shutdown.sleep(self.interval) {
            match self.tick() {
                BreakOutcome::Taken => summary.breaks_taken += 1,
                BreakOutcome::Skipped => summary.breaks_skipped += 1,
            }
        }
        debug!(
            taken = summary.breaks_taken,
            skipped = summary.breaks_skipped,
            "fatigue controller stopped"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InMemoryObserver, ResourceCapacities};
    use crate::util::serde::Priority;

    /// Replays a fixed list of increments.
    struct Scripted(Vec<u32>);

    impl RandomSource for Scripted {
        fn next_priority(&mut self) -> Priority {
            Priority::Low
        }

        fn next_increment(&mut self, max: u32) -> u32 {
            if self.0.is_empty() {
                0
            } else {
                self.0.remove(0).min(max)
            }
        }
    }

    fn capacity_controller(
        script: Vec<u32>,
    ) -> (CapacityController, HospitalResources, Arc<InMemoryObserver>) {
        let resources = HospitalResources::new(ResourceCapacities::default());
        let observer = Arc::new(InMemoryObserver::default());
        let controller = CapacityController::new(
            Arc::new(AdmissionQueue::new()),
            resources.clone(),
            Box::new(Scripted(script)),
            observer.clone(),
            ShutdownSignal::new(),
            Duration::from_millis(1),
            1,
        );
        (controller, resources, observer)
    }

    #[test]
    fn test_capacity_tick_grows_pools() {
        let (mut controller, resources, observer) = capacity_controller(vec![1, 0, 1]);
        let inc = controller.tick();
        assert_eq!(inc.total(), 2);
        let snap = resources.snapshot();
        assert_eq!(snap.doctors.capacity, 4);
        assert_eq!(snap.doctors.available, 4);
        assert_eq!(snap.nurses.capacity, 2);
        assert_eq!(snap.exam_rooms.capacity, 3);
        assert_eq!(snap.ventilators.capacity, 1);
        assert_eq!(observer.events().len(), 1);
    }

    #[test]
    fn test_zero_tick_is_silent_noop() {
        let (mut controller, resources, observer) = capacity_controller(vec![0, 0, 0]);
        assert!(controller.tick().is_zero());
        assert_eq!(
            resources.snapshot(),
            HospitalResources::new(ResourceCapacities::default()).snapshot()
        );
        assert!(observer.events().is_empty());
    }

    #[test]
    fn test_fatigue_returns_unit() {
        let resources = HospitalResources::new(ResourceCapacities::default());
        let observer = Arc::new(InMemoryObserver::default());
        let fatigue = FatigueController::new(
            resources.clone(),
            ResourceKind::Doctor,
            observer.clone(),
            ShutdownSignal::new(),
            Duration::from_millis(1),
            Duration::from_millis(10),
        );
        assert_eq!(fatigue.tick(), BreakOutcome::Taken);
        assert_eq!(resources.doctors.available(), 3);
        let events = observer.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].resources.doctors.available, 2);
        assert_eq!(events[1].resources.doctors.available, 3);
    }

    #[test]
    fn test_fatigue_skips_exhausted_pool() {
        let resources = HospitalResources::new(ResourceCapacities {
            doctors: 1,
            ..ResourceCapacities::default()
        });
        resources.doctors.acquire();
        let fatigue = FatigueController::new(
            resources.clone(),
            ResourceKind::Doctor,
            Arc::new(InMemoryObserver::default()),
            ShutdownSignal::new(),
            Duration::from_millis(1),
            Duration::from_millis(10),
        );
        assert_eq!(fatigue.tick(), BreakOutcome::Skipped);
        assert_eq!(resources.doctors.available(), 0);
        resources.doctors.release();
    }
}
