//! Compound resource allocation held for one treatment.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::core::{HospitalResources, PoolPermit};
use crate::util::serde::{Priority, ResourceKind};

/// What happened to the optional ventilator for a treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VentilatorOutcome {
    /// A ventilator is attached for the whole treatment.
    Allocated,
    /// The patient qualified but every ventilator was in use.
    Unavailable,
    /// The patient's priority does not call for one.
    NotRequired,
}

/// One doctor, one nurse, one exam room and possibly a ventilator, held
/// together for a single treatment.
///
/// Mandatory units are always taken in [`ResourceKind::MANDATORY`] order.
/// Every worker uses that order, so no two leases can wait on each other in
/// a cycle. Dropping the lease releases everything it holds.
#[derive(Debug)]
pub struct TreatmentLease {
    mandatory: [PoolPermit; 3],
    ventilator: Option<PoolPermit>,
    outcome: VentilatorOutcome,
}

impl TreatmentLease {
    /// Block until all mandatory units are held, then try for a ventilator
    /// without blocking if the priority calls for one.
    #[must_use]
    pub fn acquire(resources: &HospitalResources, priority: Priority) -> Self {
        let mandatory = ResourceKind::MANDATORY.map(|kind| resources.pool(kind).acquire_permit());
        Self::assemble(resources, priority, mandatory)
    }

    /// Like [`acquire`](Self::acquire) but gives up once `timeout` has
    /// elapsed. Units taken before giving up are released before returning
    /// `None`.
    #[must_use]
    pub fn acquire_within(
        resources: &HospitalResources,
        priority: Priority,
        timeout: Duration,
    ) -> Option<Self> {
        let deadline = Instant::now().checked_add(timeout);
        let remaining = || {
            deadline.map_or(Duration::MAX, |d| d.saturating_duration_since(Instant::now()))
        };

        let mut held = Vec::with_capacity(ResourceKind::MANDATORY.len());
        for kind in ResourceKind::MANDATORY {
            held.push(resources.pool(kind).acquire_permit_timeout(remaining())?);
        }
        let mandatory: [PoolPermit; 3] = held.try_into().ok()?;
        Some(Self::assemble(resources, priority, mandatory))
    }

    fn assemble(
        resources: &HospitalResources,
        priority: Priority,
        mandatory: [PoolPermit; 3],
    ) -> Self {
        let (ventilator, outcome) = if priority.needs_ventilator() {
            match resources.ventilators.try_acquire_permit() {
                Some(permit) => (Some(permit), VentilatorOutcome::Allocated),
                None => (None, VentilatorOutcome::Unavailable),
            }
        } else {
            (None, VentilatorOutcome::NotRequired)
        };
        Self {
            mandatory,
            ventilator,
            outcome,
        }
    }

    /// Ventilator result for this lease.
    #[must_use]
    pub const fn ventilator(&self) -> VentilatorOutcome {
        self.outcome
    }

    /// True when the patient qualified for a ventilator but got none.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.outcome == VentilatorOutcome::Unavailable
    }

    /// Number of units held, ventilator included.
    #[must_use]
    pub const fn units_held(&self) -> usize {
        self.mandatory.len() + if self.ventilator.is_some() { 1 } else { 0 }
    }

    /// Resource kinds held, in the order they were taken.
    #[must_use]
    pub fn held_kinds(&self) -> Vec<ResourceKind> {
        self.mandatory
            .iter()
            .chain(&self.ventilator)
            .map(PoolPermit::kind)
            .collect()
    }

    /// Release every held unit.
    pub fn release(self) {
        let Self {
            mandatory,
            ventilator,
            ..
        } = self;
        drop(ventilator);
        drop(mandatory);
    }
}
