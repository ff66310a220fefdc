//! The four named resource pools shared by every component.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{PoolSnapshot, ResourcePool};
use crate::util::serde::ResourceKind;

/// Initial unit counts per pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCapacities {
    /// Doctors on shift.
    pub doctors: u32,
    /// Nurses on shift.
    pub nurses: u32,
    /// Examination rooms.
    pub exam_rooms: u32,
    /// Ventilators. Zero is allowed; high priority patients are then treated
    /// without one.
    pub ventilators: u32,
}

impl Default for ResourceCapacities {
    fn default() -> Self {
        Self {
            doctors: 3,
            nurses: 2,
            exam_rooms: 2,
            ventilators: 1,
        }
    }
}

/// Shared handles to the doctor, nurse, exam room and ventilator pools.
#[derive(Debug, Clone)]
pub struct HospitalResources {
    /// Doctor pool.
    pub doctors: Arc<ResourcePool>,
    /// Nurse pool.
    pub nurses: Arc<ResourcePool>,
    /// Exam room pool.
    pub exam_rooms: Arc<ResourcePool>,
    /// Ventilator pool.
    pub ventilators: Arc<ResourcePool>,
}

impl HospitalResources {
    /// Build fresh pools from the given capacities.
    #[must_use]
    pub fn new(capacities: ResourceCapacities) -> Self {
        Self {
            doctors: Arc::new(ResourcePool::new(ResourceKind::Doctor, capacities.doctors)),
            nurses: Arc::new(ResourcePool::new(ResourceKind::Nurse, capacities.nurses)),
            exam_rooms: Arc::new(ResourcePool::new(ResourceKind::ExamRoom, capacities.exam_rooms)),
            ventilators: Arc::new(ResourcePool::new(
                ResourceKind::Ventilator,
                capacities.ventilators,
            )),
        }
    }

    /// Pool for a resource type.
    #[must_use]
    pub const fn pool(&self, kind: ResourceKind) -> &Arc<ResourcePool> {
        match kind {
            ResourceKind::Doctor => &self.doctors,
            ResourceKind::Nurse => &self.nurses,
            ResourceKind::ExamRoom => &self.exam_rooms,
            ResourceKind::Ventilator => &self.ventilators,
        }
    }

    /// Snapshot every pool. Each pool is read separately, so the four values
    /// need not come from the same instant.
    #[must_use]
    pub fn snapshot(&self) -> ResourceSnapshot {
        ResourceSnapshot {
            doctors: self.doctors.snapshot(),
            nurses: self.nurses.snapshot(),
            exam_rooms: self.exam_rooms.snapshot(),
            ventilators: self.ventilators.snapshot(),
        }
    }
}

/// Per-pool snapshots attached to observer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    /// Doctor pool.
    pub doctors: PoolSnapshot,
    /// Nurse pool.
    pub nurses: PoolSnapshot,
    /// Exam room pool.
    pub exam_rooms: PoolSnapshot,
    /// Ventilator pool.
    pub ventilators: PoolSnapshot,
}

impl ResourceSnapshot {
    /// Snapshots in display order.
    #[must_use]
    pub const fn pools(&self) -> [PoolSnapshot; 4] {
        [self.doctors, self.nurses, self.exam_rooms, self.ventilators]
    }
}

impl fmt::Display for ResourceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for pool in self.pools() {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{} {}/{}", pool.kind.plural(), pool.available, pool.capacity)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacities() {
        let res = HospitalResources::new(ResourceCapacities::default());
        let snap = res.snapshot();
        assert_eq!(snap.doctors.capacity, 3);
        assert_eq!(snap.nurses.capacity, 2);
        assert_eq!(snap.exam_rooms.capacity, 2);
        assert_eq!(snap.ventilators.capacity, 1);
    }

    #[test]
    fn test_pool_lookup_by_kind() {
        let res = HospitalResources::new(ResourceCapacities::default());
        for kind in [
            ResourceKind::Doctor,
            ResourceKind::Nurse,
            ResourceKind::ExamRoom,
            ResourceKind::Ventilator,
        ] {
            assert_eq!(res.pool(kind).kind(), kind);
        }
    }

    #[test]
    fn test_snapshot_display() {
        let res = HospitalResources::new(ResourceCapacities {
            doctors: 1,
            nurses: 1,
            exam_rooms: 1,
            ventilators: 0,
        });
        res.doctors.acquire();
        assert_eq!(
            res.snapshot().to_string(),
            "Doctors 0/1, Nurses 1/1, Rooms 1/1, Ventilators 0/0"
        );
    }
}
