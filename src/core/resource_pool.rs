//! Counting resource pool with blocking and non-blocking acquisition.
//!
//! A [`ResourcePool`] guards a finite number of interchangeable units
//! (doctors, nurses, rooms, ventilators). State lives behind a single
//! `parking_lot::Mutex` and blocked acquirers park on a `parking_lot::Condvar`.
//!
//! Waiters are woken in whatever order the condvar chooses. That order knows
//! nothing about the priority of the patient a waiter is serving, so a low
//! priority treatment that started waiting first can be served before a high
//! priority one that started waiting later.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};

use crate::core::SimulationError;
use crate::util::serde::ResourceKind;

/// Point-in-time view of one pool. Display only; never use it to decide
/// whether an acquire will succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Pool identity.
    pub kind: ResourceKind,
    /// Idle units.
    pub available: u32,
    /// Total units, idle or held.
    pub capacity: u32,
}

impl PoolSnapshot {
    /// Units currently held by callers.
    #[must_use]
    pub const fn in_use(&self) -> u32 {
        self.capacity - self.available
    }
}

#[derive(Debug)]
struct PoolState {
    capacity: u32,
    available: u32,
}

impl PoolState {
    fn check_invariant(&self, kind: ResourceKind) {
        assert!(
            self.available <= self.capacity,
            "{kind} pool invariant violated: available {} exceeds capacity {}",
            self.available,
            self.capacity
        );
    }
}

/// Counting guard over a finite capacity.
///
/// Invariant: `0 <= available <= capacity` at every point another thread can
/// observe. Breaking it is a programming error and panics.
#[derive(Debug)]
pub struct ResourcePool {
    kind: ResourceKind,
    state: Mutex<PoolState>,
    available_cv: Condvar,
}

impl ResourcePool {
    /// Create a pool with `capacity` idle units.
    #[must_use]
    pub const fn new(kind: ResourceKind, capacity: u32) -> Self {
        Self {
            kind,
            state: Mutex::new(PoolState {
                capacity,
                available: capacity,
            }),
            available_cv: Condvar::new(),
        }
    }

    /// Resource type guarded by this pool.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Block until a unit is idle, then take it.
    ///
    /// Never fails. Blocks forever if capacity never becomes available.
    pub fn acquire(&self) {
        let mut state = self.state.lock();
        while state.available == 0 {
            self.available_cv.wait(&mut state);
        }
        state.available -= 1;
        state.check_invariant(self.kind);
    }

    /// Take a unit if one is idle right now. Never blocks.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock();
        if state.available == 0 {
            return false;
        }
        state.available -= 1;
        true
    }

    /// Block for at most `timeout` waiting for a unit.
    ///
    /// Returns `false` with no side effect if the deadline passes first.
    /// A timeout too large to express as a deadline waits without one.
    pub fn acquire_timeout(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.acquire();
            return true;
        };
        let mut state = self.state.lock();
        while state.available == 0 {
            if self.available_cv.wait_until(&mut state, deadline).timed_out() {
                if state.available == 0 {
                    return false;
                }
                break;
            }
        }
        state.available -= 1;
        true
    }

    /// Return one unit and wake at most one blocked acquirer.
    ///
    /// # Panics
    ///
    /// Panics if every unit is already idle, i.e. the caller released a unit
    /// it never held.
    pub fn release(&self) {
        let mut state = self.state.lock();
        assert!(
            state.available < state.capacity,
            "{} pool released more units than were acquired (capacity {})",
            self.kind,
            state.capacity
        );
        state.available += 1;
        drop(state);
        self.available_cv.notify_one();
    }

    /// Idle units right now.
    pub fn available(&self) -> u32 {
        self.state.lock().available
    }

    /// Total units right now.
    pub fn capacity(&self) -> u32 {
        self.state.lock().capacity
    }

    /// Consistent `(available, capacity)` pair.
    pub fn snapshot(&self) -> PoolSnapshot {
        let state = self.state.lock();
        PoolSnapshot {
            kind: self.kind,
            available: state.available,
            capacity: state.capacity,
        }
    }

    /// Add `delta` to both capacity and available units.
    ///
    /// A positive delta wakes up to `delta` blocked acquirers. A negative delta
    /// may only remove idle units; held units are never revoked.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InsufficientSlack`] if `-delta` exceeds the
    /// idle units. The pool is left untouched in that case.
    pub fn adjust_capacity(&self, delta: i64) -> Result<(), SimulationError> {
        let magnitude = u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX);
        if magnitude == 0 {
            return Ok(());
        }

        let mut state = self.state.lock();
        if delta < 0 {
            if magnitude > state.available {
                return Err(SimulationError::InsufficientSlack {
                    kind: self.kind,
                    requested: magnitude,
                    available: state.available,
                });
            }
            state.capacity -= magnitude;
            state.available -= magnitude;
            state.check_invariant(self.kind);
            tracing::debug!(kind = %self.kind, removed = magnitude, capacity = state.capacity, "capacity reduced");
            return Ok(());
        }

        let added = magnitude
            .min(u32::MAX - state.capacity)
            .min(u32::MAX - state.available);
        state.capacity += added;
        state.available += added;
        state.check_invariant(self.kind);
        tracing::debug!(kind = %self.kind, added, capacity = state.capacity, "capacity increased");
        drop(state);

        if added == 1 {
            self.available_cv.notify_one();
        } else if added > 1 {
            self.available_cv.notify_all();
        }
        Ok(())
    }

    /// Blocking acquire returning a permit that releases on drop.
    pub fn acquire_permit(self: &Arc<Self>) -> PoolPermit {
        self.acquire();
        PoolPermit::new(Arc::clone(self))
    }

    /// Non-blocking acquire returning a permit that releases on drop.
    pub fn try_acquire_permit(self: &Arc<Self>) -> Option<PoolPermit> {
        self.try_acquire().then(|| PoolPermit::new(Arc::clone(self)))
    }

    /// Bounded acquire returning a permit that releases on drop.
    pub fn acquire_permit_timeout(self: &Arc<Self>, timeout: Duration) -> Option<PoolPermit> {
        self.acquire_timeout(timeout)
            .then(|| PoolPermit::new(Arc::clone(self)))
    }
}

/// One unit held from a [`ResourcePool`]. Dropping it releases the unit.
#[derive(Debug)]
#[must_use = "dropping a permit releases the unit immediately"]
pub struct PoolPermit {
    pool: Arc<ResourcePool>,
}

impl PoolPermit {
    const fn new(pool: Arc<ResourcePool>) -> Self {
        Self { pool }
    }

    /// Resource type held.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.pool.kind()
    }

    /// Release explicitly. Equivalent to dropping the permit.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for PoolPermit {
    fn drop(&mut self) {
        self.pool.release();
    }
}
