//! Cooperative, flag-based shutdown shared by every component.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
struct SignalInner {
    triggered: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
}

/// Process-wide shutdown flag.
///
/// Components poll [`is_triggered`](Self::is_triggered) between cycles and
/// wait with [`sleep`](Self::sleep), which returns early once the flag flips.
/// Nothing is interrupted mid-treatment.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<SignalInner>,
}

impl ShutdownSignal {
    /// Create an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the flag and wake every sleeper. Idempotent.
    pub fn trigger(&self) {
        let _guard = self.inner.lock.lock();
        if !self.inner.triggered.swap(true, Ordering::AcqRel) {
            tracing::info!("shutdown signal triggered");
        }
        self.inner.wake.notify_all();
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::Acquire)
    }

    /// Sleep for `duration` or until shutdown, whichever is first.
    ///
    /// Returns `true` if shutdown was requested.
    ///
    /// A duration too large to express as a deadline sleeps until shutdown.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now().checked_add(duration);
        let mut guard = self.inner.lock.lock();
        while !self.is_triggered() {
            match deadline {
                Some(deadline) => {
                    if self.inner.wake.wait_until(&mut guard, deadline).timed_out() {
                        break;
                    }
                }
                None => self.inner.wake.wait(&mut guard),
            }
        }
        self.is_triggered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_sleep_runs_full_duration_without_trigger() {
        let signal = ShutdownSignal::new();
        let start = Instant::now();
        assert!(!signal.sleep(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_trigger_interrupts_sleep() {
        let signal = ShutdownSignal::new();
        let sleeper = {
            let signal = signal.clone();
            thread::spawn(move || {
                let start = Instant::now();
                let interrupted = signal.sleep(Duration::from_secs(30));
                (interrupted, start.elapsed())
            })
        };
        thread::sleep(Duration::from_millis(20));
        signal.trigger();
        let (interrupted, elapsed) = sleeper.join().unwrap();
        assert!(interrupted);
        assert!(elapsed < Duration::from_secs(5));
    }

    #[test]
    fn test_sleep_after_trigger_returns_immediately() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        signal.trigger();
        assert!(signal.is_triggered());
        assert!(signal.sleep(Duration::from_secs(30)));
    }

    #[test]
    fn test_max_duration_sleeps_until_trigger() {
        let signal = ShutdownSignal::new();
        let sleeper = {
            let signal = signal.clone();
            thread::spawn(move || signal.sleep(Duration::MAX))
        };
        thread::sleep(Duration::from_millis(20));
        signal.trigger();
        assert!(sleeper.join().unwrap());
    }
}
