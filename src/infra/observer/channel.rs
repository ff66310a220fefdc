//! Fire-and-forget observer backed by a crossbeam channel.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, warn};

use crate::core::{Observer, SimEvent, SimulationError};

/// Observer that hands events to another thread and returns immediately.
///
/// Recording never blocks the caller. Events recorded after the receiving
/// side is gone are dropped.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: Sender<SimEvent>,
}

impl ChannelObserver {
    /// Create an observer and the receiving end of its channel.
    #[must_use]
    pub fn unbounded() -> (Self, Receiver<SimEvent>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }

    /// Create an observer whose events are forwarded to `inner` on a
    /// dedicated thread.
    ///
    /// The pump exits once every clone of the returned observer is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Spawn`] if the forwarding thread cannot start.
    pub fn forwarding_to(inner: Arc<dyn Observer>) -> Result<(Self, ObserverPump), SimulationError> {
        let (observer, rx) = Self::unbounded();
        let name = "er-observer".to_string();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let mut forwarded = 0;
                for event in rx {
                    inner.record(event);
                    forwarded += 1;
                }
                debug!(forwarded, "observer pump drained");
                forwarded
            })
            .map_err(|source| SimulationError::Spawn {
                component: name,
                source,
            })?;
        Ok((observer, ObserverPump { handle }))
    }
}

impl Observer for ChannelObserver {
    fn record(&self, event: SimEvent) {
        if self.tx.send(event).is_err() {
            warn!("observer channel closed; event dropped");
        }
    }
}

/// Forwarding thread started by [`ChannelObserver::forwarding_to`].
#[derive(Debug)]
pub struct ObserverPump {
    handle: JoinHandle<u64>,
}

impl ObserverPump {
    /// Wait for the pump to drain. Returns the number of events forwarded.
    ///
    /// Only returns after every sender has been dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::ComponentPanicked`] if the inner observer
    /// panicked.
    pub fn join(self) -> Result<u64, SimulationError> {
        self.handle
            .join()
            .map_err(|_| SimulationError::ComponentPanicked("er-observer".into()))
    }
}
