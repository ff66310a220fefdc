//! Observer sinks that live outside the core: a fire-and-forget channel and
//! the console status table.

pub mod channel;
pub mod table;

pub use channel::{ChannelObserver, ObserverPump};
pub use table::TableObserver;
