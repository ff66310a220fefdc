//! Infrastructure adapters: queue storage and observer sinks.

pub mod observer;
pub mod queue;
