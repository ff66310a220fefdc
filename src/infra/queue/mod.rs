//! Queue storage backends.

pub mod memory;

pub use memory::InMemoryQueue;
