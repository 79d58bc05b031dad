//! # rowkv Engine
//!
//! In-memory wide-column store implementing the `TableClient` capability.
//! Stands in for a real cluster client in tests and benchmarks.

mod memory;

pub use memory::MemoryStore;
