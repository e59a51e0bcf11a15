//! Utilities for testing sinks without an external store
mod memory_store;

pub use memory_store::{MemoryConnection, MemoryStore, MemoryStoreError};
