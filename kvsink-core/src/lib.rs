//! kvsink lets a distributed dataflow engine write its output records into an external
//! key/value store, with one sink partition and one store connection per worker.
pub mod errorhandling;
pub mod runtime;
pub mod sinks;
pub mod store;
pub mod testing;
pub mod types;
