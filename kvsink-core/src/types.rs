//! Types shared between sinks, stores and runtimes

/// Index of a worker within one dataflow run, `0..WorkerCount`
pub type WorkerIndex = u64;
/// Number of workers taking part in one dataflow run
pub type WorkerCount = u64;

/// An ordered group of key/value records handed to a sink partition in one call.
/// Size and boundaries of batches are decided by the engine.
pub type Batch<K, V> = Vec<(K, V)>;
