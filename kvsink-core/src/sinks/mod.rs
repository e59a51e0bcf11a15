//! Sinks for writing data from a dataflow into an external store
mod kv_sink;

pub use kv_sink::{KvSinkFactory, KvSinkPartition};

use crate::{
    errorhandling::{CloseError, ConstructionError, WriteError},
    types::{Batch, WorkerCount, WorkerIndex},
};

/// Describes a sink and builds one [SinkPartition] for every worker of a dataflow.
///
/// A factory holds no mutable state. [build](SinkFactory::build) is called once on each
/// worker, possibly from many threads at the same time, and every call creates a new
/// partition with its own store connection.
pub trait SinkFactory<K, V>: Sync {
    /// Partition type built by this factory
    type Partition: SinkPartition<K, V>;

    /// Build the partition for the worker `worker_index` out of `worker_count` workers.
    fn build(
        &self,
        worker_index: WorkerIndex,
        worker_count: WorkerCount,
    ) -> Result<Self::Partition, ConstructionError>;
}

/// The part of a sink running on a single worker.
///
/// A partition is only ever used by the worker that built it, so it needs no locking.
pub trait SinkPartition<K, V> {
    /// Write all records of `items` to the store, in order.
    ///
    /// Once this returns `Ok` the records are stored. Nothing is buffered past the return
    /// of this function, which is why [close](SinkPartition::close) is never needed for
    /// durability.
    fn write_batch(&mut self, items: Batch<K, V>) -> Result<(), WriteError>;

    /// Release any resources like external connections held by this partition.
    /// This is not guaranteed to be called, e.g. when processing unbounded data or when the
    /// process gets killed. Calling it more than once must not fail.
    fn close(&mut self) -> Result<(), CloseError> {
        Ok(())
    }
}

/// Check the worker arguments given to [SinkFactory::build]
pub fn validate_worker(
    worker_index: WorkerIndex,
    worker_count: WorkerCount,
) -> Result<(), ConstructionError> {
    if worker_index < worker_count {
        Ok(())
    } else {
        Err(ConstructionError::InvalidWorker {
            worker_index,
            worker_count,
        })
    }
}
