use bon::Builder;
use tracing::{debug_span, info, warn};

use crate::{
    errorhandling::SinkError,
    sinks::{validate_worker, SinkFactory, SinkPartition},
    types::{Batch, WorkerCount, WorkerIndex},
};

/// Runs one worker per thread within one process, each worker writing to its own
/// partition of the same sink.
///
/// # Example
/// ```rust
/// use kvsink::runtime::WorkerRuntime;
/// use kvsink::sinks::KvSinkFactory;
/// use kvsink::testing::MemoryStore;
///
/// let store = MemoryStore::new();
/// let runtime = WorkerRuntime::builder()
///     .factory(KvSinkFactory::new(store.clone()))
///     .worker_count(4)
///     .build();
///
/// // every worker writes one batch with one key of its own
/// runtime
///     .execute(|worker_index| {
///         vec![vec![(format!("worker-{worker_index}"), "done".to_string())]]
///     })
///     .unwrap();
/// assert_eq!(store.len(), 4);
/// assert_eq!(store.connections_closed(), 4);
/// ```
#[derive(Builder)]
pub struct WorkerRuntime<F> {
    /// Sink all workers write to
    factory: F,
    /// Number of workers to start
    #[builder(default = 1)]
    worker_count: WorkerCount,
    /// Close every partition once its input is exhausted. Disabling this simulates
    /// workers which never get shut down gracefully.
    #[builder(default = true)]
    close_on_finish: bool,
}

impl<F> WorkerRuntime<F> {
    /// Number of workers this runtime starts
    pub fn worker_count(&self) -> WorkerCount {
        self.worker_count
    }

    /// Run all workers to completion.
    ///
    /// `feed` is called once on every worker with the worker's index and provides the
    /// batches for that worker. Workers run fully in parallel and never communicate.
    /// If any worker fails, the error of the lowest failing worker index is returned after
    /// all workers finished. A runtime without workers fails before starting any.
    pub fn execute<K, V, S, I>(&self, feed: S) -> Result<(), SinkError>
    where
        F: SinkFactory<K, V>,
        S: Fn(WorkerIndex) -> I + Sync,
        I: IntoIterator<Item = Batch<K, V>>,
    {
        // a job needs at least worker 0
        validate_worker(0, self.worker_count).map_err(|source| SinkError::Build {
            worker_index: 0,
            source,
        })?;
        info!(worker_count = self.worker_count, "Starting workers");
        let feed = &feed;
        let results: Vec<Result<(), SinkError>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..self.worker_count)
                .map(|worker_index| {
                    let handle =
                        scope.spawn(move || self.run_worker(worker_index, feed(worker_index)));
                    (worker_index, handle)
                })
                .collect();
            handles
                .into_iter()
                .map(|(worker_index, handle)| {
                    handle
                        .join()
                        .unwrap_or(Err(SinkError::WorkerPanicked { worker_index }))
                })
                .collect()
        });
        info!("Execution finished on all workers");
        results.into_iter().collect()
    }

    fn run_worker<K, V, I>(&self, worker_index: WorkerIndex, batches: I) -> Result<(), SinkError>
    where
        F: SinkFactory<K, V>,
        I: IntoIterator<Item = Batch<K, V>>,
    {
        let span = debug_span!("worker", worker_index);
        let _entered = span.enter();

        let mut partition = self
            .factory
            .build(worker_index, self.worker_count)
            .map_err(|source| SinkError::Build {
                worker_index,
                source,
            })?;
        for batch in batches {
            partition
                .write_batch(batch)
                .map_err(|source| SinkError::Write {
                    worker_index,
                    source,
                })?;
        }
        if self.close_on_finish {
            // close failures are logged, not returned
            if let Err(e) = partition.close() {
                warn!(worker_index, error = %e, "Failed to close sink partition");
            }
        }
        Ok(())
    }
}
