//! Errors raised while building, writing to and closing sink partitions.
//!
//! Errors returned by a store client are never retried or rewritten. They are boxed
//! and carried as the [source](std::error::Error::source) of the sink error, so callers
//! can downcast to the client's own error type.
use thiserror::Error;

use crate::types::{WorkerCount, WorkerIndex};

/// An error as raised by a store client
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Building a sink partition failed. This is fatal to the partition of that worker.
#[derive(Debug, Error)]
pub enum ConstructionError {
    /// The engine asked for a worker which can not exist
    #[error("Invalid worker index {worker_index} for a job with {worker_count} workers")]
    InvalidWorker {
        /// requested index
        worker_index: WorkerIndex,
        /// requested worker count
        worker_count: WorkerCount,
    },
    /// Opening the store connection failed
    #[error("Failed to connect to store")]
    Connect(#[source] StoreError),
}

impl ConstructionError {
    /// Wrap a store client error raised while connecting
    pub fn connect<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connect(Box::new(err))
    }
}

/// Writing a batch failed. Some writes of the batch may already have been applied.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The store client returned an error
    #[error("Failed to write batch of {batch_len} records")]
    Store {
        /// length of the failed batch
        batch_len: usize,
        /// error raised by the store client
        #[source]
        source: StoreError,
    },
    /// The partition was closed before this write
    #[error("Can not write to a closed sink partition")]
    Closed,
}

impl WriteError {
    /// Wrap a store client error raised while writing a batch
    pub fn store<E>(batch_len: usize, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Store {
            batch_len,
            source: Box::new(err),
        }
    }
}

/// Releasing the store connection failed
#[derive(Debug, Error)]
#[error("Failed to release store connection")]
pub struct CloseError(#[source] pub StoreError);

impl CloseError {
    /// Wrap a store client error raised while disconnecting
    pub fn new<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(Box::new(err))
    }
}

/// Error reported by a [runtime](crate::runtime) for one of its workers
#[derive(Debug, Error)]
pub enum SinkError {
    /// The worker could not build its partition
    #[error("Worker {worker_index} failed to build its sink partition")]
    Build {
        /// failing worker
        worker_index: WorkerIndex,
        /// cause
        #[source]
        source: ConstructionError,
    },
    /// The worker failed writing a batch
    #[error("Worker {worker_index} failed to write to its sink partition")]
    Write {
        /// failing worker
        worker_index: WorkerIndex,
        /// cause
        #[source]
        source: WriteError,
    },
    /// The worker thread panicked
    #[error("Worker {worker_index} panicked")]
    WorkerPanicked {
        /// failing worker
        worker_index: WorkerIndex,
    },
}

impl SinkError {
    /// Index of the worker which failed
    pub fn worker_index(&self) -> WorkerIndex {
        match self {
            Self::Build { worker_index, .. }
            | Self::Write { worker_index, .. }
            | Self::WorkerPanicked { worker_index } => *worker_index,
        }
    }
}
