use tracing::{debug, trace};

use crate::{
    errorhandling::{CloseError, ConstructionError, WriteError},
    store::{KvClient, KvConnection, Pipeline},
    types::{Batch, WorkerCount, WorkerIndex},
};

use super::{validate_worker, SinkFactory, SinkPartition};

/// A sink where all workers write key/value records to one store concurrently.
///
/// Every worker opens its own connection through the wrapped [KvClient]. Records are
/// written with a plain `set`, so the last write of a key wins.
///
/// This sink does not store any resume state. Thus it can only naively support
/// at-least-once processing: a batch which failed or was replayed after a restart may
/// be written again.
///
/// ```
/// use kvsink::sinks::{KvSinkFactory, SinkPartition};
/// use kvsink::testing::MemoryStore;
///
/// let store = MemoryStore::new();
/// let sink = KvSinkFactory::new(store.clone());
///
/// let mut partition = sink.build(0, 1).unwrap();
/// partition.write_batch(vec![("pet", "dog"), ("pet", "cat")]).unwrap();
/// partition.close().unwrap();
///
/// assert_eq!(store.get(b"pet"), Some(b"cat".to_vec()));
/// ```
#[derive(Debug, Clone)]
pub struct KvSinkFactory<C> {
    client: C,
}

impl<C: KvClient> KvSinkFactory<C> {
    /// Create a sink writing through `client`
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// The client partitions connect with
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Build the partition for the worker `worker_index` out of `worker_count` workers.
    /// This opens a new store connection on every call.
    pub fn build(
        &self,
        worker_index: WorkerIndex,
        worker_count: WorkerCount,
    ) -> Result<KvSinkPartition<C::Connection>, ConstructionError> {
        validate_worker(worker_index, worker_count)?;
        let conn = self
            .client
            .connect()
            .map_err(ConstructionError::connect)?;
        debug!(worker_index, worker_count, "Built key/value sink partition");
        Ok(KvSinkPartition::new(conn))
    }
}

impl<K, V, C> SinkFactory<K, V> for KvSinkFactory<C>
where
    K: AsRef<[u8]>,
    V: AsRef<[u8]>,
    C: KvClient,
{
    type Partition = KvSinkPartition<C::Connection>;

    fn build(
        &self,
        worker_index: WorkerIndex,
        worker_count: WorkerCount,
    ) -> Result<Self::Partition, ConstructionError> {
        KvSinkFactory::build(self, worker_index, worker_count)
    }
}

/// Output partition writing to a key/value store over its own connection.
pub struct KvSinkPartition<C> {
    /// `None` once the partition is closed
    conn: Option<C>,
}

impl<C: KvConnection> KvSinkPartition<C> {
    /// Create a partition owning `conn`
    pub fn new(conn: C) -> Self {
        Self { conn: Some(conn) }
    }

    /// The connection of this partition, `None` after it was closed
    pub fn connection(&self) -> Option<&C> {
        self.conn.as_ref()
    }

    /// True if the partition was closed
    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    /// Disconnect from the store. Closing an already closed partition does nothing.
    pub fn close(&mut self) -> Result<(), CloseError> {
        match self.conn.take() {
            Some(conn) => {
                conn.disconnect().map_err(CloseError::new)?;
                debug!("Closed key/value sink partition");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl<K, V, C> SinkPartition<K, V> for KvSinkPartition<C>
where
    K: AsRef<[u8]>,
    V: AsRef<[u8]>,
    C: KvConnection,
{
    fn write_batch(&mut self, items: Batch<K, V>) -> Result<(), WriteError> {
        let conn = self.conn.as_mut().ok_or(WriteError::Closed)?;
        let batch_len = items.len();

        let mut pipe = Pipeline::with_capacity(conn, batch_len);
        for (key, value) in items.iter() {
            pipe.set(key.as_ref(), value.as_ref());
        }
        pipe.execute()
            .map_err(|e| WriteError::store(batch_len, e))?;
        trace!(batch_len, "Wrote batch");
        Ok(())
    }

    fn close(&mut self) -> Result<(), CloseError> {
        KvSinkPartition::close(self)
    }
}
