use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use thiserror::Error;

use crate::store::{KvClient, KvConnection};

/// A key/value store living in memory, mainly useful for testing sinks.
///
/// This struct uses an `Arc<Mutex<_>>` internally, so it can be freely cloned. All clones
/// and all connections opened from them see the same data. Besides the stored data it
/// keeps counters of opened/closed connections and round trips, and it can be told to
/// fail connecting or writing.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    data: HashMap<Vec<u8>, Vec<u8>>,
    pipelining: bool,
    fail_connect: bool,
    fail_disconnect: bool,
    /// number of successful single writes until every write fails
    writes_until_failure: Option<usize>,
    connections_opened: usize,
    connections_closed: usize,
    round_trips: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty store whose connections support pipelining
    pub fn new() -> Self {
        Self::with_pipelining(true)
    }

    /// Create a new empty store whose connections only support single writes
    pub fn without_pipelining() -> Self {
        Self::with_pipelining(false)
    }

    fn with_pipelining(pipelining: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                data: HashMap::new(),
                pipelining,
                fail_connect: false,
                fail_disconnect: false,
                writes_until_failure: None,
                connections_opened: 0,
                connections_closed: 0,
                round_trips: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the value stored for `key`
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.lock().data.get(key).cloned()
    }

    /// Copy of all stored data
    pub fn snapshot(&self) -> HashMap<Vec<u8>, Vec<u8>> {
        self.lock().data.clone()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.lock().data.len()
    }

    /// True if no keys are stored
    pub fn is_empty(&self) -> bool {
        self.lock().data.is_empty()
    }

    /// Make every following connection attempt fail
    pub fn fail_connect(&self, fail: bool) {
        self.lock().fail_connect = fail;
    }

    /// Make every following disconnect fail. The connection is released anyway.
    pub fn fail_disconnect(&self, fail: bool) {
        self.lock().fail_disconnect = fail;
    }

    /// Let the next `writes` single writes succeed and fail every write after them
    pub fn fail_after_writes(&self, writes: usize) {
        self.lock().writes_until_failure = Some(writes);
    }

    /// Disable all injected failures
    pub fn clear_failures(&self) {
        let mut inner = self.lock();
        inner.fail_connect = false;
        inner.fail_disconnect = false;
        inner.writes_until_failure = None;
    }

    /// Number of connections opened so far
    pub fn connections_opened(&self) -> usize {
        self.lock().connections_opened
    }

    /// Number of connections closed via [KvConnection::disconnect]
    pub fn connections_closed(&self) -> usize {
        self.lock().connections_closed
    }

    /// Number of requests sent to the store, a pipeline counting as one
    pub fn round_trips(&self) -> usize {
        self.lock().round_trips
    }
}

impl Inner {
    fn write(&mut self, key: &[u8], value: &[u8]) -> Result<(), MemoryStoreError> {
        match self.writes_until_failure.as_mut() {
            Some(0) => return Err(MemoryStoreError::WriteRejected),
            Some(remaining) => *remaining -= 1,
            None => (),
        }
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}

/// Errors raised by a [MemoryStore]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryStoreError {
    /// Connecting was configured to fail
    #[error("Connection refused")]
    ConnectionRefused,
    /// Writing was configured to fail
    #[error("Write rejected by store")]
    WriteRejected,
    /// Disconnecting was configured to fail
    #[error("Disconnect failed")]
    DisconnectFailed,
}

/// A connection to a [MemoryStore]
pub struct MemoryConnection {
    id: usize,
    store: MemoryStore,
}

impl MemoryConnection {
    /// Unique id of this connection within its store
    pub fn id(&self) -> usize {
        self.id
    }
}

impl KvClient for MemoryStore {
    type Connection = MemoryConnection;

    fn connect(&self) -> Result<MemoryConnection, MemoryStoreError> {
        let mut inner = self.lock();
        if inner.fail_connect {
            return Err(MemoryStoreError::ConnectionRefused);
        }
        let id = inner.connections_opened;
        inner.connections_opened += 1;
        Ok(MemoryConnection {
            id,
            store: self.clone(),
        })
    }
}

impl KvConnection for MemoryConnection {
    type Error = MemoryStoreError;

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), Self::Error> {
        let mut inner = self.store.lock();
        inner.round_trips += 1;
        inner.write(key, value)
    }

    fn set_pipelined(&mut self, pairs: &[(&[u8], &[u8])]) -> Result<(), Self::Error> {
        let mut inner = self.store.lock();
        inner.round_trips += 1;
        pairs
            .iter()
            .try_for_each(|(key, value)| inner.write(key, value))
    }

    fn supports_pipelining(&self) -> bool {
        self.store.lock().pipelining
    }

    fn disconnect(self) -> Result<(), Self::Error> {
        let mut inner = self.store.lock();
        if inner.fail_disconnect {
            return Err(MemoryStoreError::DisconnectFailed);
        }
        inner.connections_closed += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_data() {
        let store = MemoryStore::new();
        let other = store.clone();
        let mut conn = other.connect().unwrap();
        conn.set(b"k", b"v").unwrap();
        assert_eq!(store.get(b"k"), Some(b"v".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn connections_get_unique_ids() {
        let store = MemoryStore::new();
        let a = store.connect().unwrap();
        let b = store.connect().unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(store.connections_opened(), 2);
        a.disconnect().unwrap();
        assert_eq!(store.connections_closed(), 1);
    }

    #[test]
    fn injected_connect_failure() {
        let store = MemoryStore::new();
        store.fail_connect(true);
        assert_eq!(
            store.connect().err(),
            Some(MemoryStoreError::ConnectionRefused)
        );
        store.clear_failures();
        assert!(store.connect().is_ok());
    }

    #[test]
    fn injected_disconnect_failure() {
        let store = MemoryStore::new();
        store.fail_disconnect(true);
        let conn = store.connect().unwrap();
        assert_eq!(conn.disconnect(), Err(MemoryStoreError::DisconnectFailed));
        assert_eq!(store.connections_closed(), 0);
    }

    #[test]
    fn injected_write_failure() {
        let store = MemoryStore::new();
        let mut conn = store.connect().unwrap();
        store.fail_after_writes(1);
        conn.set(b"a", b"1").unwrap();
        assert_eq!(conn.set(b"b", b"2"), Err(MemoryStoreError::WriteRejected));
        assert_eq!(store.get(b"b"), None);
    }
}
