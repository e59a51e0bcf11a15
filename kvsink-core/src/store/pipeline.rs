use tracing::debug;

use super::KvConnection;

/// A batch of `set` commands staged for one connection.
///
/// The pipeline mutably borrows its connection for as long as it lives, so no other
/// write can interleave. It is released on every path: after [execute](Pipeline::execute)
/// returns, whether successfully or not, or when it is dropped without being executed, in
/// which case the staged commands are discarded and never sent.
///
/// ```
/// use kvsink::store::{KvClient, Pipeline};
/// use kvsink::testing::MemoryStore;
///
/// let store = MemoryStore::new();
/// let mut conn = store.connect().unwrap();
/// let mut pipe = Pipeline::begin(&mut conn);
/// pipe.set(b"a", b"1").set(b"a", b"2");
/// pipe.execute().unwrap();
/// assert_eq!(store.get(b"a"), Some(b"2".to_vec()));
/// ```
pub struct Pipeline<'c, 'a, C: KvConnection> {
    conn: &'c mut C,
    staged: Vec<(&'a [u8], &'a [u8])>,
}

impl<'c, 'a, C: KvConnection> Pipeline<'c, 'a, C> {
    /// Start a new, empty pipeline on `conn`
    pub fn begin(conn: &'c mut C) -> Self {
        Self::with_capacity(conn, 0)
    }

    /// Start a new pipeline with room for `capacity` commands
    pub fn with_capacity(conn: &'c mut C, capacity: usize) -> Self {
        Self {
            conn,
            staged: Vec::with_capacity(capacity),
        }
    }

    /// Stage setting `key` to `value`
    pub fn set(&mut self, key: &'a [u8], value: &'a [u8]) -> &mut Self {
        self.staged.push((key, value));
        self
    }

    /// Number of staged commands
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    /// True if no commands are staged
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Send all staged commands.
    /// An empty pipeline does not contact the store at all.
    pub fn execute(mut self) -> Result<(), C::Error> {
        let staged = std::mem::take(&mut self.staged);
        if staged.is_empty() {
            return Ok(());
        }
        if self.conn.supports_pipelining() {
            self.conn.set_pipelined(&staged)
        } else {
            staged
                .iter()
                .try_for_each(|(key, value)| self.conn.set(key, value))
        }
    }
}

impl<C: KvConnection> Drop for Pipeline<'_, '_, C> {
    fn drop(&mut self) {
        if !self.staged.is_empty() {
            debug!(
                discarded = self.staged.len(),
                "Dropping pipeline without executing it"
            );
        }
    }
}
