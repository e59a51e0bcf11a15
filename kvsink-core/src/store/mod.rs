//! Client side interface of the key/value stores sinks can write to.
//!
//! A store adapter implements [KvClient] to open connections and [KvConnection] for the
//! writes over one connection. The transport and wire protocol stay inside the adapter.
mod pipeline;

pub use pipeline::Pipeline;

/// A single connection to a key/value store.
/// A connection is owned by exactly one sink partition and never shared.
pub trait KvConnection: Send {
    /// Error type of the store client
    type Error: std::error::Error + Send + Sync + 'static;

    /// Set `key` to `value`, overwriting any previous value, in one round trip.
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), Self::Error>;

    /// Set all pairs in a single pipelined round trip. Pairs are applied in the given order,
    /// so if a key appears twice the later value is the one stored.
    fn set_pipelined(&mut self, pairs: &[(&[u8], &[u8])]) -> Result<(), Self::Error>;

    /// Whether [set_pipelined](KvConnection::set_pipelined) sends the pairs as one round
    /// trip. If this returns false, [Pipeline] falls back to issuing one `set` per pair.
    fn supports_pipelining(&self) -> bool {
        true
    }

    /// Close this connection and release its resources
    fn disconnect(self) -> Result<(), Self::Error>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// Opens connections to a key/value store.
pub trait KvClient: Sync {
    /// Connections opened by this client
    type Connection: KvConnection;

    /// Open a new connection. Every call must return a connection which is not shared
    /// with any other caller.
    fn connect(&self) -> Result<Self::Connection, <Self::Connection as KvConnection>::Error>;
}
