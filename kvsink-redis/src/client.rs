use kvsink::store::{KvClient, KvConnection};
use redis::{Client, RedisError};
use tracing::debug;

use crate::RedisConfig;

/// Opens Redis connections for sink partitions.
///
/// Nothing is pooled or shared: every call to [connect](KvClient::connect) opens a new
/// TCP connection and selects the configured database on it.
#[derive(Debug, Clone)]
pub struct RedisClient {
    config: RedisConfig,
}

impl RedisClient {
    /// Create a client for the given config. This does not connect yet.
    pub fn new(config: RedisConfig) -> Self {
        Self { config }
    }

    /// Config used for new connections
    pub fn config(&self) -> &RedisConfig {
        &self.config
    }
}

impl KvClient for RedisClient {
    type Connection = RedisConnection;

    fn connect(&self) -> Result<RedisConnection, RedisError> {
        let client = Client::open(self.config.connection_info())?;
        let conn = match self.config.connect_timeout() {
            Some(timeout) => client.get_connection_with_timeout(timeout)?,
            None => client.get_connection()?,
        };
        let response_timeout = self.config.response_timeout();
        conn.set_read_timeout(response_timeout)?;
        conn.set_write_timeout(response_timeout)?;
        debug!(
            host = %self.config.host,
            port = self.config.port,
            db = self.config.db,
            "Connected to Redis"
        );
        Ok(RedisConnection { inner: conn })
    }
}

/// A single Redis connection owned by one sink partition
pub struct RedisConnection {
    inner: redis::Connection,
}

impl KvConnection for RedisConnection {
    type Error = RedisError;

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), RedisError> {
        redis::cmd("SET").arg(key).arg(value).query(&mut self.inner)
    }

    fn set_pipelined(&mut self, pairs: &[(&[u8], &[u8])]) -> Result<(), RedisError> {
        let mut pipe = redis::pipe();
        for &(key, value) in pairs {
            pipe.set(key, value).ignore();
        }
        pipe.query(&mut self.inner)
    }

    fn disconnect(self) -> Result<(), RedisError> {
        // dropping the connection shuts down its socket
        drop(self.inner);
        debug!("Disconnected from Redis");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Connection errors must surface as they come from the client
    #[test]
    fn refused_connection_is_an_error() {
        // nothing listens on port 1
        let client = RedisClient::new(
            RedisConfig::builder()
                .host("127.0.0.1")
                .port(1)
                .connect_timeout_ms(500)
                .build(),
        );
        let err = client.connect().err().unwrap();
        assert!(err.is_connection_refusal() || err.is_timeout() || err.is_io_error());
    }
}
