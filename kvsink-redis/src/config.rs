use std::{fmt, time::Duration};

use bon::Builder;
use envconfig::Envconfig;
use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use thiserror::Error;

/// Options for opening connections to a Redis server. These only decide how a connection
/// gets opened and never change how records are written.
///
/// The config can be built in code
/// ```
/// use kvsink_redis::RedisConfig;
///
/// let config = RedisConfig::builder()
///     .host("redis.internal")
///     .db(11)
///     .password("hunter2")
///     .build();
/// assert_eq!(config.port, 6379);
/// ```
/// or read from `KVSINK_REDIS_*` environment variables with
/// [from_env](RedisConfig::from_env).
#[derive(Builder, Envconfig, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    /// Host name or IP address of the Redis server
    #[envconfig(from = "KVSINK_REDIS_HOST", default = "127.0.0.1")]
    #[builder(into, default = "127.0.0.1".to_owned())]
    pub host: String,

    /// TCP port of the Redis server
    #[envconfig(from = "KVSINK_REDIS_PORT", default = "6379")]
    #[builder(default = 6379)]
    pub port: u16,

    /// Logical database selected after connecting
    #[envconfig(from = "KVSINK_REDIS_DB", default = "0")]
    #[builder(default = 0)]
    pub db: i64,

    /// Username for Redis ACL authentication
    #[envconfig(from = "KVSINK_REDIS_USERNAME")]
    #[builder(into)]
    pub username: Option<String>,

    /// Password for authentication
    #[envconfig(from = "KVSINK_REDIS_PASSWORD")]
    #[builder(into)]
    pub password: Option<String>,

    /// Maximum time to wait for a connection to be established
    #[envconfig(from = "KVSINK_REDIS_CONNECT_TIMEOUT_MS")]
    pub connect_timeout_ms: Option<u64>,

    /// Maximum time to wait on a single read or write on an open connection
    #[envconfig(from = "KVSINK_REDIS_RESPONSE_TIMEOUT_MS")]
    pub response_timeout_ms: Option<u64>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RedisConfig {
    /// Load the config from `KVSINK_REDIS_*` environment variables
    pub fn from_env() -> Result<Self, RedisConfigError> {
        Self::init_from_env().map_err(RedisConfigError::Env)
    }

    /// Timeout for establishing a connection, if any
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    /// Timeout for reads and writes on a connection, if any
    pub fn response_timeout(&self) -> Option<Duration> {
        self.response_timeout_ms.map(Duration::from_millis)
    }

    /// Connection info for the `redis` client
    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: RedisConnectionInfo {
                db: self.db,
                username: self.username.clone(),
                password: self.password.clone(),
                ..Default::default()
            },
        }
    }
}

impl fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db", &self.db)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("response_timeout_ms", &self.response_timeout_ms)
            .finish()
    }
}

/// Errors while loading a [RedisConfig]
#[derive(Debug, Error)]
pub enum RedisConfigError {
    /// An environment variable could not be parsed
    #[error("Failed to load Redis config from environment")]
    Env(#[source] envconfig::Error),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_map(vars: &[(&str, &str)]) -> Result<RedisConfig, envconfig::Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RedisConfig::init_from_hashmap(&vars)
    }

    #[test]
    fn env_defaults_match_builder_defaults() {
        let config = from_map(&[]).unwrap();
        assert_eq!(config, RedisConfig::default());
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 6379);
        assert_eq!(config.db, 0);
        assert_eq!(config.password, None);
        assert_eq!(config.connect_timeout(), None);
    }

    #[test]
    fn reads_env_values() {
        let config = from_map(&[
            ("KVSINK_REDIS_HOST", "10.0.0.7"),
            ("KVSINK_REDIS_PORT", "6380"),
            ("KVSINK_REDIS_DB", "11"),
            ("KVSINK_REDIS_USERNAME", "writer"),
            ("KVSINK_REDIS_PASSWORD", "secret"),
            ("KVSINK_REDIS_CONNECT_TIMEOUT_MS", "1500"),
            ("KVSINK_REDIS_RESPONSE_TIMEOUT_MS", "250"),
        ])
        .unwrap();
        assert_eq!(
            config,
            RedisConfig::builder()
                .host("10.0.0.7")
                .port(6380)
                .db(11)
                .username("writer")
                .password("secret")
                .connect_timeout_ms(1500)
                .response_timeout_ms(250)
                .build()
        );
        assert_eq!(config.connect_timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.response_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn rejects_invalid_port() {
        assert!(from_map(&[("KVSINK_REDIS_PORT", "not-a-port")]).is_err());
    }

    #[test]
    fn connection_info_carries_selector_and_credentials() {
        let config = RedisConfig::builder()
            .host("redis.internal")
            .port(7000)
            .db(11)
            .username("writer")
            .password("secret")
            .build();
        let info = config.connection_info();
        assert_eq!(
            info.addr,
            ConnectionAddr::Tcp("redis.internal".to_owned(), 7000)
        );
        assert_eq!(info.redis.db, 11);
        assert_eq!(info.redis.username.as_deref(), Some("writer"));
        assert_eq!(info.redis.password.as_deref(), Some("secret"));
    }

    #[test]
    fn debug_hides_password() {
        let config = RedisConfig::builder().password("hunter2").build();
        let printed = format!("{config:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }
}
