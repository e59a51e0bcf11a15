//! Redis sink for kvsink.
//!
//! Every worker of a dataflow gets its own partition with its own Redis connection and
//! writes each batch of key/value records as one pipeline of `SET` commands.
mod client;
mod config;
mod sink;

pub use client::{RedisClient, RedisConnection};
pub use config::{RedisConfig, RedisConfigError};
pub use sink::{RedisSink, RedisSinkPartition};
