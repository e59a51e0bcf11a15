use kvsink::{
    errorhandling::ConstructionError,
    sinks::{KvSinkFactory, KvSinkPartition, SinkFactory},
    types::{WorkerCount, WorkerIndex},
};

use crate::{RedisClient, RedisConfig, RedisConfigError, RedisConnection};

/// Output partition that writes to a Redis instance
pub type RedisSinkPartition = KvSinkPartition<RedisConnection>;

/// An output sink where all workers write records to a Redis instance concurrently.
///
/// Every batch is written as one pipeline of `SET` commands, so single records overwrite
/// each other in batch order. The pipeline is not a transaction: if it fails, some of its
/// commands may already have been applied.
///
/// Does not support storing any resume state. Thus this sink only naively supports
/// at-least-once processing.
///
/// # Usage
///
/// ```no_run
/// use kvsink::sinks::SinkPartition;
/// use kvsink_redis::{RedisConfig, RedisSink};
///
/// let sink = RedisSink::new(RedisConfig::builder().host("127.0.0.1").db(11).build());
/// // usually the engine calls this once on every worker
/// let mut partition = sink.build(0, 1).unwrap();
/// partition.write_batch(vec![("user:1", "alice"), ("user:2", "bob")]).unwrap();
/// partition.close().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct RedisSink(KvSinkFactory<RedisClient>);

impl RedisSink {
    /// Create a sink connecting with the given config
    pub fn new(config: RedisConfig) -> Self {
        Self(KvSinkFactory::new(RedisClient::new(config)))
    }

    /// Create a sink with the config read from `KVSINK_REDIS_*` environment variables
    pub fn from_env() -> Result<Self, RedisConfigError> {
        RedisConfig::from_env().map(Self::new)
    }

    /// Config used by all partitions of this sink
    pub fn config(&self) -> &RedisConfig {
        self.0.client().config()
    }

    /// Build the partition for a worker, opening a new Redis connection.
    /// Will be called once on each worker.
    pub fn build(
        &self,
        worker_index: WorkerIndex,
        worker_count: WorkerCount,
    ) -> Result<RedisSinkPartition, ConstructionError> {
        self.0.build(worker_index, worker_count)
    }
}

impl<K, V> SinkFactory<K, V> for RedisSink
where
    K: AsRef<[u8]>,
    V: AsRef<[u8]>,
{
    type Partition = RedisSinkPartition;

    fn build(
        &self,
        worker_index: WorkerIndex,
        worker_count: WorkerCount,
    ) -> Result<Self::Partition, ConstructionError> {
        RedisSink::build(self, worker_index, worker_count)
    }
}
