//! Tests against a live Redis server.
//! Run with `cargo test -- --ignored` with the server configured through the
//! `KVSINK_REDIS_*` environment variables.
use std::time::{SystemTime, UNIX_EPOCH};

use kvsink::errorhandling::WriteError;
use kvsink::runtime::WorkerRuntime;
use kvsink::sinks::SinkPartition;
use kvsink_redis::{RedisConfig, RedisSink};
use redis::Commands;

fn config() -> RedisConfig {
    RedisConfig::from_env().unwrap()
}

/// Prefix keeping keys of concurrent test runs apart
fn prefix(test: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("kvsink-test:{test}:{nanos}")
}

fn read(config: &RedisConfig, key: &str) -> Option<String> {
    let client = redis::Client::open(config.connection_info()).unwrap();
    let mut conn = client.get_connection().unwrap();
    conn.get(key).unwrap()
}

#[test]
#[ignore = "needs a running Redis server"]
fn written_batch_is_readable() {
    let config = config();
    let prefix = prefix("readable");
    let sink = RedisSink::new(config.clone());
    let mut partition = sink.build(0, 1).unwrap();

    let batch: Vec<_> = (0..100)
        .map(|i| (format!("{prefix}:{i}"), format!("value-{i}")))
        .collect();
    partition.write_batch(batch).unwrap();
    partition.close().unwrap();

    for i in 0..100 {
        assert_eq!(
            read(&config, &format!("{prefix}:{i}")),
            Some(format!("value-{i}"))
        );
    }
}

#[test]
#[ignore = "needs a running Redis server"]
fn duplicate_key_keeps_last_value() {
    let config = config();
    let key = prefix("duplicate");
    let mut partition = RedisSink::new(config.clone()).build(0, 1).unwrap();
    partition
        .write_batch(vec![(key.as_str(), "v1"), (key.as_str(), "v2")])
        .unwrap();
    assert_eq!(read(&config, &key), Some("v2".to_owned()));
}

#[test]
#[ignore = "needs a running Redis server"]
fn closed_partition_rejects_writes() {
    let config = config();
    let key = prefix("closed");
    let mut partition = RedisSink::new(config.clone()).build(0, 1).unwrap();
    partition.close().unwrap();
    partition.close().unwrap();

    let err = partition.write_batch(vec![(key.as_str(), "x")]).unwrap_err();
    assert!(matches!(err, WriteError::Closed));
    assert_eq!(read(&config, &key), None);
}

#[test]
#[ignore = "needs a running Redis server"]
fn workers_write_concurrently() {
    let config = config();
    let prefix = prefix("workers");
    let runtime = WorkerRuntime::builder()
        .factory(RedisSink::new(config.clone()))
        .worker_count(2)
        .close_on_finish(false)
        .build();
    runtime
        .execute(|worker_index| {
            let (key, value) = if worker_index == 0 { ("a", "1") } else { ("b", "2") };
            vec![vec![(format!("{prefix}:{key}"), value.to_owned())]]
        })
        .unwrap();

    assert_eq!(read(&config, &format!("{prefix}:a")), Some("1".to_owned()));
    assert_eq!(read(&config, &format!("{prefix}:b")), Some("2".to_owned()));
}
