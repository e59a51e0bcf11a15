//! Write records from several workers into Redis.
//!
//! Point it at a server with the `KVSINK_REDIS_*` environment variables, e.g.
//! `KVSINK_REDIS_HOST=127.0.0.1 KVSINK_REDIS_DB=11 cargo run --example redis_sink`
use kvsink::runtime::WorkerRuntime;
use kvsink_redis::RedisSink;

const WORKERS: u64 = 4;
const BATCHES: u64 = 10;
const BATCH_SIZE: u64 = 100;

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let sink = RedisSink::from_env()?;
    tracing::info!(config = ?sink.config(), "Writing to Redis");

    WorkerRuntime::builder()
        .factory(sink)
        .worker_count(WORKERS)
        .build()
        .execute(|worker_index| {
            (0..BATCHES).map(move |batch| {
                (0..BATCH_SIZE)
                    .map(|i| {
                        let record = batch * BATCH_SIZE + i;
                        (format!("worker-{worker_index}:{record}"), record.to_string())
                    })
                    .collect::<Vec<_>>()
            })
        })?;
    Ok(())
}
