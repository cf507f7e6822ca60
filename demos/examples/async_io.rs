//! Async I/O — asynchronous payloads
//!
//! Async payloads are awaited on the Tokio runtime; every await point honours
//! the benchmark's timeout. Try `--concurrency 1` to watch the benchmarks run
//! one after another, and `--settle` to see the slow one time out alone.
//!
//! Run with: cargo run --example async_io -p forkbench-demos --release

use clap::Parser;
use forkbench::prelude::*;
use forkbench_demos::{DemoArgs, run_and_print};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = DemoArgs::parse();
    let config = args.init()?;

    let benchmarks = Benchmarks::new([
        BenchmarkDefinition::measure_async(|| async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(())
        })
        .with_id("sleep 10ms")
        .iterations(5),
        BenchmarkDefinition::measure_async(|| async {
            let (tx, mut rx) = mpsc::channel(64);
            let producer = tokio::spawn(async move {
                for i in 0_u64..1_000 {
                    tx.send(i).await?;
                }
                anyhow::Ok(())
            });
            let mut sum = 0_u64;
            while let Some(i) = rx.recv().await {
                sum += i;
            }
            producer.await??;
            Ok(sum)
        })
        .with_id("mpsc 1k messages")
        .warmup(1)
        .iterations(10),
        BenchmarkDefinition::measure_async(|| async {
            let handles: Vec<_> = (0_u64..16)
                .map(|i| tokio::spawn(async move { i * i }))
                .collect();
            let mut sum = 0_u64;
            for handle in handles {
                sum += handle.await?;
            }
            Ok(sum)
        })
        .with_id("spawn/join fan-out")
        .iterations(10),
        BenchmarkDefinition::measure_async(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok(())
        })
        .with_id("too slow")
        .iterations(1)
        .timeout(Duration::from_millis(500)),
    ])
    .with_id("async_io");

    run_and_print(&benchmarks, &config, &args.format).await
}
