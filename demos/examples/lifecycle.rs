//! Lifecycle — hooks and failure handling
//!
//! Per-benchmark hooks bracket each benchmark; collection hooks bracket the
//! whole run. One benchmark fails on its third iteration: by default that
//! cancels the run, with `--settle` the other benchmarks still report.
//!
//! Run with: cargo run --example lifecycle -p forkbench-demos -- --verbose

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use clap::Parser;
use forkbench::prelude::*;
use forkbench_demos::{DemoArgs, run_and_print};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = DemoArgs::parse();
    let config = args.init()?;

    let calls = Arc::new(AtomicUsize::new(0));
    let count = Arc::clone(&calls);

    let benchmarks = Benchmarks::new([
        BenchmarkDefinition::measure(|| Ok((1..=20_u64).product::<u64>()))
            .with_id("factorial 20")
            .on_set_up(|| async {
                info!("preparing factorial");
                Ok(())
            })
            .on_clean_up(|| async {
                info!("factorial cleaned up");
                Ok(())
            }),
        BenchmarkDefinition::measure(move || {
            if count.fetch_add(1, Ordering::SeqCst) == 2 {
                anyhow::bail!("flaky payload gave up");
            }
            Ok(())
        })
        .with_id("flaky")
        .iterations(5),
        BenchmarkDefinition::measure_async(|| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(())
        })
        .with_id("slow neighbour")
        .iterations(4)
        .on_completion(|| async {
            info!("slow neighbour finished its iterations");
            Ok(())
        }),
    ])
    .with_id("lifecycle")
    .on_set_up(|| async {
        info!("suite set-up");
        Ok(())
    })
    .on_completion(|| async {
        info!("every benchmark succeeded");
        Ok(())
    })
    .on_clean_up(|| async {
        info!("suite clean-up");
        Ok(())
    });

    run_and_print(&benchmarks, &config, &args.format).await
}
