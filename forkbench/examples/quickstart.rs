//! Smallest useful forkbench program: two benchmarks, default settings.
//!
//! Run with `cargo run -p forkbench --example quickstart`.

use forkbench::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let benchmarks = Benchmarks::new([
        BenchmarkDefinition::measure(|| {
            let mut values: Vec<u32> = (0..10_000).rev().collect();
            values.sort_unstable();
            Ok(values.len())
        })
        .with_id("sort reversed")
        .warmup(2)
        .iterations(5),
        BenchmarkDefinition::measure_async(|| async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(())
        })
        .with_id("sleep 5ms")
        .iterations(3),
    ]);

    let results = benchmarks.run().await?;
    print!("{}", format_human_output(&results));
    Ok(())
}
