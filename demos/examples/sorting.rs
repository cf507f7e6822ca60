//! Sorting — synchronous payloads
//!
//! Each definition is timed over several iterations after discarded warmup
//! runs. The definitions built with `with_options(config.benchmark_defaults()?)`
//! start from the `[defaults]` table of `forkbench.toml`; the others keep the
//! built-in defaults.
//!
//! Run with: cargo run --example sorting -p forkbench-demos --release

use clap::Parser;
use forkbench::prelude::*;
use forkbench_demos::{DemoArgs, run_and_print};
use std::hint::black_box;

fn reversed(len: u32) -> Vec<u32> {
    (0..len).rev().collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = DemoArgs::parse();
    let config = args.init()?;
    let defaults = config.benchmark_defaults()?;

    let benchmarks = Benchmarks::new([
        BenchmarkDefinition::measure(|| {
            let mut values = reversed(10);
            values.sort();
            Ok(values)
        })
        .with_id("sort 10 reversed")
        .iterations(3),
        BenchmarkDefinition::measure(|| {
            let mut values = reversed(100_000);
            values.sort_unstable();
            Ok(values.len())
        })
        .with_id("sort_unstable 100k reversed")
        .with_options(defaults)
        .warmup(2),
        BenchmarkDefinition::measure(|| {
            let mut values = reversed(100_000);
            values.sort();
            Ok(values.len())
        })
        .with_id("sort 100k reversed")
        .with_options(defaults)
        .warmup(2),
        BenchmarkDefinition::measure(|| Ok(black_box(42_u64)))
            .with_id("constant")
            .iterations(1),
    ])
    .with_id("sorting");

    run_and_print(&benchmarks, &config, &args.format).await
}
