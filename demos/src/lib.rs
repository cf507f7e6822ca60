//! forkbench Demos
//!
//! Runnable demonstrations of forkbench features. This crate is not
//! published — it exists solely to host examples that depend on `forkbench`.
//!
//! Run any example with:
//! ```sh
//! cargo run --example <name> -p forkbench-demos --release -- [--verbose] [--format json]
//! ```
//!
//! | Example | Feature |
//! |---------|---------|
//! | `sorting` | Sync payloads, warmup, iteration counts, `forkbench.toml` defaults |
//! | `async_io` | Async payloads, timeouts, bounded concurrency |
//! | `lifecycle` | Per-benchmark and collection hooks, fail-fast vs settled runs |
//!
//! Every example shares the command line defined by [`DemoArgs`].

use std::path::PathBuf;

use clap::Parser;
use forkbench::{
    Benchmarks, Executor, FailurePolicy, ForkConfig, OutputFormat, build_report,
    format_human_output, generate_json_report,
};

/// Command line shared by the demo binaries
#[derive(Parser, Debug)]
#[command(author, version, about = "forkbench demo")]
pub struct DemoArgs {
    /// Configuration file (otherwise forkbench.toml is discovered)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Maximum number of benchmarks running at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Let every benchmark finish instead of failing fast
    #[arg(long)]
    pub settle: bool,

    /// Output format: human, json
    #[arg(long, default_value = "human")]
    pub format: String,

    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl DemoArgs {
    /// Install the log subscriber and resolve configuration (flags override the file)
    pub fn init(&self) -> anyhow::Result<ForkConfig> {
        let filter = if self.verbose {
            "forkbench_engine=debug"
        } else {
            "forkbench_engine=info"
        };
        tracing_subscriber::fmt().with_env_filter(filter).init();

        let mut config = match &self.config {
            Some(path) => ForkConfig::load(path)?,
            None => ForkConfig::discover().unwrap_or_default(),
        };
        if self.concurrency.is_some() {
            config.runner.max_concurrency = self.concurrency;
        }
        if self.settle {
            config.runner.failure_policy = FailurePolicy::Settle;
        }
        config.runner.progress |= self.progress;
        Ok(config)
    }
}

/// Run `benchmarks` under `config` and print the outcome in the requested format
pub async fn run_and_print(
    benchmarks: &Benchmarks,
    config: &ForkConfig,
    format: &str,
) -> anyhow::Result<()> {
    let format: OutputFormat = format.parse().map_err(anyhow::Error::msg)?;
    let executor = Executor::new(config.execution_config());

    let results = match config.runner.failure_policy {
        FailurePolicy::FailFast => executor.run(benchmarks).await?,
        FailurePolicy::Settle => {
            let mut results = forkbench::ResultMap::new();
            for (index, outcome) in executor.run_settled(benchmarks).await? {
                match outcome {
                    Ok(result) => {
                        results.insert(index, result);
                    }
                    Err(err) => eprintln!("✗ {}", err),
                }
            }
            results
        }
    };

    match format {
        OutputFormat::Human => print!("{}", format_human_output(&results)),
        OutputFormat::Json => {
            let report = build_report(&results, benchmarks.id().unwrap_or("benchmarks"));
            println!("{}", generate_json_report(&report)?);
        }
    }
    Ok(())
}
