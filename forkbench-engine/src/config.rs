//! Configuration loading from forkbench.toml
//!
//! forkbench configuration can be specified in a `forkbench.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.

use std::path::Path;
use std::time::Duration;

use forkbench_core::{BenchmarkOptions, DEFAULT_ITERATIONS, DEFAULT_WARMUP};
use serde::{Deserialize, Serialize};

use crate::executor::ExecutionConfig;

/// File name searched for by [`ForkConfig::discover`]
pub const CONFIG_FILE: &str = "forkbench.toml";

/// forkbench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ForkConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Options returned by [`ForkConfig::benchmark_defaults`]; only definitions
    /// built with `with_options` use them
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// How a run reacts to a failing benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Cancel every other benchmark and report the first failure (default)
    #[default]
    FailFast,
    /// Let every benchmark finish and report outcomes individually
    Settle,
}

/// Runner configuration for benchmark execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Maximum number of benchmarks running at once (unbounded when absent)
    #[serde(default)]
    pub max_concurrency: Option<usize>,
    /// Fail benchmarks that exceed their timeout
    #[serde(default = "default_enforce_timeouts")]
    pub enforce_timeouts: bool,
    /// "fail-fast" or "settle"
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Show a progress bar while running
    #[serde(default)]
    pub progress: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: None,
            enforce_timeouts: default_enforce_timeouts(),
            failure_policy: FailurePolicy::default(),
            progress: false,
        }
    }
}

fn default_enforce_timeouts() -> bool {
    true
}

/// `[defaults]` table; see [`ForkConfig::benchmark_defaults`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Discarded runs before measuring
    #[serde(default = "default_warmup")]
    pub warmup: usize,
    /// Timed runs per benchmark
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Timeout for a single benchmark (e.g., "5s", "500ms")
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            warmup: default_warmup(),
            iterations: default_iterations(),
            timeout: default_timeout(),
        }
    }
}

fn default_warmup() -> usize {
    DEFAULT_WARMUP
}
fn default_iterations() -> usize {
    DEFAULT_ITERATIONS
}
fn default_timeout() -> String {
    "5s".to_string()
}

impl ForkConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        // Surface bad durations at load time rather than at run time
        parse_duration(&config.defaults.timeout)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Execution settings for [`crate::Executor`]
    pub fn execution_config(&self) -> ExecutionConfig {
        ExecutionConfig {
            max_concurrency: self.runner.max_concurrency,
            enforce_timeouts: self.runner.enforce_timeouts,
            show_progress: self.runner.progress,
        }
    }

    /// Options to start benchmark definitions from
    pub fn benchmark_defaults(&self) -> anyhow::Result<BenchmarkOptions> {
        Ok(BenchmarkOptions::new()
            .warmup(self.defaults.warmup)
            .iterations(self.defaults.iterations)
            .timeout(parse_duration(&self.defaults.timeout)?))
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# forkbench configuration

[runner]
# Maximum number of benchmarks running at once (uncomment to enable)
# max_concurrency = 4
# Fail benchmarks that exceed their timeout
enforce_timeouts = true
# "fail-fast" cancels everything on the first failure, "settle" lets every benchmark finish
failure_policy = "fail-fast"
# Show a progress bar
progress = false

[defaults]
# Discarded runs before measuring (only when iterations > 1)
warmup = 0
# Timed runs per benchmark
iterations = 10
# Timeout for a single benchmark
timeout = "5s"
"#
        .to_string()
    }
}

/// Parse duration string (e.g., "3s", "500ms", "2m")
pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(anyhow::anyhow!("Empty duration string"));
    }

    // Find where the number ends and unit begins
    let (num_part, unit_part) = s
        .char_indices()
        .find(|(_, c)| c.is_alphabetic())
        .map(|(i, _)| s.split_at(i))
        .unwrap_or((s, "s"));

    let value: f64 = num_part
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid duration: {}", s))?;
    if !value.is_finite() || value < 0.0 {
        return Err(anyhow::anyhow!("Duration must be a non-negative number: {}", s));
    }

    let multiplier: f64 = match unit_part.to_lowercase().as_str() {
        "ns" => 1.0,
        "us" | "µs" => 1e3,
        "ms" => 1e6,
        "s" | "" => 1e9,
        "m" | "min" => 60e9,
        _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
    };

    let nanos = (value * multiplier).round();
    if nanos > u64::MAX as f64 {
        return Err(anyhow::anyhow!("Duration out of range: {}", s));
    }
    Ok(Duration::from_nanos(nanos as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ForkConfig::default();
        assert_eq!(config.runner.max_concurrency, None);
        assert!(config.runner.enforce_timeouts);
        assert_eq!(config.runner.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.defaults.iterations, 10);
        assert_eq!(config.defaults.timeout, "5s");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("3s").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("100us").unwrap(), Duration::from_micros(100));
        assert_eq!(parse_duration("1000ns").unwrap(), Duration::from_nanos(1000));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("7").unwrap(), Duration::from_secs(7));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("-1s").is_err());
        assert!(parse_duration("fast").is_err());
        assert!(parse_duration("3 fortnights").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [runner]
            max_concurrency = 2
            failure_policy = "settle"

            [defaults]
            iterations = 3
            timeout = "250ms"
        "#;

        let config = ForkConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.runner.max_concurrency, Some(2));
        assert_eq!(config.runner.failure_policy, FailurePolicy::Settle);
        // Defaults should still apply
        assert!(config.runner.enforce_timeouts);
        assert_eq!(config.defaults.warmup, 0);

        let options = config.benchmark_defaults().unwrap();
        assert_eq!(options.iterations, 3);
        assert_eq!(options.timeout, Duration::from_millis(250));

        let execution = config.execution_config();
        assert_eq!(execution.max_concurrency, Some(2));
        assert!(!execution.show_progress);
    }

    #[test]
    fn test_defaults_apply_only_through_with_options() {
        use forkbench_core::BenchmarkDefinition;

        let config = ForkConfig::from_toml_str("[defaults]\niterations = 3\nwarmup = 2").unwrap();
        let configured =
            BenchmarkDefinition::measure(|| Ok(())).with_options(config.benchmark_defaults().unwrap());
        assert_eq!(configured.iteration_count(), 3);
        assert_eq!(configured.warmup_count(), 2);

        let plain = BenchmarkDefinition::measure(|| Ok(()));
        assert_eq!(plain.iteration_count(), DEFAULT_ITERATIONS);
        assert_eq!(plain.warmup_count(), DEFAULT_WARMUP);
    }

    #[test]
    fn test_invalid_timeout_rejected_on_load() {
        let err = ForkConfig::from_toml_str("[defaults]\ntimeout = \"soon\"").unwrap_err();
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn test_default_toml_parses() {
        let default_toml = ForkConfig::default_toml();
        let config = ForkConfig::from_toml_str(&default_toml).unwrap();
        assert_eq!(config.defaults.iterations, 10);
        assert_eq!(config.runner.failure_policy, FailurePolicy::FailFast);
    }
}
