//! Integration tests for forkbench
//!
//! These tests verify the end-to-end behavior of the benchmarking system.

use std::future::{Ready, ready};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use forkbench::{
    BenchmarkDefinition, BenchmarkError, Benchmarks, BenchmarksError, Clock, ExecutionConfig,
    Executor, ForkConfig, HookKind, build_report, format_human_output, generate_json_report,
};

type Log = Arc<Mutex<Vec<&'static str>>>;

/// Clock whose n-th measurement (1-based) lasts `n * step`
struct StepClock {
    step: Duration,
    ticks: AtomicU32,
}

impl StepClock {
    fn new(step: Duration) -> Self {
        Self {
            step,
            ticks: AtomicU32::new(0),
        }
    }
}

impl Clock for StepClock {
    type Mark = ();

    fn start(&self) -> Self::Mark {}

    fn elapsed(&self, _mark: &Self::Mark) -> Duration {
        self.step * (self.ticks.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

fn recorder(
    log: &Log,
    event: &'static str,
) -> impl Fn() -> Ready<anyhow::Result<()>> + Send + Sync + 'static {
    let log = Arc::clone(log);
    move || {
        log.lock().unwrap().push(event);
        ready(Ok(()))
    }
}

fn counter(count: &Arc<AtomicUsize>) -> impl Fn() -> Ready<anyhow::Result<()>> + Send + Sync + 'static {
    let count = Arc::clone(count);
    move || {
        count.fetch_add(1, Ordering::SeqCst);
        ready(Ok(()))
    }
}

fn events(log: &Log) -> Vec<&'static str> {
    log.lock().unwrap().clone()
}

/// Two benchmarks: a sort repeated three times and a single constant
#[tokio::test]
async fn test_sort_and_constant_scenario() {
    let benchmarks = Benchmarks::new([
        BenchmarkDefinition::measure(|| {
            let mut values: Vec<u32> = (0..10).rev().collect();
            values.sort();
            Ok(values)
        })
        .with_id("A")
        .iterations(3),
        BenchmarkDefinition::measure(|| Ok(42_u64))
            .with_id("B")
            .iterations(1),
    ]);

    let results = benchmarks.run().await.unwrap();
    assert_eq!(results.keys().copied().collect::<Vec<_>>(), vec![0, 1]);

    let a = &results[&0];
    assert_eq!(a.id(), Some("A"));
    assert_eq!(a.times().len(), 3);
    assert_eq!(a.results().len(), 3);
    assert_eq!(a.result::<Vec<u32>>(2), Some(&(0..10).collect::<Vec<_>>()));
    assert_eq!(a.total(), a.times().iter().sum::<Duration>());
    assert_eq!(a.average(), a.total() / 3);

    let b = &results[&1];
    assert_eq!(b.id(), Some("B"));
    assert_eq!(b.len(), 1);
    assert_eq!(b.result::<u64>(0), Some(&42));
}

#[tokio::test]
async fn test_exact_totals_with_step_clock() {
    let benchmarks = Benchmarks::new([BenchmarkDefinition::measure(|| Ok(())).iterations(4)]);

    let results = Executor::new(ExecutionConfig::default())
        .with_clock(StepClock::new(Duration::from_millis(1)))
        .run(&benchmarks)
        .await
        .unwrap();

    let result = &results[&0];
    let expected: Vec<_> = (1..=4).map(Duration::from_millis).collect();
    assert_eq!(result.times(), expected.as_slice());
    assert_eq!(result.total(), Duration::from_millis(10));
    assert_eq!(result.average(), Duration::from_micros(2_500));
}

#[tokio::test]
async fn test_warmup_runs_are_not_recorded() {
    let calls = Arc::new(AtomicUsize::new(0));
    let count = Arc::clone(&calls);
    let benchmarks = Benchmarks::new([BenchmarkDefinition::measure(move || {
        Ok(count.fetch_add(1, Ordering::SeqCst))
    })
    .warmup(3)
    .iterations(5)]);

    let results = benchmarks.run().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 8);
    assert_eq!(results[&0].len(), 5);
    assert_eq!(results[&0].result::<usize>(0), Some(&3));
}

#[tokio::test]
async fn test_many_benchmarks_keyed_by_position() {
    let benchmarks: Benchmarks = (0..32_u32)
        .map(|i| {
            BenchmarkDefinition::measure_async(move || async move {
                // Later benchmarks finish first
                tokio::time::sleep(Duration::from_micros(u64::from(32 - i) * 50)).await;
                Ok(i)
            })
            .iterations(2)
        })
        .collect();

    let results = benchmarks.run().await.unwrap();
    assert_eq!(results.len(), 32);
    for (index, result) in &results {
        assert_eq!(result.result::<u32>(0), Some(&(*index as u32)));
    }
}

#[tokio::test]
async fn test_empty_collection_runs_nothing() {
    let hooks = Arc::new(AtomicUsize::new(0));
    let benchmarks = Benchmarks::default()
        .on_set_up(counter(&hooks))
        .on_completion(counter(&hooks))
        .on_clean_up(counter(&hooks));

    let err = benchmarks.run().await.unwrap_err();
    assert!(matches!(err, BenchmarksError::Empty));
    assert_eq!(hooks.load(Ordering::SeqCst), 0);

    let err = benchmarks.run_settled().await.unwrap_err();
    assert!(matches!(err, BenchmarksError::Empty));
}

#[tokio::test]
async fn test_failing_payload_fails_the_run() {
    let benchmarks = Benchmarks::new([
        BenchmarkDefinition::measure(|| Ok(1)),
        BenchmarkDefinition::measure(|| -> anyhow::Result<()> { anyhow::bail!("always fails") })
            .with_id("broken"),
    ]);

    let err = benchmarks.run().await.unwrap_err();
    assert_eq!(err.benchmark_index(), Some(1));
    match err {
        BenchmarksError::Benchmark { source, .. } => {
            assert_eq!(source.name(), "broken");
            assert!(source.to_string().contains("always fails"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_lifecycle_order() {
    let log: Log = Arc::default();
    let payload_log = Arc::clone(&log);
    let benchmarks = Benchmarks::new([BenchmarkDefinition::measure(move || {
        payload_log.lock().unwrap().push("run");
        Ok(())
    })
    .warmup(1)
    .iterations(2)
    .on_set_up(recorder(&log, "set-up"))
    .on_completion(recorder(&log, "completion"))
    .on_clean_up(recorder(&log, "clean-up"))]);

    benchmarks.run().await.unwrap();
    assert_eq!(
        events(&log),
        ["set-up", "run", "run", "run", "completion", "clean-up"]
    );
}

#[tokio::test]
async fn test_collection_hooks_wrap_the_run() {
    let log: Log = Arc::default();
    let benchmarks = Benchmarks::new([
        BenchmarkDefinition::measure(|| Ok(())).on_clean_up(recorder(&log, "bench clean-up")),
        BenchmarkDefinition::measure(|| Ok(())).on_clean_up(recorder(&log, "bench clean-up")),
    ])
    .on_set_up(recorder(&log, "suite set-up"))
    .on_completion(recorder(&log, "suite completion"))
    .on_clean_up(recorder(&log, "suite clean-up"));

    benchmarks.run().await.unwrap();
    assert_eq!(
        events(&log),
        [
            "suite set-up",
            "bench clean-up",
            "bench clean-up",
            "suite completion",
            "suite clean-up",
        ]
    );
}

#[tokio::test]
async fn test_collection_clean_up_after_failure() {
    let log: Log = Arc::default();
    let benchmarks = Benchmarks::new([BenchmarkDefinition::measure(|| -> anyhow::Result<()> {
        anyhow::bail!("nope")
    })])
    .on_completion(recorder(&log, "suite completion"))
    .on_clean_up(recorder(&log, "suite clean-up"));

    assert!(benchmarks.run().await.is_err());
    assert_eq!(events(&log), ["suite clean-up"]);
}

#[tokio::test]
async fn test_collection_set_up_failure_runs_nothing() {
    let calls = Arc::new(AtomicUsize::new(0));
    let count = Arc::clone(&calls);
    let cleanups = Arc::new(AtomicUsize::new(0));
    let benchmarks = Benchmarks::new([BenchmarkDefinition::measure(move || {
        Ok(count.fetch_add(1, Ordering::SeqCst))
    })])
    .on_set_up(|| async { Err(anyhow::anyhow!("no database")) })
    .on_clean_up(counter(&cleanups));

    let err = benchmarks.run().await.unwrap_err();
    assert!(matches!(
        err,
        BenchmarksError::Hook {
            hook: HookKind::SetUp,
            ..
        }
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(cleanups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_clean_up_failure_fails_the_benchmark() {
    let benchmarks = Benchmarks::new([BenchmarkDefinition::measure(|| Ok(()))
        .with_id("leaky")
        .on_clean_up(|| async { Err(anyhow::anyhow!("could not release")) })]);

    let err = benchmarks.run().await.unwrap_err();
    match err {
        BenchmarksError::Benchmark {
            index: 0,
            source: BenchmarkError::Failed { phase, .. },
        } => assert_eq!(phase, forkbench::Phase::CleanUp),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_failure_cancels_in_flight_siblings() {
    let cleanups = Arc::new(AtomicUsize::new(0));
    let benchmarks = Benchmarks::new([
        BenchmarkDefinition::measure_async(|| async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err::<(), _>(anyhow::anyhow!("fails early"))
        })
        .iterations(1),
        BenchmarkDefinition::measure_async(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Ok(())
        })
        .iterations(1)
        .on_clean_up(counter(&cleanups)),
    ]);

    let err = benchmarks.run().await.unwrap_err();
    assert_eq!(err.benchmark_index(), Some(0));
    assert_eq!(cleanups.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_fails_fast() {
    let benchmarks = Benchmarks::new([
        BenchmarkDefinition::measure_async(|| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .with_id("slow")
        .timeout(Duration::from_millis(100)),
        BenchmarkDefinition::measure(|| Ok(())),
    ]);

    let err = benchmarks.run().await.unwrap_err();
    match err {
        BenchmarksError::Benchmark { index, source } => {
            assert_eq!(index, 0);
            assert!(source.is_timeout());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_settled_run_isolates_timeout() {
    let benchmarks = Benchmarks::new([
        BenchmarkDefinition::measure_async(|| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .timeout(Duration::from_millis(100)),
        BenchmarkDefinition::measure(|| Ok("fine")).iterations(2),
    ]);

    let outcomes = benchmarks.run_settled().await.unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[&0].as_ref().is_err_and(BenchmarkError::is_timeout));
    let fine = outcomes[&1].as_ref().unwrap();
    assert_eq!(fine.result::<&str>(1), Some(&"fine"));
}

#[tokio::test]
async fn test_sync_benchmark_does_not_starve_async_sibling() {
    let benchmarks = Benchmarks::new([
        BenchmarkDefinition::measure_async(|| async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            Ok(())
        })
        .with_id("fast async")
        .timeout(Duration::from_millis(50))
        .iterations(1),
        BenchmarkDefinition::measure(|| {
            std::thread::sleep(Duration::from_millis(1));
            Ok(())
        })
        .with_id("long sync")
        .iterations(200),
    ]);

    let results = benchmarks.run().await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[&1].len(), 200);
}

#[tokio::test]
async fn test_failure_stops_sync_sibling() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let benchmarks = Benchmarks::new([
        BenchmarkDefinition::measure(|| -> anyhow::Result<()> { anyhow::bail!("broken") }),
        BenchmarkDefinition::measure(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(1));
            Ok(())
        })
        .iterations(200),
    ]);

    let err = benchmarks.run().await.unwrap_err();
    assert_eq!(err.benchmark_index(), Some(0));

    // The sibling may be inside one call; after that it must not start another
    tokio::time::sleep(Duration::from_millis(20)).await;
    let settled = calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(calls.load(Ordering::SeqCst), settled);
    assert!(settled < 100, "sibling ran {settled} times");
}

#[tokio::test]
async fn test_zero_iterations_rejected() {
    let benchmarks = Benchmarks::new([
        BenchmarkDefinition::measure(|| Ok(())),
        BenchmarkDefinition::measure(|| Ok(())).iterations(0),
    ]);

    let err = benchmarks.run().await.unwrap_err();
    assert!(matches!(
        err,
        BenchmarksError::InvalidIterations { index: 1, .. }
    ));
}

#[tokio::test]
async fn test_config_drives_execution() {
    let config = ForkConfig::from_toml_str(
        r#"
        [runner]
        max_concurrency = 1

        [defaults]
        warmup = 1
        iterations = 3
        timeout = "2s"
        "#,
    )
    .unwrap();
    let defaults = config.benchmark_defaults().unwrap();

    let benchmarks: Benchmarks = (0..3)
        .map(|i| BenchmarkDefinition::measure(move || Ok(i)).with_options(defaults))
        .collect();

    let executor = Executor::new(config.execution_config());
    assert_eq!(executor.config().max_concurrency, Some(1));

    let results = executor.run(&benchmarks).await.unwrap();
    assert!(results.values().all(|r| r.len() == 3));
}

#[tokio::test]
async fn test_reports_from_results() {
    let benchmarks = Benchmarks::new([
        BenchmarkDefinition::measure(|| Ok(())).with_id("noop").iterations(2),
        BenchmarkDefinition::measure(|| Ok(1)).iterations(1),
    ])
    .with_id("suite");

    let results = Executor::new(ExecutionConfig::default())
        .with_clock(StepClock::new(Duration::from_micros(1)))
        .run(&benchmarks)
        .await
        .unwrap();

    let text = format_human_output(&results);
    assert!(text.contains("time for noop was"));
    assert!(text.contains("average time for benchmark 2 was"));

    let report = build_report(&results, benchmarks.id().unwrap_or_default());
    assert_eq!(report.results.len(), 2);
    let json = generate_json_report(&report).unwrap();
    assert!(json.contains("\"title\": \"noop\""));
}
