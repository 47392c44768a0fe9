//! Continuous-mode scheduler tests.
//!
//! Drive the full loop with a frozen market clock, the mock engine, and
//! tokio's paused clock, so interval selection, fault backoff, and
//! cancellation can be asserted precisely without real delays.

use anyhow::Result;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

use sentinel::engine::runner::CycleRunner;
use sentinel::engine::scheduler::{CycleScheduler, CycleSink, SchedulerConfig};
use sentinel::market::{FrozenClock, MarketClock};
use sentinel::types::{CycleResult, SchedulerPhase};

use crate::mock_engine::MockEngine;

fn clock_at(hour: u32, minute: u32) -> MarketClock {
    let instant = Utc.with_ymd_and_hms(2026, 2, 16, hour, minute, 0).unwrap();
    MarketClock::with_source(Arc::new(FrozenClock(instant)))
}

fn scheduler_for(
    engine: Arc<MockEngine>,
    clock: MarketClock,
    stop: watch::Receiver<bool>,
) -> CycleScheduler {
    let runner = CycleRunner::new(engine, clock.clone());
    CycleScheduler::new(runner, clock, SchedulerConfig::default(), stop)
}

/// Sink that records every published result.
#[derive(Clone, Default)]
struct RecordingSink(Arc<Mutex<Vec<CycleResult>>>);

impl RecordingSink {
    fn published(&self) -> Vec<CycleResult> {
        self.0.lock().unwrap().clone()
    }
}

impl CycleSink for RecordingSink {
    fn publish(&self, result: &CycleResult) -> Result<()> {
        self.0.lock().unwrap().push(result.clone());
        Ok(())
    }
}

/// Sink that fails exactly once, then records like `RecordingSink`.
#[derive(Clone, Default)]
struct FlakySink {
    tripped: Arc<AtomicBool>,
    inner: RecordingSink,
}

impl CycleSink for FlakySink {
    fn publish(&self, result: &CycleResult) -> Result<()> {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            anyhow::bail!("result sink unavailable");
        }
        self.inner.publish(result)
    }
}

#[tokio::test(start_paused = true)]
async fn test_open_market_cycles_every_half_hour() {
    let engine = Arc::new(MockEngine::new());
    let (stop_tx, stop_rx) = watch::channel(false);
    let scheduler = scheduler_for(engine.clone(), clock_at(9, 15), stop_rx);
    let phase = scheduler.phase_watch();

    let handle = tokio::spawn(async move { scheduler.run_forever().await });

    // Cycles start at t = 0, 1800, 3600.
    tokio::time::sleep(Duration::from_secs(3601)).await;
    assert_eq!(engine.calls(), 3);

    let instants = engine.call_instants();
    assert_eq!(instants[1] - instants[0], Duration::from_secs(1800));
    assert_eq!(instants[2] - instants[1], Duration::from_secs(1800));

    stop_tx.send(true).unwrap();
    handle.await.unwrap().unwrap();
    assert_eq!(*phase.borrow(), SchedulerPhase::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_closed_market_skips_cycles_entirely() {
    let engine = Arc::new(MockEngine::new());
    let (stop_tx, stop_rx) = watch::channel(false);
    let scheduler = scheduler_for(engine.clone(), clock_at(22, 0), stop_rx);
    let phase = scheduler.phase_watch();

    let handle = tokio::spawn(async move { scheduler.run_forever().await });

    // First suspension is the full closed-market hour: nothing before 3600.
    tokio::time::sleep(Duration::from_secs(3599)).await;
    assert_eq!(engine.calls(), 0);
    assert_eq!(*phase.borrow(), SchedulerPhase::Suspended);

    // Two more hours of iterations; the engine is still never invoked.
    tokio::time::sleep(Duration::from_secs(7200)).await;
    assert_eq!(engine.calls(), 0);

    stop_tx.send(true).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_loop_fault_backs_off_once_then_resumes() {
    let engine = Arc::new(MockEngine::new());
    let sink = FlakySink::default();
    let published = sink.inner.clone();
    let (stop_tx, stop_rx) = watch::channel(false);
    let runner = CycleRunner::new(engine.clone(), clock_at(9, 15));
    let scheduler = CycleScheduler::new(
        runner,
        clock_at(9, 15),
        SchedulerConfig::default(),
        stop_rx,
    )
    .with_sink(Box::new(sink));
    let phase = scheduler.phase_watch();

    let handle = tokio::spawn(async move { scheduler.run_forever().await });

    // The faulted iteration suspends the loop; it does not stop it.
    tokio::time::sleep(Duration::from_secs(150)).await;
    assert_eq!(*phase.borrow(), SchedulerPhase::Suspended);

    // t = 0 faulted, t = 300 retried after the fixed backoff, t = 2100
    // resumed the normal open-market cadence.
    tokio::time::sleep(Duration::from_secs(2000)).await;
    let instants = engine.call_instants();
    assert_eq!(instants.len(), 3);
    assert_eq!(instants[1] - instants[0], Duration::from_secs(300));
    assert_eq!(instants[2] - instants[1], Duration::from_secs(1800));
    assert_eq!(published.published().len(), 2);

    stop_tx.send(true).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_engine_failure_is_data_not_a_loop_fault() {
    let engine = Arc::new(MockEngine::new());
    engine.set_error("analysis service unreachable");
    let sink = RecordingSink::default();
    let published = sink.clone();
    let (stop_tx, stop_rx) = watch::channel(false);
    let runner = CycleRunner::new(engine.clone(), clock_at(9, 15));
    let scheduler = CycleScheduler::new(
        runner,
        clock_at(9, 15),
        SchedulerConfig::default(),
        stop_rx,
    )
    .with_sink(Box::new(sink));

    let handle = tokio::spawn(async move { scheduler.run_forever().await });

    // The failed cycle is published as data and the loop keeps the normal
    // open-market cadence — no 300s backoff for an engine failure.
    tokio::time::sleep(Duration::from_secs(10)).await;
    engine.clear_error();
    tokio::time::sleep(Duration::from_secs(1800)).await;

    let instants = engine.call_instants();
    assert_eq!(instants.len(), 2);
    assert_eq!(instants[1] - instants[0], Duration::from_secs(1800));

    let results = published.published();
    assert_eq!(results.len(), 2);
    assert!(!results[0].is_success());
    assert!(results[0].error().unwrap().contains("unreachable"));
    assert!(results[1].is_success());

    stop_tx.send(true).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_stop_interrupts_timer_suspension_promptly() {
    let engine = Arc::new(MockEngine::new());
    let (stop_tx, stop_rx) = watch::channel(false);
    let scheduler = scheduler_for(engine.clone(), clock_at(22, 0), stop_rx);
    let phase = scheduler.phase_watch();

    let start = tokio::time::Instant::now();
    let handle = tokio::spawn(async move { scheduler.run_forever().await });

    // The loop is an hour deep into its closed-market wait; stopping must
    // not ride out the timer.
    tokio::time::sleep(Duration::from_secs(5)).await;
    stop_tx.send(true).unwrap();
    handle.await.unwrap().unwrap();

    assert!(start.elapsed() < Duration::from_secs(3600));
    assert_eq!(*phase.borrow(), SchedulerPhase::Stopped);
    assert_eq!(engine.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_interrupts_a_hung_cycle() {
    let engine = Arc::new(MockEngine::stalling(Duration::from_secs(100_000)));
    let sink = RecordingSink::default();
    let published = sink.clone();
    let (stop_tx, stop_rx) = watch::channel(false);
    let runner = CycleRunner::new(engine.clone(), clock_at(9, 15));
    let scheduler = CycleScheduler::new(
        runner,
        clock_at(9, 15),
        SchedulerConfig::default(),
        stop_rx,
    )
    .with_sink(Box::new(sink));
    let phase = scheduler.phase_watch();

    let start = tokio::time::Instant::now();
    let handle = tokio::spawn(async move { scheduler.run_forever().await });

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(engine.calls(), 1);

    stop_tx.send(true).unwrap();
    handle.await.unwrap().unwrap();

    // The in-flight cycle was abandoned, nothing was published, and the
    // stop did not wait out the stalled engine.
    assert!(start.elapsed() < Duration::from_secs(100));
    assert_eq!(*phase.borrow(), SchedulerPhase::Stopped);
    assert!(published.published().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stop_before_first_iteration_runs_no_cycle() {
    let engine = Arc::new(MockEngine::new());
    let (stop_tx, stop_rx) = watch::channel(false);
    stop_tx.send(true).unwrap();
    let scheduler = scheduler_for(engine.clone(), clock_at(9, 15), stop_rx);
    let phase = scheduler.phase_watch();

    scheduler.run_forever().await.unwrap();

    assert_eq!(engine.calls(), 0);
    assert_eq!(*phase.borrow(), SchedulerPhase::Stopped);
}
