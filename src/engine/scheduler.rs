//! Cycle scheduler.
//!
//! Drives the runner either once (single-shot) or in an unbounded loop
//! (continuous). The loop is market-aware: cycles are skipped while all
//! sessions are closed, the wait between iterations depends on the current
//! session, and unexpected faults convert into a fixed backoff instead of
//! terminating the loop. The only exit path is the external stop signal,
//! which interrupts either suspension point promptly.

use anyhow::Result;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

use crate::engine::runner::CycleRunner;
use crate::engine::summary::summarize;
use crate::market::MarketClock;
use crate::types::{CycleResult, MarketStatus, SchedulerPhase};

// ---------------------------------------------------------------------------
// Scheduling intervals
// ---------------------------------------------------------------------------

/// Wait between cycles while any session is open.
pub const OPEN_INTERVAL_SECS: u64 = 1800;
/// Wait between iterations while all sessions are closed.
pub const CLOSED_INTERVAL_SECS: u64 = 3600;
/// Fixed wait after an unexpected loop fault. Faults are rare and each
/// cycle is self-contained, so a flat backoff bounds the retry rate
/// without exponential bookkeeping.
pub const FAULT_BACKOFF_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub open_interval: Duration,
    pub closed_interval: Duration,
    pub fault_backoff: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            open_interval: Duration::from_secs(OPEN_INTERVAL_SECS),
            closed_interval: Duration::from_secs(CLOSED_INTERVAL_SECS),
            fault_backoff: Duration::from_secs(FAULT_BACKOFF_SECS),
        }
    }
}

impl SchedulerConfig {
    /// The wait to apply after an iteration observed the given session.
    pub fn interval_for(&self, status: MarketStatus) -> Duration {
        if status.is_open() {
            self.open_interval
        } else {
            self.closed_interval
        }
    }
}

impl From<&crate::config::SchedulerSettings> for SchedulerConfig {
    fn from(settings: &crate::config::SchedulerSettings) -> Self {
        Self {
            open_interval: Duration::from_secs(settings.open_interval_secs),
            closed_interval: Duration::from_secs(settings.closed_interval_secs),
            fault_backoff: Duration::from_secs(settings.fault_backoff_secs),
        }
    }
}

// ---------------------------------------------------------------------------
// Cycle sink
// ---------------------------------------------------------------------------

/// Where completed cycle results are handed off each iteration.
///
/// A sink failure counts as a loop fault: logged, backed off, never fatal.
pub trait CycleSink: Send + Sync {
    fn publish(&self, result: &CycleResult) -> Result<()>;
}

/// Default sink: one structured log line per cycle.
pub struct LogSink;

impl CycleSink for LogSink {
    fn publish(&self, result: &CycleResult) -> Result<()> {
        info!(cycle_id = %result.cycle_id, "{}", summarize(result));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

pub struct CycleScheduler {
    runner: CycleRunner,
    clock: MarketClock,
    config: SchedulerConfig,
    sink: Box<dyn CycleSink>,
    stop: watch::Receiver<bool>,
    phase: watch::Sender<SchedulerPhase>,
}

impl CycleScheduler {
    pub fn new(
        runner: CycleRunner,
        clock: MarketClock,
        config: SchedulerConfig,
        stop: watch::Receiver<bool>,
    ) -> Self {
        let (phase, _) = watch::channel(SchedulerPhase::Running);
        Self {
            runner,
            clock,
            config,
            sink: Box::new(LogSink),
            stop,
            phase,
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn CycleSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Observe RUNNING/SUSPENDED/STOPPED transitions.
    pub fn phase_watch(&self) -> watch::Receiver<SchedulerPhase> {
        self.phase.subscribe()
    }

    fn enter(&self, phase: SchedulerPhase) {
        self.phase.send_replace(phase);
    }

    /// Single-shot mode: run exactly one cycle, regardless of market
    /// state, and hand the result back to the caller.
    pub async fn run_once(&self) -> CycleResult {
        self.runner.run_cycle().await
    }

    /// Continuous mode: loop until the stop signal fires.
    ///
    /// Each iteration queries the market clock, runs a cycle when any
    /// session is open, and suspends for the session-dependent interval.
    /// An iteration fault is logged and followed by the fixed backoff;
    /// the loop itself never terminates on a fault.
    pub async fn run_forever(&self) -> Result<()> {
        let mut stop = self.stop.clone();

        info!(
            open_interval_secs = self.config.open_interval.as_secs(),
            closed_interval_secs = self.config.closed_interval.as_secs(),
            fault_backoff_secs = self.config.fault_backoff.as_secs(),
            "Entering scheduling loop"
        );

        loop {
            if *stop.borrow() {
                self.enter(SchedulerPhase::Stopped);
                info!("Stop requested — exiting scheduling loop");
                break;
            }

            let wait = tokio::select! {
                iteration = self.iteration() => match iteration {
                    Ok(wait) => wait,
                    Err(e) => {
                        error!(
                            error = format!("{e:#}"),
                            backoff_secs = self.config.fault_backoff.as_secs(),
                            "Scheduling iteration failed — backing off"
                        );
                        self.config.fault_backoff
                    }
                },
                _ = stop.changed() => {
                    self.enter(SchedulerPhase::Stopped);
                    info!("Stop signal received mid-cycle — exiting scheduling loop");
                    break;
                }
            };

            self.enter(SchedulerPhase::Suspended);
            info!(wait_secs = wait.as_secs(), "Suspended until next cycle");

            tokio::select! {
                _ = tokio::time::sleep(wait) => self.enter(SchedulerPhase::Running),
                _ = stop.changed() => {
                    self.enter(SchedulerPhase::Stopped);
                    info!("Stop signal received — exiting scheduling loop");
                    break;
                }
            }
        }

        Ok(())
    }

    async fn iteration(&self) -> Result<Duration> {
        let status = self.clock.status();

        if status.is_open() {
            let result = self.runner.run_cycle().await;
            self.sink.publish(&result)?;
        } else {
            info!(
                market_state = %status,
                focus = status.focus(),
                "Markets closed — skipping analysis cycle"
            );
        }

        Ok(self.config.interval_for(status))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
