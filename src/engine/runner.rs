//! Cycle runner.
//!
//! Invokes the analysis engine once per cycle and normalizes whatever
//! happens — payload, failure, or timeout — into a `CycleResult`. Callers
//! never need error handling around a cycle; they inspect the result.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::AnalysisEngine;
use crate::market::MarketClock;
use crate::types::{CycleOutcome, CycleResult, SentinelError, TradingReport};

pub struct CycleRunner {
    engine: Arc<dyn AnalysisEngine>,
    clock: MarketClock,
    /// Upper bound on one engine invocation. None preserves the unbounded
    /// baseline behaviour.
    timeout: Option<Duration>,
}

impl CycleRunner {
    pub fn new(engine: Arc<dyn AnalysisEngine>, clock: MarketClock) -> Self {
        Self {
            engine,
            clock,
            timeout: None,
        }
    }

    /// Bound each engine invocation; a timeout is captured as a normal
    /// cycle failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run one analysis cycle.
    ///
    /// Always returns a well-formed result: timestamp, market state, and
    /// focus are stamped from the clock whether the engine succeeds or
    /// fails, so every result is self-describing.
    pub async fn run_cycle(&self) -> CycleResult {
        let cycle_id = Uuid::new_v4();
        let timestamp = self.clock.now();
        let market_state = self.clock.status();
        let market_focus = market_state.focus().to_string();

        info!(
            cycle_id = %cycle_id,
            market_state = %market_state,
            focus = %market_focus,
            engine = self.engine.name(),
            "Starting analysis cycle"
        );

        let outcome = match self.invoke().await {
            Ok(report) => {
                info!(cycle_id = %cycle_id, "Analysis cycle completed");
                CycleOutcome::Completed(report)
            }
            Err(e) => {
                warn!(
                    cycle_id = %cycle_id,
                    error = format!("{e:#}"),
                    "Analysis cycle failed — captured in result"
                );
                CycleOutcome::Failed(format!("{e:#}"))
            }
        };

        CycleResult {
            cycle_id,
            timestamp,
            market_state,
            market_focus,
            outcome,
        }
    }

    async fn invoke(&self) -> anyhow::Result<TradingReport> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.engine.run_analysis())
                .await
                .map_err(|_| SentinelError::AnalysisTimeout(limit.as_secs()))?,
            None => self.engine.run_analysis().await,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
