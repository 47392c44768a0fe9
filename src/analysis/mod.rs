//! Analysis engine integration.
//!
//! Defines the `AnalysisEngine` trait and provides implementations for
//! the remote multi-agent analysis service and a built-in demo engine
//! used when no service is configured.

pub mod demo;
pub mod remote;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::TradingReport;

/// Abstraction over the trading-analysis collaborator.
///
/// Implementors run one full analysis pass and return its payload. The
/// engine is held as a capability by the cycle runner, so tests can
/// substitute a deterministic implementation.
#[async_trait]
pub trait AnalysisEngine: Send + Sync {
    /// Run one analysis pass and return its results.
    ///
    /// May fail; the caller is expected to capture failures as data
    /// rather than propagate them.
    async fn run_analysis(&self) -> Result<TradingReport>;

    /// Engine identifier string for logging.
    fn name(&self) -> &str;
}
