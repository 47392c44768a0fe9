//! Built-in demo analysis engine.
//!
//! Selected when no remote endpoint is configured. Produces an empty
//! report so the full scheduling path stays exercisable without any
//! external service, in the same spirit as a dry-run executor.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use super::AnalysisEngine;
use crate::types::{DemoResults, TradingReport};

pub struct DemoAnalysisEngine;

impl DemoAnalysisEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DemoAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisEngine for DemoAnalysisEngine {
    async fn run_analysis(&self) -> Result<TradingReport> {
        debug!("Demo engine pass — no external analysis performed");
        Ok(TradingReport {
            demo_results: Some(DemoResults::default()),
            real_actions: Some(Vec::new()),
        })
    }

    fn name(&self) -> &str {
        "demo"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
