//! Shared types for the SENTINEL agent.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that the market clock, analysis,
//! and engine modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Market session status
// ---------------------------------------------------------------------------

/// The trading-session window the current wall-clock time falls into.
///
/// Derived on demand from the clock, never persisted. `UkOpen` is retained
/// even though the EU window fully covers the UK window (see `market`):
/// the variant becomes reachable the moment either window is re-tuned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketStatus {
    EuOpen,
    UsOpen,
    UkOpen,
    Closed,
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketStatus::EuOpen => write!(f, "EU_OPEN"),
            MarketStatus::UsOpen => write!(f, "US_OPEN"),
            MarketStatus::UkOpen => write!(f, "UK_OPEN"),
            MarketStatus::Closed => write!(f, "CLOSED"),
        }
    }
}

impl MarketStatus {
    /// Whether any session is currently trading.
    pub fn is_open(&self) -> bool {
        !matches!(self, MarketStatus::Closed)
    }

    /// Human-readable description of what the agent concentrates on
    /// during this session.
    pub fn focus(&self) -> &'static str {
        match self {
            MarketStatus::EuOpen => "European markets (ASML, SAP focus)",
            MarketStatus::UsOpen => "US markets (full coverage)",
            MarketStatus::UkOpen => "UK markets",
            MarketStatus::Closed => "Preparation and monitoring mode",
        }
    }
}

// ---------------------------------------------------------------------------
// Analysis payload
// ---------------------------------------------------------------------------

/// Payload returned by the analysis engine for one cycle.
///
/// The engine is external, so every field is optional and unknown fields
/// are ignored. Consumers must treat absent lists as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradingReport {
    /// Simulated (paper) trades executed during the cycle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_results: Option<DemoResults>,
    /// Recommended live actions, if the engine produced any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_actions: Option<Vec<RecommendedAction>>,
}

/// Paper-trading fills from a demo/simulated run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DemoResults {
    #[serde(default)]
    pub sold: Vec<TradeFill>,
    #[serde(default)]
    pub bought: Vec<TradeFill>,
}

/// A single simulated fill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeFill {
    pub symbol: String,
    pub shares: f64,
    pub price: f64,
}

/// A recommended live action from the analysis engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub symbol: String,
    pub action: ActionKind,
    /// Engine confidence in [0.0, 1.0].
    pub confidence: f64,
    #[serde(default)]
    pub rationale: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Buy => write!(f, "BUY"),
            ActionKind::Sell => write!(f, "SELL"),
            ActionKind::Hold => write!(f, "HOLD"),
        }
    }
}

// ---------------------------------------------------------------------------
// Cycle result
// ---------------------------------------------------------------------------

/// Outcome of one analysis cycle: either the engine's payload or a
/// captured failure description. Exactly one of the two, by construction.
///
/// Serializes externally tagged, so the wire form carries either a
/// `trading_results` or an `error` key — never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CycleOutcome {
    #[serde(rename = "trading_results")]
    Completed(TradingReport),
    #[serde(rename = "error")]
    Failed(String),
}

/// Record produced once per cycle and handed straight to the summarizer
/// or logger. Not retained across cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleResult {
    /// Correlation id for all log events of this cycle.
    pub cycle_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub market_state: MarketStatus,
    pub market_focus: String,
    #[serde(flatten)]
    pub outcome: CycleOutcome,
}

impl CycleResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, CycleOutcome::Completed(_))
    }

    /// The engine payload, when the cycle completed.
    pub fn trading_results(&self) -> Option<&TradingReport> {
        match &self.outcome {
            CycleOutcome::Completed(report) => Some(report),
            CycleOutcome::Failed(_) => None,
        }
    }

    /// The captured failure description, when the cycle failed.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            CycleOutcome::Completed(_) => None,
            CycleOutcome::Failed(message) => Some(message),
        }
    }
}

// ---------------------------------------------------------------------------
// Scheduler phase
// ---------------------------------------------------------------------------

/// Lifecycle phase of the continuous scheduling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerPhase {
    Running,
    Suspended,
    Stopped,
}

impl fmt::Display for SchedulerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerPhase::Running => write!(f, "🟢 RUNNING"),
            SchedulerPhase::Suspended => write!(f, "🟡 SUSPENDED"),
            SchedulerPhase::Stopped => write!(f, "🔴 STOPPED"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for SENTINEL.
#[derive(Debug, thiserror::Error)]
pub enum SentinelError {
    #[error("Analysis engine error ({engine}): {message}")]
    Analysis { engine: String, message: String },

    #[error("Analysis engine timed out after {0}s")]
    AnalysisTimeout(u64),

    #[error("Alert delivery failed: {0}")]
    Alert(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
