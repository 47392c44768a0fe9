//! Human-readable cycle summaries.
//!
//! Pure formatting of a `CycleResult`. Degrades gracefully: any list the
//! engine omitted counts as empty, so summarizing never fails.

use crate::types::{CycleOutcome, CycleResult};

/// One-line summary of a cycle, for the CLI and alert messages.
pub fn summarize(result: &CycleResult) -> String {
    let stamp = result.timestamp.format("%Y-%m-%d %H:%M UTC");

    match &result.outcome {
        CycleOutcome::Completed(report) => {
            let (sold, bought) = report
                .demo_results
                .as_ref()
                .map(|d| (d.sold.len(), d.bought.len()))
                .unwrap_or((0, 0));
            let recommendations = report.real_actions.as_ref().map(Vec::len).unwrap_or(0);

            format!(
                "✅ {stamp} | {} — {} | demo: {sold} sold, {bought} bought | {recommendations} recommendation(s)",
                result.market_state, result.market_focus,
            )
        }
        CycleOutcome::Failed(error) => format!(
            "⚠️ {stamp} | {} — {} | cycle failed: {error}",
            result.market_state, result.market_focus,
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
