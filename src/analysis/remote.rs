//! Remote analysis service integration.
//!
//! Implements the `AnalysisEngine` trait against the multi-agent analysis
//! service over HTTP. One POST per cycle; the service runs its full
//! pipeline and replies with a `TradingReport` JSON body.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::AnalysisEngine;
use crate::types::{SentinelError, TradingReport};

/// Connection-level timeout for the HTTP client itself. The per-cycle
/// analysis timeout, when configured, is enforced by the cycle runner.
const HTTP_TIMEOUT_SECS: u64 = 120;

pub struct RemoteAnalysisEngine {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoteAnalysisEngine {
    pub fn new(endpoint: String, api_key: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .context("Failed to build analysis HTTP client")?;

        Ok(Self {
            http,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl AnalysisEngine for RemoteAnalysisEngine {
    async fn run_analysis(&self) -> Result<TradingReport> {
        debug!(endpoint = %self.endpoint, "Requesting analysis run");

        let mut request = self.http.post(&self.endpoint).json(&serde_json::json!({}));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .context("Analysis service request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SentinelError::Analysis {
                engine: "remote".to_string(),
                message: format!("HTTP {status}: {body}"),
            }
            .into());
        }

        let report: TradingReport = response
            .json()
            .await
            .context("Failed to decode analysis response")?;

        debug!(
            demo_trades = report
                .demo_results
                .as_ref()
                .map(|d| d.sold.len() + d.bought.len())
                .unwrap_or(0),
            recommendations = report.real_actions.as_ref().map(Vec::len).unwrap_or(0),
            "Analysis response decoded"
        );

        Ok(report)
    }

    fn name(&self) -> &str {
        "remote"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
