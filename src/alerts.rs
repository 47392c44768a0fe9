//! Telegram alert delivery.
//!
//! Notification glue for the CLI layer. Alerts are best-effort: delivery
//! failures are logged, never propagated into the scheduling loop, and
//! the background helper keeps delivery off the scheduler's path entirely.

use anyhow::{Context, Result};
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::AlertsConfig;
use crate::types::SentinelError;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const HTTP_TIMEOUT_SECS: u64 = 10;

pub struct TelegramNotifier {
    http: Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_id: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .context("Failed to build Telegram HTTP client")?;

        Ok(Self {
            http,
            bot_token,
            chat_id,
        })
    }

    /// Build a notifier from config, resolving the referenced env vars.
    ///
    /// Returns None when alerts are not configured, or (with a warning)
    /// when a referenced env var is missing. Alerts never gate startup.
    pub fn from_config(cfg: &AlertsConfig) -> Option<Self> {
        let token_env = cfg.telegram_bot_token_env.as_deref()?;
        let chat_env = cfg.telegram_chat_id_env.as_deref()?;

        let bot_token = match std::env::var(token_env) {
            Ok(v) => v,
            Err(_) => {
                warn!(env = token_env, "Telegram bot token not set — alerts disabled");
                return None;
            }
        };
        let chat_id = match std::env::var(chat_env) {
            Ok(v) => v,
            Err(_) => {
                warn!(env = chat_env, "Telegram chat id not set — alerts disabled");
                return None;
            }
        };

        match Self::new(bot_token, chat_id) {
            Ok(notifier) => Some(notifier),
            Err(e) => {
                warn!(error = %e, "Failed to build Telegram client — alerts disabled");
                None
            }
        }
    }

    /// Deliver one alert message.
    pub async fn send_alert(&self, message: &str) -> Result<()> {
        let url = format!("{TELEGRAM_API_BASE}/bot{}/sendMessage", self.bot_token);
        let params = [("chat_id", self.chat_id.as_str()), ("text", message)];

        let response = self
            .http
            .post(&url)
            .form(&params)
            .send()
            .await
            .context("Telegram request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(SentinelError::Alert(format!("HTTP {status}")).into());
        }

        debug!(chat_id = %self.chat_id, "Alert delivered");
        Ok(())
    }
}

/// Fire-and-forget delivery. Errors are logged; the caller never waits.
pub fn send_in_background(notifier: Arc<TelegramNotifier>, message: String) {
    tokio::spawn(async move {
        if let Err(e) = notifier.send_alert(&message).await {
            warn!(error = format!("{e:#}"), "Alert delivery failed");
        }
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
