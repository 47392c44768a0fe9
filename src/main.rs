//! SENTINEL — Market-Intelligent Trading Automation Agent
//!
//! Entry point. Initialises structured logging, loads configuration,
//! wires the market clock, analysis engine, and scheduler, and runs
//! either a single cycle or the continuous market-aware loop with
//! graceful shutdown.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use sentinel::alerts::{self, TelegramNotifier};
use sentinel::analysis::demo::DemoAnalysisEngine;
use sentinel::analysis::remote::RemoteAnalysisEngine;
use sentinel::analysis::AnalysisEngine;
use sentinel::config::AppConfig;
use sentinel::engine::runner::CycleRunner;
use sentinel::engine::scheduler::{CycleScheduler, SchedulerConfig};
use sentinel::engine::summary::summarize;
use sentinel::market::MarketClock;

const BANNER: &str = r#"
 ____  _____ _   _ _____ ___ _   _ _____ _
/ ___||  ___| \ | |_   _|_ _| \ | | ____| |
\___ \| |__ |  \| | | |  | ||  \| |  _| | |
 ___) |  __|| |\  | | |  | || |\  | |___| |___
|____/|_____|_| \_| |_| |___|_| \_|_____|_____|

  Market-Intelligent Trading Automation
  v0.1.0 — 24/7 Agent
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Initialise structured logging
    init_logging();

    // Load configuration; missing or broken config degrades to defaults
    let cfg = AppConfig::load_or_default("config.toml");

    // Print startup banner
    println!("{BANNER}");
    info!(
        agent_name = %cfg.agent.name,
        open_interval_secs = cfg.scheduler.open_interval_secs,
        closed_interval_secs = cfg.scheduler.closed_interval_secs,
        fault_backoff_secs = cfg.scheduler.fault_backoff_secs,
        "SENTINEL starting up"
    );

    let continuous = std::env::args()
        .skip(1)
        .any(|arg| arg == "--continuous" || arg == "-c");

    // -- Initialise components -------------------------------------------

    let clock = MarketClock::system();

    let engine: Arc<dyn AnalysisEngine> = match cfg.analysis.endpoint.clone() {
        Some(endpoint) => {
            let api_key = cfg
                .analysis
                .api_key_env
                .as_deref()
                .and_then(|env| std::env::var(env).ok());
            info!(endpoint = %endpoint, "Using remote analysis engine");
            Arc::new(RemoteAnalysisEngine::new(endpoint, api_key)?)
        }
        None => {
            warn!("No analysis endpoint configured — running the built-in demo engine");
            Arc::new(DemoAnalysisEngine::new())
        }
    };

    let mut runner = CycleRunner::new(engine, clock.clone());
    if let Some(secs) = cfg.analysis.timeout_secs {
        runner = runner.with_timeout(Duration::from_secs(secs));
    }

    let notifier = TelegramNotifier::from_config(&cfg.alerts).map(Arc::new);

    let (stop_tx, stop_rx) = watch::channel(false);
    let scheduler = CycleScheduler::new(
        runner,
        clock,
        SchedulerConfig::from(&cfg.scheduler),
        stop_rx,
    );

    // -- Run ---------------------------------------------------------------

    if continuous {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received.");
                let _ = stop_tx.send(true);
            }
        });

        if let Some(notifier) = &notifier {
            alerts::send_in_background(
                Arc::clone(notifier),
                format!("🤖 {} entering continuous mode", cfg.agent.name),
            );
        }

        info!("Entering continuous mode. Press Ctrl+C to stop.");
        scheduler.run_forever().await?;
        info!("SENTINEL shut down cleanly.");
    } else {
        let result = scheduler.run_once().await;
        let summary = summarize(&result);
        println!("{summary}");

        if let Some(notifier) = &notifier {
            if let Err(e) = notifier.send_alert(&summary).await {
                warn!(error = format!("{e:#}"), "Alert delivery failed");
            }
        }
    }

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sentinel=info"));

    let json_logging = std::env::var("SENTINEL_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
