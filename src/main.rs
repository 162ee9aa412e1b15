// =============================================================================
// Stock Tracker — Main Entry Point
// =============================================================================
//
// Terminal client for the technical-indicator service. With a SYMBOL argument
// it fetches once and prints the table; without one it reads symbols from
// stdin until `:q`, EOF or Ctrl+C.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod app_state;
mod fetch;
mod input;
mod presenter;
mod runtime_config;
mod service;
mod terminal;
mod types;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::fetch::FetchOrchestrator;
use crate::input::InputController;
use crate::runtime_config::{RuntimeConfig, API_URL_ENV};
use crate::service::IndicatorClient;
use crate::terminal::RenderOptions;

#[derive(Debug, Parser)]
#[command(name = "stock-tracker", about = "Fetch technical indicators for a ticker and show them as a table")]
struct Cli {
    /// Runtime config file (JSON).
    #[arg(long, default_value = "stock_tracker.json")]
    config: PathBuf,

    /// Indicator service base URL, e.g. http://127.0.0.1:5000.
    #[arg(long, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Fetch this symbol once and exit instead of reading stdin.
    symbol: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with the rendered table.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // ── 2. Config ────────────────────────────────────────────────────────
    let mut config = RuntimeConfig::load(&cli.config).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config.override_api_base_url(cli.api_url.as_deref());

    info!(
        api_base_url = %config.api_base_url,
        race_policy = %config.race_policy,
        "stock tracker starting"
    );

    // ── 3. Wire the three responsibilities ───────────────────────────────
    let state = Arc::new(AppState::new());
    let client = IndicatorClient::new(
        config.api_base_url.clone(),
        config.request_timeout_secs.map(Duration::from_secs),
    )?;
    let orchestrator = FetchOrchestrator::new(state.clone(), client, config.race_policy);
    let input = InputController::new(state.clone(), orchestrator);
    let opts = RenderOptions::from(&config);

    // ── 4. Run ───────────────────────────────────────────────────────────
    match cli.symbol {
        Some(symbol) => {
            let failed = terminal::run_once(state, input, opts, symbol).await?;
            if failed {
                std::process::exit(1);
            }
        }
        None => terminal::run_interactive(state, input, opts).await?,
    }

    Ok(())
}
