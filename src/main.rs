//! Binary entrypoint for the daily Oura score sync into Notion.
//! One-shot: reads configuration from the environment, syncs the trailing
//! window of days, and exits non-zero if anything could not be synced.

use std::process::ExitCode;

use anyhow::Context;
use oura_notion_sync::{run, SyncConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logs go to stdout. `LOG_FORMAT=json` switches to one JSON object per line;
/// `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("oura_notion_sync=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_target(false)).init();
    } else {
        registry.with(fmt::layer().compact().with_target(false)).init();
    }
}

async fn sync_once() -> anyhow::Result<bool> {
    let cfg = SyncConfig::from_env().context("loading configuration")?;
    tracing::debug!(config = ?cfg, "configuration loaded");

    let today = chrono::Local::now().date_naive();
    let report = run(&cfg, today).await.context("setting up sync")?;

    for f in &report.fetch_errors {
        tracing::error!(
            date = %f.date,
            category = f.category,
            error = %f.error,
            "unsynced category"
        );
    }
    for f in &report.failures {
        tracing::error!(date = %f.date, error = %f.error, "unsynced date");
    }
    Ok(report.is_success())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    match sync_once().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            tracing::error!("sync finished with errors");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("sync aborted: {e:#}");
            ExitCode::FAILURE
        }
    }
}
