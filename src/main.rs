use anyhow::Result;
use evloader::{EvDataLoader, LoaderConfig};
use reqwest::Client;
use std::env;
use tokio::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Records echoed in the summary.
const PREVIEW_ROWS: usize = 5;

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) configure ────────────────────────────────────────────────
    let cfg = LoaderConfig::from_env()?;
    let loader = EvDataLoader::new(Client::new(), &cfg)?;
    info!(url = %loader.source(), policy = %cfg.policy, "startup");

    // ─── 3) activate & follow transitions ────────────────────────────
    let start = Instant::now();
    let mut handle = loader.start();
    let mut updates = handle.subscribe();
    info!(state = handle.state().as_str(), loading = handle.loading(), "activated");

    let watcher = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            info!(state = state.as_str(), loading = state.is_loading(), "state changed");
            if state.is_settled() {
                break;
            }
        }
    });

    let state = handle.settled().await;
    let _ = watcher.await;

    // ─── 4) report ───────────────────────────────────────────────────
    let summary = serde_json::json!({
        "loading": state.is_loading(),
        "error": state.error().map(|e| e.message()),
        "record_count": state.records().len(),
        "preview": state.records().iter().take(PREVIEW_ROWS).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(err) = state.error() {
        error!(error = %err, elapsed = ?start.elapsed(), "load failed");
        std::process::exit(1);
    }

    info!(elapsed = ?start.elapsed(), "all done");
    Ok(())
}
