//! Wiring between the CLI and the core state.

use anyhow::{Context, Result};
use edupath_core::{AppConfig, AppState, GeminiClient, Outcome, SqliteStore, SystemClock};
use std::sync::Arc;

/// Open the persistent store and build the application state
pub fn open_app(config: &AppConfig) -> Result<AppState> {
    let path = config.store_path();
    let store = SqliteStore::open(&path)
        .with_context(|| format!("Failed to open store at {}", path.display()))?;
    let generator = GeminiClient::from_config(config)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    log::debug!("[CLI] Using store {}", path.display());
    Ok(AppState::load(
        Box::new(store),
        Arc::new(SystemClock),
        Arc::new(generator),
        config,
    ))
}

/// Wait for the running operation. Ctrl-C cancels it, in which case the
/// cancellation status is left on the state and `None` is returned.
pub async fn wait_or_cancel(app: &mut AppState) -> Result<Option<Outcome>> {
    let finished = tokio::select! {
        outcome = app.wait_current() => Some(outcome),
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            None
        }
    };

    match finished {
        Some(outcome) => Ok(outcome),
        None => {
            app.cancel();
            Ok(None)
        }
    }
}
