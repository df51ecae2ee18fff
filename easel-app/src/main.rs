//! Easel host entry point.
//!
//! Loads settings, wires the client core to its backends and runs one
//! scripted drawing session.

mod session;
mod settings;
mod state;

use anyhow::Result;
use settings::{default_settings_path, load_settings};
use state::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let settings_path = default_settings_path();
    let settings = load_settings(&settings_path);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("easel_core=info,easel_app=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        settings = %settings_path.display(),
        "Easel starting"
    );

    let first_run = !settings_path.exists();
    let state = AppState::new(settings, settings_path);
    if first_run {
        if let Err(e) = state.persist_settings() {
            warn!("could not write default settings: {e}");
        }
    }
    let credentials = session::credentials_from_env();
    let summary = session::run(&state, &credentials).await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
