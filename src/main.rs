//! Binary entry point that glues the SQLite store to the TUI: read the
//! configuration, start file logging, open the store, and drive the Ratatui
//! event loop until the user exits.
use anyhow::Context;
use filament_manager::{init_logging, open_store, run_app, App, Config};
use tracing::info;

/// Returning a `Result` bubbles fatal problems (an unreadable config, a failed
/// write to the store) to the terminal with a non-zero exit code.
fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = init_logging(&config.logging)?;
    info!(version = %config.version, "starting filament manager");

    let conn = open_store(&config.database_path()?)?;
    let mut app = App::new(conn, config);
    run_app(&mut app)?;

    info!("filament manager exited cleanly");
    Ok(())
}
