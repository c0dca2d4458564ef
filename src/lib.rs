//! Core library surface for the Filament Manager TUI application.
//!
//! The binary only wires these pieces together: load the configuration, start
//! logging, open the store, and hand both to the interactive [`App`].
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod ui;

/// Configuration provider read once at start-up.
pub use config::Config;

/// Convenience re-exports for the persistence layer.
pub use db::{ensure_schema, open_store};

pub use logging::init_logging;

pub use models::{Filament, SpoolStatus};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
