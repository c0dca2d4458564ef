//! File-backed tracing setup. The TUI owns stdout, so every log line goes to
//! `filament-manager.log` instead of the terminal.

use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

const LOG_FILE_NAME: &str = "filament-manager.log";
const FALLBACK_FILTER: &str = "info";

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered lines are flushed.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    if !config.enabled {
        return Ok(None);
    }

    let dir = config.resolve_dir()?;

    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(build_filter(&config.level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(Some(guard))
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_level_falls_back() {
        assert_eq!(
            build_filter("filament_manager=notalevel").to_string(),
            FALLBACK_FILTER
        );
        assert_eq!(build_filter("debug").to_string(), "debug");
    }

    #[test]
    fn disabled_logging_installs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            enabled: false,
            dir: Some(dir.path().join("logs")),
            ..LoggingConfig::default()
        };
        assert!(init_logging(&config).unwrap().is_none());
        assert!(!dir.path().join("logs").exists());
    }

    #[test]
    fn disabled_logging_skips_directory_lookup() {
        let config = LoggingConfig {
            enabled: false,
            dir: None,
            ..LoggingConfig::default()
        };
        assert!(init_logging(&config).unwrap().is_none());
    }
}
