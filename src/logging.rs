//! Tracing setup.
//!
//! Console output goes to stderr so command results on stdout stay clean.
//! With `logging.file` set, a non-blocking file writer is added; keep the
//! returned guard alive until exit or buffered lines are lost.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LoggingConfig;

/// Filter directive for a level, scoped to this crate.
fn directive(level: &str) -> String {
    format!("vibesplit={level}")
}

pub fn init(config: &LoggingConfig, debug: bool) -> Result<Option<WorkerGuard>> {
    let level = if debug { "debug" } else { config.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive(level)));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let Some(path) = &config.file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(console)
            .try_init()
            .context("Failed to install tracing subscriber")?;
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {:?}", dir))?;
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {:?}", path))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!("Logging to {:?}", path);
    Ok(Some(guard))
}
