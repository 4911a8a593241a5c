//! Logging setup
//!
//! Console output always; a daily-rolling file when a log directory is
//! configured. Filtering follows `RUST_LOG`.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const DEFAULT_FILTER: &str = "warehouse_ledger=info,tower_http=info";
const LOG_FILE_PREFIX: &str = "warehouse-ledger.log";

/// Keeps the file writer flushing; drop it only at shutdown.
pub struct TelemetryGuard {
    _file: Option<WorkerGuard>,
}

pub fn init_telemetry(log_dir: Option<&Path>) -> Result<TelemetryGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    Registry::default()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init()
        .context("Failed to set tracing subscriber")?;

    Ok(TelemetryGuard { _file: guard })
}
