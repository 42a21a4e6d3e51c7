use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Route all tracing output to `path`, since the terminal belongs to the UI.
///
/// The filter defaults to `info` and can be overridden with `RUST_LOG`. Keep
/// the returned guard alive until exit so buffered lines get flushed.
pub(crate) fn init(path: &Path) -> Result<WorkerGuard> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let format_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (writer, guard) = tracing_appender::non_blocking(file);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(format_filter);

    tracing_subscriber::registry().with(file_layer).try_init()?;
    Ok(guard)
}
