use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when the variable is set but does not parse
const DEFAULT_FILTER: &str = "info";

/// Log file location: `<cache dir>/iisview/iisview.log`
pub fn log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("iisview")
        .join("iisview.log")
}

/// Install a tracing subscriber writing to the log file.
///
/// The terminal belongs to the UI, so nothing is logged unless
/// `IISVIEW_LOG` or `RUST_LOG` is set. Returns the log file path when
/// logging was enabled.
pub fn init() -> Result<Option<PathBuf>> {
    let Some(directives) = std::env::var("IISVIEW_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
    else {
        return Ok(None);
    };

    let path = log_path();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "logging initialized");
    Ok(Some(path))
}
