use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Target for upstream values that were corrected before use.
pub const UPSTREAM_TARGET: &str = "tracker::upstream";

/// stderr shares the terminal with the progress line, so only errors and
/// corrected upstream data get through by default.
const STDERR_DEFAULT_FILTER: &str = "error,tracker::upstream=warn";

/// Install the global subscriber.
///
/// stdout belongs to the progress line, so logs go to `log_file` when one is
/// given and to stderr otherwise. `RUST_LOG` overrides the default level.
pub fn init_logging(log_file: Option<&Path>) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false),
                )
                .with(env_filter("info"))
                .try_init()
                .context("failed to install log subscriber")?;
        }
        None => {
            tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .with(env_filter(STDERR_DEFAULT_FILTER))
                .try_init()
                .context("failed to install log subscriber")?;
        }
    }
    Ok(())
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}
