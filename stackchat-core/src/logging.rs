//! Subscriber setup shared by the binaries.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::StackchatResult;

/// Where log lines go.
#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    /// Appended to; used when the terminal belongs to a full-screen UI.
    File(PathBuf),
}

/// Pick the filter directive, first match wins: `RUST_LOG`, the directive
/// the binary asked for (e.g. `--verbose`), `logging.level`, the binary's
/// default.
pub fn resolve_directive(
    rust_log: Option<&str>,
    requested: Option<&str>,
    configured: Option<&str>,
    default_directive: &str,
) -> String {
    [rust_log, requested, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|d| !d.is_empty())
        .unwrap_or(default_directive)
        .to_string()
}

pub fn env_filter(
    config: &LoggingConfig,
    requested: Option<&str>,
    default_directive: &str,
) -> EnvFilter {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = resolve_directive(
        rust_log.as_deref(),
        requested,
        config.level.as_deref(),
        default_directive,
    );
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(default_directive))
}

pub fn init_logging(
    config: &LoggingConfig,
    requested: Option<&str>,
    default_directive: &str,
    target: LogTarget,
) -> StackchatResult<()> {
    let filter = env_filter(config, requested, default_directive);

    match target {
        LogTarget::Stderr => {
            let registry = tracing_subscriber::registry().with(filter);
            if config.json_format {
                registry
                    .with(fmt::layer().json().with_writer(std::io::stderr))
                    .try_init()
                    .ok();
            } else {
                registry
                    .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                    .try_init()
                    .ok();
            }
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            let writer = Mutex::new(file);
            let registry = tracing_subscriber::registry().with(filter);
            if config.json_format {
                registry
                    .with(fmt::layer().json().with_writer(writer))
                    .try_init()
                    .ok();
            } else {
                registry
                    .with(fmt::layer().with_ansi(false).with_writer(writer))
                    .try_init()
                    .ok();
            }
        }
    }

    Ok(())
}
