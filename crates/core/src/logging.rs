//! Log output for deployer processes.
//!
//! Each component writes its own daily-rolled file (`<component>.<date>`).
//! Filtering comes from `WABSCOPE_LOG` using `EnvFilter` syntax; without it,
//! engine crates log at `info` and everything else at `warn`.

use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const LOG_ENV: &str = "WABSCOPE_LOG";
const DEFAULT_DIRECTIVES: &str = "warn,wabscope_core=info,wabscope_runtime=info";

/// `~/.wabscope/logs`, or `./.wabscope/logs` when `HOME` is unset.
pub fn default_log_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".wabscope").join("logs")
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global subscriber, logging under [`default_log_dir`].
pub fn init_logging(component: &str, to_stderr: bool) -> Option<WorkerGuard> {
    init_logging_in(&default_log_dir(), component, to_stderr)
}

/// Install the global subscriber with a file layer under `log_dir`.
///
/// Returns `None` if a global subscriber is already installed. The returned
/// guard flushes the file writer on drop.
pub fn init_logging_in(log_dir: &Path, component: &str, to_stderr: bool) -> Option<WorkerGuard> {
    let _ = std::fs::create_dir_all(log_dir);

    let file_appender = tracing_appender::rolling::daily(log_dir, component);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);
    let registry = tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer);

    let installed = if to_stderr {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);
        registry.with(stderr_layer).try_init()
    } else {
        registry.try_init()
    };

    installed.ok().map(|_| guard)
}
