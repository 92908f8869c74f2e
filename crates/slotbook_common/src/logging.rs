//! Logging setup shared by the slotbook binaries and tests.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` (so `RUST_LOG`
//! keeps working) and a formatted stdout layer. Optionally a daily rolling,
//! non-blocking file layer is added.

use std::path::Path;
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber at INFO.
///
/// # Examples
///
/// ```
/// use slotbook_common::logging;
///
/// logging::init();
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// Uses `try_init`, so calling it twice (e.g. from several tests) is harmless.
pub fn init_with_level(level: Level) {
    let result = tracing_subscriber::registry()
        .with(stdout_layer())
        .with(filter_for(level))
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Like [`init_with_level`], additionally writing to `<directory>/slotbook.log.<date>`.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the program.
pub fn init_with_file(level: Level, directory: &Path) -> WorkerGuard {
    let appender = tracing_appender::rolling::daily(directory, "slotbook.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let result = tracing_subscriber::registry()
        .with(stdout_layer())
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(filter_for(level))
        .try_init();

    if result.is_ok() {
        info!(
            "Logging initialized at level: {} (file output in {})",
            level,
            directory.display()
        );
    }
    guard
}

/// Parses a configured level name, falling back to INFO.
pub fn parse_level(name: Option<&str>) -> Level {
    name.and_then(|n| n.trim().parse::<Level>().ok())
        .unwrap_or(Level::INFO)
}

fn stdout_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
}

/// Our crates plus `tower_http`, whose `TraceLayer` logs each request.
fn filter_for(level: Level) -> EnvFilter {
    ["slotbook", "tower_http"]
        .iter()
        .fold(EnvFilter::from_default_env(), |filter, target| {
            match format!("{}={}", target, level).parse() {
                Ok(directive) => filter.add_directive(directive),
                Err(_) => filter,
            }
        })
}

/// Log a result, with different messages for success and error cases.
///
/// Returns the original result so it can be used in a chain.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => tracing::error!("{}: {}", error_context, e),
    }
    result
}
