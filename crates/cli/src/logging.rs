//! Logging setup for the CLI

use std::path::Path;

use quarry::config::LoggingConfig;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Parse log level from config string
fn parse_log_level(level: &str) -> LevelFilter {
  match level.to_lowercase().as_str() {
    "off" => LevelFilter::OFF,
    "error" => LevelFilter::ERROR,
    "warn" => LevelFilter::WARN,
    "info" => LevelFilter::INFO,
    "debug" => LevelFilter::DEBUG,
    "trace" => LevelFilter::TRACE,
    _ => LevelFilter::INFO,
  }
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
  // RUST_LOG wins over the configured level
  EnvFilter::builder()
    .with_default_directive(parse_log_level(&config.level).into())
    .from_env_lossy()
}

fn init_console_logging(config: &LoggingConfig) {
  tracing_subscriber::fmt()
    .with_env_filter(env_filter(config))
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();
}

/// Initialize logging from the `[logging]` section.
///
/// Logs go to stderr unless a file is configured, in which case they go to a
/// rolling file only. Returns the guard that must be kept alive for the
/// duration of the program when logging to a file.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
  let Some(path) = &config.file else {
    init_console_logging(config);
    return None;
  };

  let dir = path
    .parent()
    .filter(|p| !p.as_os_str().is_empty())
    .unwrap_or(Path::new("."));
  let file_name = path
    .file_name()
    .map(|n| n.to_os_string())
    .unwrap_or_else(|| "quarry.log".into());

  if std::fs::create_dir_all(dir).is_err() {
    // Fall back to console-only logging
    init_console_logging(config);
    return None;
  }

  let file_appender = match config.rotation.as_str() {
    "hourly" => tracing_appender::rolling::hourly(dir, &file_name),
    "never" => tracing_appender::rolling::never(dir, &file_name),
    _ => tracing_appender::rolling::daily(dir, &file_name),
  };
  let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

  tracing_subscriber::fmt()
    .with_env_filter(env_filter(config))
    .with_target(true)
    .with_ansi(false)
    .with_writer(file_writer)
    .init();

  Some(guard)
}
