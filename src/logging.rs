use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Log file name inside the data directory
const LOG_FILE: &str = "holocron.log";

/// Install the global subscriber, writing to the log file.
///
/// Stdout belongs to command output, so logs never go there. The filter is
/// read from `HOLOCRON_LOG` (default `info`). Keep the returned guard alive
/// until exit so buffered lines are flushed.
pub fn init() -> Result<WorkerGuard> {
  let dir = Config::data_dir()?;
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = EnvFilter::try_from_env("HOLOCRON_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}
