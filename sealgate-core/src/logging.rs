//! Tracing bootstrap: human-readable stderr plus optional JSON file logging.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::error::CoreError;

/// Install the global tracing subscriber.
///
/// The returned guard flushes the JSON writer on drop and must be held for the
/// lifetime of the process. Installing twice returns an error.
pub fn init_tracing(config: &LoggingConfig) -> Result<Option<WorkerGuard>, CoreError> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| CoreError::Logging(format!("invalid level '{}': {e}", config.level)))?;

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    let (json_layer, guard) = match &config.json_log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = tracing_appender::rolling::daily(dir, "sealgate.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::new("debug"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .try_init()
        .map_err(|e| CoreError::Logging(e.to_string()))?;

    Ok(guard)
}
