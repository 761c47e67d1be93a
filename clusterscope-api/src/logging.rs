//! Logging initialization
//!
//! Console output always; an optional daily-rolling file layer when file
//! logging is enabled. `RUST_LOG` takes precedence over the configured level.

use std::io;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "clusterscope.log";

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, TryInitError> {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_ansi(true)
        .with_writer(io::stdout);

    let (file_layer, guard) = if config.file_logging_enabled {
        let appender = rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
        let (writer, guard) = non_blocking(appender);

        let layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_thread_ids(true)
            .with_ansi(false)
            .with_writer(writer);
        let layer = if config.json_format {
            layer.json().boxed()
        } else {
            layer.boxed()
        };
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    tracing::info!(
        level = %config.level,
        file_logging = config.file_logging_enabled,
        "Logging initialized"
    );

    Ok(guard)
}
