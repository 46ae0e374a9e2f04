use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Installs the global subscriber.
///
/// Returns the log file path, or `None` when logging to stderr.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<PathBuf>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (writer, log_path) = if config.to_stderr {
        (BoxMakeWriter::new(std::io::stderr), None)
    } else {
        let path = config.resolved_file_path();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(config.append)
            .truncate(!config.append)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        (BoxMakeWriter::new(Mutex::new(file)), Some(path))
    };
    let ansi = log_path.is_none();

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            let fmt_layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer);
            registry.with(fmt_layer).try_init()?;
        }
        _ => {
            let fmt_layer = fmt::layer()
                .with_target(false)
                .with_ansi(ansi)
                .with_writer(writer);
            registry.with(fmt_layer).try_init()?;
        }
    }

    tracing::info!("----------------------------");
    tracing::info!("Logging initialized with level: {}", config.level);
    Ok(log_path)
}
