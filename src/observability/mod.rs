//! Observability.
//!
//! Installs the process-wide `tracing` subscriber. Library code emits events
//! and `metrics` counters unconditionally; without an installed subscriber or
//! recorder they are no-ops.

mod logging;

pub use logging::{ENV_LOG_FILTER, LogFormat, LoggingConfig};

use crate::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

type FmtLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Installs the global subscriber described by `config`.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the log file cannot be opened or a
/// global subscriber is already installed.
pub fn init(config: LoggingConfig) -> Result<()> {
    let to_file = config.file.is_some();
    let writer = log_writer(config.file.as_deref())?;

    tracing_subscriber::registry()
        .with(fmt_layer(config.format, writer, to_file))
        .with(config.filter)
        .try_init()
        .map_err(|e| Error::OperationFailed {
            operation: "init_logging".to_string(),
            cause: e.to_string(),
        })
}

/// Event formatter for `format`. Files never get ANSI colour codes.
fn fmt_layer(format: LogFormat, writer: BoxMakeWriter, to_file: bool) -> FmtLayer {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(true);
    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Pretty if to_file => layer.with_ansi(false).boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
    }
}

/// Stderr, or the given file opened for appending.
fn log_writer(file: Option<&Path>) -> Result<BoxMakeWriter> {
    match file {
        Some(path) => append_to(path).map(|file| BoxMakeWriter::new(Mutex::new(file))),
        None => Ok(BoxMakeWriter::new(io::stderr)),
    }
}

fn append_to(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
            operation: "create_log_dir".to_string(),
            cause: format!("{}: {e}", parent.display()),
        })?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::OperationFailed {
            operation: "open_log_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })
}
