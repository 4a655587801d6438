//! Structured logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive.
pub const ENV_LOG_FILTER: &str = "PIISCRUB_LOG";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name; unknown names fall back to pretty.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Event filter.
    pub filter: EnvFilter,
    /// Log file; stderr when unset.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Builds the logging config from file settings and environment.
    ///
    /// Filter precedence: `PIISCRUB_LOG`, then `RUST_LOG`, then `debug` when
    /// verbose, then the configured level, then `warn`.
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Self {
        let directive = std::env::var(ENV_LOG_FILTER)
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| verbose.then(|| "debug".to_string()))
            .or_else(|| settings.level.clone())
            .unwrap_or_else(|| "warn".to_string());

        Self {
            format: settings
                .format
                .as_deref()
                .map_or_else(LogFormat::default, LogFormat::parse),
            filter: parse_filter(&directive),
            file: settings.file.clone(),
        }
    }
}

fn parse_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"))
}
