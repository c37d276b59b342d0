//! # Logging & Tracing Infrastructure
//!
//! Configures the `tracing-subscriber` stack used by the playback core:
//! pretty, compact, or JSON output, with module-level filtering through
//! `EnvFilter`.
//!
//! ## Usage
//!
//! ```no_run
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//!
//! let config = LoggingConfig::default()
//!     .with_format(LogFormat::Compact)
//!     .with_filter("core_player=debug,info");
//!
//! init_logging(config).expect("failed to initialize logging");
//! tracing::info!("player starting");
//! ```
//!
//! `init_logging` installs a global default subscriber and therefore may be
//! called at most once per process; subsequent calls return an error.

use crate::error::{Error, Result};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors.
    Pretty,
    /// Compact single-line format for production consoles.
    Compact,
    /// Structured JSON format for machine parsing.
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Json;
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Filter directives, e.g. `"core_player=debug,info"`. When `None`, the
    /// `RUST_LOG` environment variable is consulted, falling back to `info`.
    pub filter: Option<String>,
}

impl LoggingConfig {
    /// Sets the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets explicit filter directives, overriding `RUST_LOG`.
    pub fn with_filter(mut self, directives: impl Into<String>) -> Self {
        self.filter = Some(directives.into());
        self
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        match &self.filter {
            Some(directives) => EnvFilter::try_new(directives)
                .map_err(|e| Error::Config(format!("Invalid log filter directives: {}", e))),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))),
        }
    }
}

/// Initializes the global tracing subscriber from `config`.
///
/// # Errors
///
/// Returns an error if the filter directives are invalid or if a global
/// subscriber is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = config.env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    };

    result.map_err(|e| Error::Internal(format!("Failed to install tracing subscriber: {}", e)))
}
