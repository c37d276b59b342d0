//! Runtime-level error types.
//!
//! These cover the infrastructure concerns this crate owns (configuration,
//! capability wiring, subscriber installation). Playback-domain failures
//! live in the player crate's own error enum.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A configuration value was invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required injected capability was not provided. The message tells
    /// the host which builder call is missing.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    /// Infrastructure setup failed, e.g. installing the tracing subscriber.
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
