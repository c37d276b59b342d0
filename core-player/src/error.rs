//! # Player Error Types
//!
//! API-level errors for the orchestration core. Raw engine errors never
//! appear here: they are classified into [`ErrorKind`](crate::state::ErrorKind)
//! and published through the state stream instead.

use thiserror::Error;

/// Errors surfaced by the public [`Player`](crate::player::Player) API.
#[derive(Error, Debug)]
pub enum PlayerError {
    /// Configuration was invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A runtime-level failure, including missing required capabilities at
    /// build time.
    #[error(transparent)]
    Runtime(#[from] core_runtime::Error),

    /// The player task has shut down; the handle can no longer be used.
    #[error("Player is closed")]
    Closed,

    /// A bridge call that reports delivery failures failed.
    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::BridgeError),
}

/// Result type for player operations.
pub type Result<T> = std::result::Result<T, PlayerError>;
