//! Connectivity Monitoring Abstraction
//!
//! Reports whether the device currently has network connectivity. The core
//! uses transitions back to connected to decide when a failed item should be
//! reloaded.
//!
//! Unlike a process-wide reachability singleton, the monitor is injected
//! explicitly and its subscription lifetime is tied to the player that
//! consumes it: dropping the player's stream ends the observation.

use crate::error::Result;
use async_trait::async_trait;

/// Connectivity observer trait.
///
/// # Platform Support
///
/// - **Desktop**: NetworkManager, SystemConfiguration, Windows Network List Manager
/// - **iOS/macOS**: Network framework path monitor
/// - **Android**: ConnectivityManager
#[async_trait]
pub trait ConnectivityMonitor: Send + Sync {
    /// Current connectivity, best effort.
    async fn is_connected(&self) -> bool;

    /// Subscribe to connectivity transitions.
    ///
    /// Implementations should emit a value whenever connectivity flips, and
    /// may emit the current value first.
    async fn subscribe_changes(&self) -> Result<Box<dyn ConnectivityStream>>;
}

/// Pull-based stream of connectivity transitions.
#[async_trait]
pub trait ConnectivityStream: Send {
    /// Next connectivity value, or `None` when the stream is closed.
    async fn next(&mut self) -> Option<bool>;
}
