//! Remote-Command Surface Abstraction
//!
//! Bridges the system's remote controls (lock screen, control center,
//! headset buttons) to the core: user intents flow in as a stream of
//! [`RemoteCommand`]s, and the core pushes [`NowPlayingInfo`] back out so the
//! system UI can render the current item.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// User intents forwarded from the system remote-control surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum RemoteCommand {
    Play,
    Pause,
    Toggle,
    /// Skip to the next playlist entry.
    Next,
    SkipForward { seconds: f64 },
    SkipBackward { seconds: f64 },
    /// Absolute scrub, e.g. from a lock-screen progress bar.
    SeekTo { seconds: f64 },
}

/// Metadata describing the current item for the system's now-playing UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowPlayingInfo {
    pub title: String,
    /// Subtitle line; `None` hides it.
    pub artist: Option<String>,
    /// Item duration in seconds; `0.0` while still unknown.
    pub duration_seconds: f64,
    /// Elapsed playback time in seconds.
    pub elapsed_seconds: f64,
    /// Current playback rate; `0.0` renders as paused.
    pub rate: f32,
}

/// System remote-control surface.
#[async_trait]
pub trait RemoteCommandCenter: Send + Sync {
    /// Publish now-playing metadata for the current item.
    async fn update_now_playing(&self, info: NowPlayingInfo) -> Result<()>;

    /// Remove any published now-playing metadata.
    async fn clear_now_playing(&self) -> Result<()>;

    /// Subscribe to user intents from the remote surface.
    async fn subscribe_commands(&self) -> Result<Box<dyn RemoteCommandStream>>;
}

/// Pull-based stream of [`RemoteCommand`]s.
#[async_trait]
pub trait RemoteCommandStream: Send {
    /// Next intent, or `None` when the surface has been torn down.
    async fn next(&mut self) -> Option<RemoteCommand>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_command_serialization_round_trips() {
        let cmd = RemoteCommand::SkipForward { seconds: 15.0 };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("skip_forward"));
        let back: RemoteCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }
}
