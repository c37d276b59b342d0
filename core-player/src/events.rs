//! # Player Events
//!
//! Typed events published on the core's [`EventBus`](core_runtime::events::EventBus)
//! alongside the watch-channel state projections. Subscribers that only care
//! about the latest state should prefer the watch channels; the bus carries
//! every transition.

use crate::state::{ErrorKind, PlayerState};
use serde::{Deserialize, Serialize};

/// Severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Events emitted by the playback orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlayerEvent {
    /// The derived player state changed (under the payload-blind equality).
    StateChanged { state: PlayerState },
    /// The queue moved to a different entry.
    TrackChanged { index: usize, source_url: String },
    /// Elapsed time advanced (sampled while playing).
    PositionChanged {
        position_seconds: f64,
        duration_seconds: f64,
    },
    /// The engine resolved an entry's real duration.
    DurationResolved { index: usize, duration_seconds: f64 },
    /// Playback started or stopped from an external control surface.
    ExternalPlaybackChanged { is_playing: bool },
    /// Connectivity came back while in a network-failed state; the current
    /// position is being reloaded.
    RecoveryStarted { kind: ErrorKind },
    /// The player was closed; no further events follow.
    Closed,
}

impl PlayerEvent {
    /// Human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            PlayerEvent::StateChanged { .. } => "Player state changed",
            PlayerEvent::TrackChanged { .. } => "Current track changed",
            PlayerEvent::PositionChanged { .. } => "Playback position changed",
            PlayerEvent::DurationResolved { .. } => "Track duration resolved",
            PlayerEvent::ExternalPlaybackChanged { .. } => "External playback change",
            PlayerEvent::RecoveryStarted { .. } => "Connectivity recovery started",
            PlayerEvent::Closed => "Player closed",
        }
    }

    /// Severity of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            PlayerEvent::StateChanged {
                state: PlayerState::Failed(_),
            } => EventSeverity::Error,
            PlayerEvent::RecoveryStarted { .. } => EventSeverity::Warning,
            PlayerEvent::StateChanged { .. }
            | PlayerEvent::TrackChanged { .. }
            | PlayerEvent::Closed => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ranks_failures_highest() {
        let failed = PlayerEvent::StateChanged {
            state: PlayerState::Failed(ErrorKind::ConnectionLost),
        };
        assert_eq!(failed.severity(), EventSeverity::Error);

        let position = PlayerEvent::PositionChanged {
            position_seconds: 1.0,
            duration_seconds: 10.0,
        };
        assert_eq!(position.severity(), EventSeverity::Debug);
        assert!(failed.severity() > position.severity());
    }

    #[test]
    fn events_serialize_with_snake_case_tags() {
        let event = PlayerEvent::TrackChanged {
            index: 2,
            source_url: "https://media.example/3".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("track_changed"));
        let back: PlayerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
