//! # Player Configuration
//!
//! Builder-pattern configuration for the playback orchestrator. The builder
//! enforces fail-fast validation: a missing engine is reported with an
//! actionable message at build time, not as a panic deep inside the actor.
//!
//! ## Usage
//!
//! ```ignore
//! use core_player::{PlayerConfig, PlaylistEntry};
//! use std::sync::Arc;
//!
//! let config = PlayerConfig::builder()
//!     .engine(Arc::new(MyEngine::new()))
//!     .connectivity_monitor(Arc::new(MyMonitor::new()))
//!     .command_center(Arc::new(MyCommandCenter::new()))
//!     .entries(vec![PlaylistEntry::new("Intro", "https://media.example/1", "")])
//!     .build()?;
//! ```

use crate::error::{PlayerError, Result};
use crate::playlist::PlaylistEntry;
use bridge_traits::engine::PlaybackEngine;
use bridge_traits::network::ConnectivityMonitor;
use bridge_traits::remote::RemoteCommandCenter;
use core_runtime::events::DEFAULT_EVENT_BUFFER_SIZE;
use std::sync::Arc;

/// Configuration for a playback session.
///
/// The playlist is a constructor input: it is created once per session and
/// lives for the player's lifetime. Use [`PlayerConfigBuilder`] to construct
/// instances.
#[derive(Clone)]
pub struct PlayerConfig {
    /// The playback engine the orchestrator drives (required).
    pub engine: Arc<dyn PlaybackEngine>,

    /// Connectivity observer used for failure recovery (optional; without it
    /// network failures are never retried automatically).
    pub connectivity_monitor: Option<Arc<dyn ConnectivityMonitor>>,

    /// System remote-control surface (optional).
    pub command_center: Option<Arc<dyn RemoteCommandCenter>>,

    /// Playlist entries for this session.
    pub entries: Vec<PlaylistEntry>,

    /// Playback rate applied until the user changes speed.
    pub initial_rate: f32,

    /// Buffer capacity of the player's event bus.
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for PlayerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerConfig")
            .field("engine", &"PlaybackEngine { ... }")
            .field(
                "connectivity_monitor",
                &self
                    .connectivity_monitor
                    .as_ref()
                    .map(|_| "ConnectivityMonitor { ... }"),
            )
            .field(
                "command_center",
                &self
                    .command_center
                    .as_ref()
                    .map(|_| "RemoteCommandCenter { ... }"),
            )
            .field("entries", &self.entries.len())
            .field("initial_rate", &self.initial_rate)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl PlayerConfig {
    /// Creates a new builder.
    pub fn builder() -> PlayerConfigBuilder {
        PlayerConfigBuilder::default()
    }
}

/// Builder for [`PlayerConfig`] instances.
#[derive(Default)]
pub struct PlayerConfigBuilder {
    engine: Option<Arc<dyn PlaybackEngine>>,
    connectivity_monitor: Option<Arc<dyn ConnectivityMonitor>>,
    command_center: Option<Arc<dyn RemoteCommandCenter>>,
    entries: Vec<PlaylistEntry>,
    initial_rate: Option<f32>,
    event_buffer_size: Option<usize>,
}

impl PlayerConfigBuilder {
    /// Sets the playback engine (required).
    pub fn engine(mut self, engine: Arc<dyn PlaybackEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Sets the connectivity observer (optional).
    ///
    /// Its subscription lifetime is tied to the player: recovery observation
    /// starts when the player spawns and ends when it closes.
    pub fn connectivity_monitor(mut self, monitor: Arc<dyn ConnectivityMonitor>) -> Self {
        self.connectivity_monitor = Some(monitor);
        self
    }

    /// Sets the remote-control surface (optional).
    pub fn command_center(mut self, center: Arc<dyn RemoteCommandCenter>) -> Self {
        self.command_center = Some(center);
        self
    }

    /// Sets the playlist entries for the session.
    pub fn entries(mut self, entries: Vec<PlaylistEntry>) -> Self {
        self.entries = entries;
        self
    }

    /// Sets the initial playback rate. Default: 1.0. Must be positive.
    pub fn initial_rate(mut self, rate: f32) -> Self {
        self.initial_rate = Some(rate);
        self
    }

    /// Sets the event bus buffer capacity. Default:
    /// [`DEFAULT_EVENT_BUFFER_SIZE`].
    pub fn event_buffer_size(mut self, capacity: usize) -> Self {
        self.event_buffer_size = Some(capacity);
        self
    }

    /// Builds the final configuration.
    ///
    /// # Errors
    ///
    /// Returns a missing-capability error when the engine was never injected,
    /// and a configuration error when the initial rate is not positive or the
    /// event buffer capacity is zero.
    pub fn build(self) -> Result<PlayerConfig> {
        let engine = self.engine.ok_or_else(|| {
            PlayerError::from(core_runtime::Error::CapabilityMissing {
                capability: "PlaybackEngine".to_string(),
                message: "Inject the host's engine adapter with .engine() before building."
                    .to_string(),
            })
        })?;

        let initial_rate = self.initial_rate.unwrap_or(1.0);
        if initial_rate <= 0.0 {
            return Err(PlayerError::Config(format!(
                "Initial rate must be positive, got {}",
                initial_rate
            )));
        }

        let event_buffer_size = self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE);
        if event_buffer_size == 0 {
            return Err(PlayerError::Config(
                "Event buffer capacity must be greater than zero".to_string(),
            ));
        }

        Ok(PlayerConfig {
            engine,
            connectivity_monitor: self.connectivity_monitor,
            command_center: self.command_center,
            entries: self.entries,
            initial_rate,
            event_buffer_size,
        })
    }
}
