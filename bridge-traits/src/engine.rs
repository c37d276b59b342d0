//! Playback engine bridge trait and its signal types.
//!
//! The engine is treated as a black box: the core issues transport and queue
//! commands and observes their effect later through [`EngineSignal`]s, never
//! through returned completion values. Hosts back this trait with whatever
//! player their platform provides (a system AV player, a GStreamer pipeline,
//! a headless test double).

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Readiness of the currently loaded playable item.
///
/// # Equality
///
/// `PartialEq` compares case labels only: two [`ItemStatus::Failed`] values
/// are equal regardless of the carried error. Consumers that deduplicate on
/// equality therefore collapse consecutive failures of the same item into a
/// single transition, even when the underlying errors differ.
#[derive(Debug, Clone, Default)]
pub enum ItemStatus {
    /// The engine has not yet determined whether the item can play.
    #[default]
    Unknown,
    /// The item is ready for playback.
    Ready,
    /// The item failed to load or play, with the raw engine error when known.
    Failed(Option<EngineError>),
}

impl PartialEq for ItemStatus {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (ItemStatus::Unknown, ItemStatus::Unknown)
                | (ItemStatus::Ready, ItemStatus::Ready)
                | (ItemStatus::Failed(_), ItemStatus::Failed(_))
        )
    }
}

impl Eq for ItemStatus {}

/// Buffer-health signal, independent of item readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferingState {
    /// The playback buffer has run dry.
    Empty,
    /// The buffer is full.
    Full,
    /// The engine predicts playback can continue without stalling.
    LikelyToKeepUp,
}

/// Raw error shape reported by the engine: a domain/code pair plus an
/// optional wrapped cause of arbitrary depth.
///
/// This mirrors how platform media stacks surface transport failures; the
/// core classifies these into its closed error taxonomy and never re-exposes
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    /// Error namespace, e.g. [`url_error::DOMAIN`] for transport errors.
    pub domain: String,
    /// Domain-specific error code.
    pub code: i32,
    /// Optional human-readable description.
    pub message: Option<String>,
    /// The wrapped underlying error, when this error is itself a wrapper.
    pub underlying: Option<Box<EngineError>>,
}

impl EngineError {
    /// Create a new engine error with the given domain and code.
    pub fn new(domain: impl Into<String>, code: i32) -> Self {
        Self {
            domain: domain.into(),
            code,
            message: None,
            underlying: None,
        }
    }

    /// Attach a human-readable message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach an underlying cause.
    pub fn with_underlying(mut self, underlying: EngineError) -> Self {
        self.underlying = Some(Box::new(underlying));
        self
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.domain, self.code)?;
        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for EngineError {}

/// Well-known URL-loading error codes used by engine transport errors.
///
/// Host adapters map their platform's networking failures onto these codes;
/// the core's error classifier matches on them.
pub mod url_error {
    /// Domain for URL-loading transport errors.
    pub const DOMAIN: &str = "url-loading";

    /// No route to the network at all.
    pub const NOT_CONNECTED_TO_INTERNET: i32 = -1009;
    /// The request timed out.
    pub const TIMED_OUT: i32 = -1001;
    /// The host exists but refused or dropped the connection attempt.
    pub const CANNOT_CONNECT_TO_HOST: i32 = -1004;
    /// An established connection was lost mid-transfer.
    pub const NETWORK_CONNECTION_LOST: i32 = -1005;
}

/// Asynchronous signals emitted by the engine.
///
/// Per signal source, delivery order is FIFO. Time and duration are
/// continuously-updated values (last one wins); the remaining variants are
/// discrete transitions and every one must be processed.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineSignal {
    /// Elapsed playback time of the current item.
    Time { seconds: f64 },
    /// The engine resolved the current item's real duration.
    Duration { seconds: f64 },
    /// Readiness of the current item changed.
    ItemStatus(ItemStatus),
    /// Buffer health changed.
    Buffering(BufferingState),
    /// The current item played to its natural end.
    PlaybackEnded,
    /// Playback started or stopped due to a control surface outside the
    /// core's own commands (e.g. a system picture-in-picture affordance).
    ExternalPlayingChanged { is_playing: bool },
}

/// Kind of selectable media track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaOptionKind {
    /// Audio track (language, commentary, ...).
    Audible,
    /// Subtitle / closed-caption track.
    Legible,
}

/// A selectable media track reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaOption {
    pub kind: MediaOptionKind,
    /// Locale identifier, e.g. `"en"` or `"fr-CA"`.
    pub locale: String,
    /// Human-readable name for presentation.
    pub display_name: String,
}

/// Transport and queue commands the core issues to the engine.
///
/// Commands are fire-and-forget: the `Result` covers command *delivery* only,
/// and their effect is observed later via [`EngineSignal`]s. Implementations
/// must not block on playback progress inside these methods.
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Begin or resume playback of the current queue head.
    async fn play(&self) -> Result<()>;

    /// Pause playback, keeping the queue intact.
    async fn pause(&self) -> Result<()>;

    /// Seek within the current item to an absolute position in seconds.
    /// Callers are expected to pass an already-clamped value.
    async fn seek(&self, seconds: f64) -> Result<()>;

    /// Set the playback rate. On most engines a nonzero rate on a paused
    /// item starts playback as a side effect; callers must account for that.
    async fn set_rate(&self, rate: f32) -> Result<()>;

    /// Replace the engine's queue with the given item URLs, positioned at
    /// the first entry. Issued once at session start.
    async fn set_playlist(&self, urls: Vec<String>) -> Result<()>;

    /// Tear down the whole queue and reconstruct it from `urls`, positioned
    /// at `start_index`. Cost is proportional to the remaining entries.
    async fn rebuild_queue(&self, urls: Vec<String>, start_index: usize) -> Result<()>;

    /// Advance the queue head to the already-staged next entry. O(1);
    /// forward-only.
    async fn advance_to_next(&self) -> Result<()>;

    /// Report the media tracks selectable on the current item.
    async fn media_options(&self) -> Result<Vec<MediaOption>>;

    /// Select a media track of `kind` by locale.
    async fn select_media_option(&self, kind: MediaOptionKind, locale: String) -> Result<()>;

    /// Subscribe to the engine's signal surface. Each call returns an
    /// independent stream positioned at the next emitted signal.
    async fn subscribe_signals(&self) -> Result<Box<dyn EngineSignalStream>>;
}

/// Pull-based stream of [`EngineSignal`]s.
#[async_trait]
pub trait EngineSignalStream: Send {
    /// Next signal, or `None` once the engine has shut down.
    async fn next(&mut self) -> Option<EngineSignal>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_statuses_compare_equal_regardless_of_payload() {
        let a = ItemStatus::Failed(Some(EngineError::new(url_error::DOMAIN, -1)));
        let b = ItemStatus::Failed(None);
        assert_eq!(a, b);
        assert_ne!(a, ItemStatus::Ready);
        assert_ne!(ItemStatus::Unknown, ItemStatus::Ready);
    }

    #[test]
    fn engine_error_builder_chains_underlying() {
        let err = EngineError::new("player", 1)
            .with_message("cannot play")
            .with_underlying(EngineError::new(url_error::DOMAIN, url_error::TIMED_OUT));

        assert_eq!(err.domain, "player");
        let inner = err.underlying.as_deref().unwrap();
        assert_eq!(inner.code, url_error::TIMED_OUT);
        assert!(err.to_string().contains("cannot play"));
    }
}
