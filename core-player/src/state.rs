//! # State Reducer
//!
//! Pure derivation of the unified [`PlayerState`] from the latest
//! `(ItemStatus, BufferingState, is_playing)` triple, with combine-latest
//! semantics: nothing is derived until every input has reported at least one
//! value, since early signals may be partial.

use bridge_traits::engine::{BufferingState, ItemStatus};
use serde::{Deserialize, Serialize};

/// Closed taxonomy of playback failures published by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Generic engine-level failure; not retried automatically.
    PlaybackFailed,
    /// No network connectivity at all.
    NetworkUnavailable,
    /// The transport timed out.
    ConnectionTimeout,
    /// The media host refused or dropped the connection attempt.
    CannotConnectToHost,
    /// An established connection was lost mid-stream.
    ConnectionLost,
}

impl ErrorKind {
    /// `true` for every kind except [`ErrorKind::PlaybackFailed`].
    ///
    /// Network-classified failures are retried automatically, once per
    /// connectivity-restoration event.
    pub fn is_network_error(&self) -> bool {
        !matches!(self, ErrorKind::PlaybackFailed)
    }
}

/// The unified, derived player state. Never mutated directly; always
/// recomputed by [`derive`].
///
/// # Equality
///
/// `PartialEq` compares case labels only: two [`PlayerState::Failed`] values
/// are equal regardless of the carried [`ErrorKind`]. This is deliberate and
/// matches [`ItemStatus`]'s payload-blind rule: consecutive different
/// failures on the same item do not re-notify state subscribers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlayerState {
    Loading,
    Playing,
    Paused,
    Failed(ErrorKind),
}

impl PartialEq for PlayerState {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (PlayerState::Loading, PlayerState::Loading)
                | (PlayerState::Playing, PlayerState::Playing)
                | (PlayerState::Paused, PlayerState::Paused)
                | (PlayerState::Failed(_), PlayerState::Failed(_))
        )
    }
}

impl Eq for PlayerState {}

impl std::fmt::Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerState::Loading => write!(f, "loading"),
            PlayerState::Playing => write!(f, "playing"),
            PlayerState::Paused => write!(f, "paused"),
            PlayerState::Failed(kind) => write!(f, "failed ({:?})", kind),
        }
    }
}

/// Derives the unified state from one complete input triple.
///
/// Precedence:
/// 1. `Unknown` item -> `Loading`, unconditionally.
/// 2. `Failed` item -> `Failed` with the classified kind.
/// 3. `Ready` item: playing on an empty buffer is a stall (`Loading`),
///    otherwise `Playing`/`Paused` follows `is_playing`.
pub fn derive(status: &ItemStatus, buffering: BufferingState, is_playing: bool) -> PlayerState {
    match status {
        ItemStatus::Unknown => PlayerState::Loading,
        ItemStatus::Failed(raw) => PlayerState::Failed(crate::recovery::classify_optional(raw)),
        ItemStatus::Ready => {
            if is_playing && buffering == BufferingState::Empty {
                PlayerState::Loading
            } else if is_playing {
                PlayerState::Playing
            } else {
                PlayerState::Paused
            }
        }
    }
}

/// Latest-value holder for the reducer's three inputs.
///
/// Implements the combine-latest contract: [`derive_latest`]
/// (SignalInputs::derive_latest) yields nothing until all three inputs have
/// been observed at least once.
#[derive(Debug, Default)]
pub(crate) struct SignalInputs {
    pub item_status: Option<ItemStatus>,
    pub buffering: Option<BufferingState>,
    pub is_playing: Option<bool>,
}

impl SignalInputs {
    /// Derives the unified state, or `None` while any input is still unset.
    pub fn derive_latest(&self) -> Option<PlayerState> {
        let status = self.item_status.as_ref()?;
        let buffering = self.buffering?;
        let is_playing = self.is_playing?;
        Some(derive(status, buffering, is_playing))
    }
}
