//! # Playback Orchestration Core
//!
//! Turns the stream of low-level, asynchronously-arriving playback-engine
//! signals (elapsed time, duration, item readiness, buffering level, natural
//! end-of-item, externally-driven play/pause echoes) into one coherent,
//! observable player state, while owning playlist navigation, transport
//! operations, and connectivity-triggered recovery.
//!
//! ## Architecture
//!
//! ```text
//!  PlaybackEngine ──signals──┐
//!  ConnectivityMonitor ──────┤        ┌─> watch: PlayerState
//!  RemoteCommandCenter ──────┼─> Player actor ─> watch: PlaylistState
//!  Player handle ──commands──┘   (single writer) ─> watch: MediaSelectionState
//!                                             └─> EventBus<PlayerEvent>
//! ```
//!
//! All state mutation happens on one spawned task; engine signals,
//! connectivity changes, remote-control intents, and handle commands are
//! marshaled onto it through channels, so no locks are needed. Commands to
//! the engine are fire-and-forget: their effect is observed later through
//! further signals.
//!
//! ## Components
//!
//! - [`state`] - pure derivation of [`PlayerState`](state::PlayerState) from
//!   the latest (item status, buffering, playing) triple
//! - [`playlist`] - ordered entries, current index, and the cheapest valid
//!   navigation strategy for any index change
//! - [`transport`] - play/pause/toggle/seek/skip/speed with clamping
//! - [`guard`] - reconciliation of externally-originated play/pause echoes
//! - [`recovery`] - raw-error classification and connectivity-triggered
//!   reload policy
//! - [`player`] - the orchestrator facade composing all of the above

pub mod config;
pub mod error;
pub mod events;
pub mod guard;
pub mod player;
pub mod playlist;
pub mod recovery;
pub mod state;
pub mod transport;

pub use config::PlayerConfig;
pub use error::{PlayerError, Result};
pub use events::PlayerEvent;
pub use player::{MediaSelectionState, Player};
pub use playlist::{PlaylistEntry, PlaylistState};
pub use state::{ErrorKind, PlayerState};
pub use transport::TransportSnapshot;
