//! # Host Bridge Traits
//!
//! Abstraction traits for the external collaborators the playback
//! orchestration core drives and listens to.
//!
//! ## Overview
//!
//! This crate defines the contract between the orchestration core and the
//! host-provided services it depends on. Each trait represents a capability
//! implemented outside the core:
//!
//! - [`PlaybackEngine`](engine::PlaybackEngine) - the black-box playback
//!   engine: transport commands plus an asynchronous signal surface
//! - [`ConnectivityMonitor`](network::ConnectivityMonitor) - connectivity
//!   transitions used to drive failure recovery
//! - [`RemoteCommandCenter`](remote::RemoteCommandCenter) - system remote
//!   controls (lock screen / control center): forwards user intents and
//!   accepts now-playing metadata
//!
//! The core never reimplements any of these; it consumes them through the
//! narrow surfaces defined here. Signal delivery uses pull-based streams
//! (`async fn next() -> Option<..>`) so hosts can back them with whatever
//! callback or channel mechanism their platform provides.
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Host
//! implementations should convert platform-specific failures into it with
//! actionable messages.
//!
//! ## Thread Safety
//!
//! Command-issuing traits require `Send + Sync` so the core can hold them in
//! an `Arc` across async tasks. Streams require `Send` only; each stream has
//! a single consumer.

pub mod engine;
pub mod error;
pub mod network;
pub mod remote;

pub use error::BridgeError;

// Re-export commonly used types
pub use engine::{
    BufferingState, EngineError, EngineSignal, EngineSignalStream, ItemStatus, MediaOption,
    MediaOptionKind, PlaybackEngine,
};
pub use network::{ConnectivityMonitor, ConnectivityStream};
pub use remote::{NowPlayingInfo, RemoteCommand, RemoteCommandCenter, RemoteCommandStream};
