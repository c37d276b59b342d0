//! # Error Classifier & Recovery Policy
//!
//! Maps raw engine errors into the closed [`ErrorKind`] taxonomy and decides
//! when a connectivity restoration should force a reload of the current
//! queue position.

use crate::state::{ErrorKind, PlayerState};
use bridge_traits::engine::{url_error, EngineError};

/// Classifies a raw engine error into the closed taxonomy.
///
/// The top-level domain/code pair is inspected first; when it matches none of
/// the network codes, classification recurses into the wrapped underlying
/// error (the chain may be arbitrarily deep). A network-classified result at
/// any depth wins; otherwise the error is a generic
/// [`ErrorKind::PlaybackFailed`].
pub fn classify(error: &EngineError) -> ErrorKind {
    if error.domain == url_error::DOMAIN {
        match error.code {
            url_error::NOT_CONNECTED_TO_INTERNET => return ErrorKind::NetworkUnavailable,
            url_error::TIMED_OUT => return ErrorKind::ConnectionTimeout,
            url_error::CANNOT_CONNECT_TO_HOST => return ErrorKind::CannotConnectToHost,
            url_error::NETWORK_CONNECTION_LOST => return ErrorKind::ConnectionLost,
            _ => {}
        }
    }

    if let Some(underlying) = &error.underlying {
        let kind = classify(underlying);
        if kind.is_network_error() {
            return kind;
        }
    }

    ErrorKind::PlaybackFailed
}

/// [`classify`] for failures where the engine did not carry an error value.
pub fn classify_optional(error: &Option<EngineError>) -> ErrorKind {
    match error {
        Some(error) => classify(error),
        None => ErrorKind::PlaybackFailed,
    }
}

/// `true` iff a reload should be issued: connectivity was just restored and
/// the last *published* state is a network-classified failure.
///
/// Recovery never interrupts already-successful playback and never fires for
/// non-network failures, so anything but `Failed(network kind)` vetoes it.
pub fn should_reload(published: &PlayerState, is_connected: bool) -> bool {
    if !is_connected {
        return false;
    }
    match published {
        PlayerState::Failed(kind) => kind.is_network_error(),
        _ => false,
    }
}
