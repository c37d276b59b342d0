//! # External Synchronization Guard
//!
//! The engine may report that playback started or stopped because of a
//! control surface outside this core's own commands (e.g. a system
//! picture-in-picture affordance). Echoes of the core's own commands arrive
//! through the same signal, so they must be told apart: applying an echo
//! would re-trigger side effects, and answering it with another engine
//! command would loop forever.

/// Outcome of reconciling an externally-reported playing flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoDecision {
    /// The report matches the tracked state: an echo of a command this core
    /// issued itself. Drop it.
    Ignore,
    /// A genuine external transition. Adopt the reported flag and start or
    /// stop time sampling, but do not issue any engine command back.
    Apply,
}

/// Compares the engine's reported playing flag against the tracked one.
pub fn reconcile(tracked_is_playing: bool, reported_is_playing: bool) -> EchoDecision {
    if tracked_is_playing == reported_is_playing {
        EchoDecision::Ignore
    } else {
        EchoDecision::Apply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_report_is_an_echo() {
        assert_eq!(reconcile(true, true), EchoDecision::Ignore);
        assert_eq!(reconcile(false, false), EchoDecision::Ignore);
    }

    #[test]
    fn changed_report_is_applied() {
        assert_eq!(reconcile(false, true), EchoDecision::Apply);
        assert_eq!(reconcile(true, false), EchoDecision::Apply);
    }
}
