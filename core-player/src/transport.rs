//! # Transport Controller
//!
//! Play/pause/toggle/seek/skip/speed, expressed in terms of the engine
//! bridge and the orchestrator's authoritative [`TransportSnapshot`].
//!
//! Two rules here are easy to get wrong:
//!
//! - Seeks are clamped to `[0, duration]` before reaching the engine, and
//!   skips delegate to seek so they inherit the clamp.
//! - `set_speed` always stores the rate but only forwards it while playing:
//!   on the underlying engine, a nonzero rate on a paused item starts
//!   playback as a side effect, which would break the paused-stays-paused
//!   contract. The stored rate is reasserted on the next `play`.

use bridge_traits::engine::PlaybackEngine;
use bridge_traits::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The orchestrator's authoritative transport record, updated from engine
/// signals and the last issued command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransportSnapshot {
    pub is_playing: bool,
    pub rate: f32,
    pub current_time_seconds: f64,
    pub duration_seconds: f64,
}

impl Default for TransportSnapshot {
    fn default() -> Self {
        Self {
            is_playing: false,
            rate: 1.0,
            current_time_seconds: 0.0,
            duration_seconds: 0.0,
        }
    }
}

/// Single-owner transport controller; only the orchestrator task touches it.
pub(crate) struct TransportController {
    engine: Arc<dyn PlaybackEngine>,
    snapshot: TransportSnapshot,
    /// Whether time signals are currently being sampled into the snapshot.
    sampling: bool,
}

impl TransportController {
    pub fn new(engine: Arc<dyn PlaybackEngine>, initial_rate: f32) -> Self {
        Self {
            engine,
            snapshot: TransportSnapshot {
                rate: initial_rate,
                ..TransportSnapshot::default()
            },
            sampling: false,
        }
    }

    pub fn snapshot(&self) -> TransportSnapshot {
        self.snapshot
    }

    pub fn is_playing(&self) -> bool {
        self.snapshot.is_playing
    }

    /// Issue engine play, reassert the stored rate, and start time sampling.
    ///
    /// The tracked flag follows the play command alone: once that succeeded
    /// the engine is playing, so a failed rate reassertion is logged rather
    /// than propagated.
    pub async fn play(&mut self) -> Result<()> {
        self.engine.play().await?;
        self.snapshot.is_playing = true;
        self.sampling = true;
        if let Err(error) = self.engine.set_rate(self.snapshot.rate).await {
            tracing::warn!(%error, "failed to reassert rate on play");
        }
        Ok(())
    }

    /// Issue engine pause and stop time sampling.
    pub async fn pause(&mut self) -> Result<()> {
        self.engine.pause().await?;
        self.snapshot.is_playing = false;
        self.sampling = false;
        Ok(())
    }

    /// Dispatch to [`play`](Self::play) or [`pause`](Self::pause) based on
    /// the tracked flag.
    pub async fn toggle(&mut self) -> Result<()> {
        if self.snapshot.is_playing {
            self.pause().await
        } else {
            self.play().await
        }
    }

    /// Seek to `seconds`, clamped to `[0, duration]`.
    pub async fn seek(&mut self, seconds: f64) -> Result<()> {
        let target = seconds.clamp(0.0, self.snapshot.duration_seconds);
        self.engine.seek(target).await?;
        self.snapshot.current_time_seconds = target;
        Ok(())
    }

    /// Seek forward by `seconds` from the last known time.
    pub async fn skip_forward(&mut self, seconds: f64) -> Result<()> {
        self.seek(self.snapshot.current_time_seconds + seconds).await
    }

    /// Seek backward by `seconds` from the last known time.
    pub async fn skip_backward(&mut self, seconds: f64) -> Result<()> {
        self.seek(self.snapshot.current_time_seconds - seconds).await
    }

    /// Store the rate; forward it to the engine only while playing.
    pub async fn set_speed(&mut self, rate: f32) -> Result<()> {
        self.snapshot.rate = rate;
        if self.snapshot.is_playing {
            self.engine.set_rate(rate).await?;
        }
        Ok(())
    }

    /// Reassert the stored rate, e.g. across a natural item transition.
    pub async fn reassert_rate(&mut self) -> Result<()> {
        self.engine.set_rate(self.snapshot.rate).await
    }

    /// Adopt an externally-reported playing flag. Updates the tracked state
    /// and sampling exactly as `play`/`pause` would, but issues no engine
    /// command: the transition already happened on the engine side.
    pub fn apply_external(&mut self, is_playing: bool) {
        self.snapshot.is_playing = is_playing;
        self.sampling = is_playing;
    }

    /// Record an elapsed-time sample. Returns `false` when sampling is
    /// stopped and the sample was dropped.
    pub fn record_time(&mut self, seconds: f64) -> bool {
        if !self.sampling {
            return false;
        }
        self.snapshot.current_time_seconds = seconds;
        true
    }

    /// Record the engine-resolved duration of the current item.
    pub fn record_duration(&mut self, seconds: f64) {
        self.snapshot.duration_seconds = seconds;
    }

    /// Reset per-item position state after a queue navigation.
    pub fn reset_position(&mut self) {
        self.snapshot.current_time_seconds = 0.0;
        self.snapshot.duration_seconds = 0.0;
    }

    /// Reset only the elapsed-time marker, keeping the known duration. Used
    /// when the current item restarts from zero without changing entries.
    pub fn rewind(&mut self) {
        self.snapshot.current_time_seconds = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::engine::{EngineSignalStream, MediaOption, MediaOptionKind};
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        Engine {}

        #[async_trait]
        impl PlaybackEngine for Engine {
            async fn play(&self) -> bridge_traits::error::Result<()>;
            async fn pause(&self) -> bridge_traits::error::Result<()>;
            async fn seek(&self, seconds: f64) -> bridge_traits::error::Result<()>;
            async fn set_rate(&self, rate: f32) -> bridge_traits::error::Result<()>;
            async fn set_playlist(&self, urls: Vec<String>) -> bridge_traits::error::Result<()>;
            async fn rebuild_queue(
                &self,
                urls: Vec<String>,
                start_index: usize,
            ) -> bridge_traits::error::Result<()>;
            async fn advance_to_next(&self) -> bridge_traits::error::Result<()>;
            async fn media_options(&self) -> bridge_traits::error::Result<Vec<MediaOption>>;
            async fn select_media_option(
                &self,
                kind: MediaOptionKind,
                locale: String,
            ) -> bridge_traits::error::Result<()>;
            async fn subscribe_signals(
                &self,
            ) -> bridge_traits::error::Result<Box<dyn EngineSignalStream>>;
        }
    }

    #[tokio::test]
    async fn set_speed_while_paused_never_touches_the_engine_rate() {
        let mut engine = MockEngine::new();
        engine.expect_set_rate().never();

        let mut transport = TransportController::new(Arc::new(engine), 1.0);
        transport.set_speed(1.5).await.unwrap();
        assert_eq!(transport.snapshot().rate, 1.5);
        assert!(!transport.is_playing());
    }

    #[tokio::test]
    async fn set_speed_while_playing_forwards_to_the_engine() {
        let mut engine = MockEngine::new();
        engine.expect_play().times(1).returning(|| Ok(()));
        // Once on play (reassert stored 1.0), once for the new speed.
        engine
            .expect_set_rate()
            .with(eq(1.0f32))
            .times(1)
            .returning(|_| Ok(()));
        engine
            .expect_set_rate()
            .with(eq(2.0f32))
            .times(1)
            .returning(|_| Ok(()));

        let mut transport = TransportController::new(Arc::new(engine), 1.0);
        transport.play().await.unwrap();
        transport.set_speed(2.0).await.unwrap();
    }

    #[tokio::test]
    async fn stored_speed_is_reasserted_on_next_play() {
        let mut engine = MockEngine::new();
        engine.expect_play().times(1).returning(|| Ok(()));
        engine
            .expect_set_rate()
            .with(eq(1.75f32))
            .times(1)
            .returning(|_| Ok(()));

        let mut transport = TransportController::new(Arc::new(engine), 1.0);
        transport.set_speed(1.75).await.unwrap();
        transport.play().await.unwrap();
    }

    #[tokio::test]
    async fn rate_failure_on_play_keeps_tracked_state_playing() {
        let mut engine = MockEngine::new();
        engine.expect_play().times(1).returning(|| Ok(()));
        engine.expect_set_rate().times(1).returning(|_| {
            Err(bridge_traits::BridgeError::OperationFailed(
                "rate rejected".into(),
            ))
        });

        let mut transport = TransportController::new(Arc::new(engine), 1.0);
        // The engine accepted play, so the command succeeds and the snapshot
        // reflects playing despite the failed rate reassertion.
        transport.play().await.unwrap();
        assert!(transport.is_playing());
        assert!(transport.record_time(2.0));
    }

    #[tokio::test]
    async fn seek_clamps_to_duration_bounds() {
        let mut engine = MockEngine::new();
        engine
            .expect_seek()
            .with(eq(100.0f64))
            .times(1)
            .returning(|_| Ok(()));
        engine
            .expect_seek()
            .with(eq(0.0f64))
            .times(1)
            .returning(|_| Ok(()));

        let mut transport = TransportController::new(Arc::new(engine), 1.0);
        transport.record_duration(100.0);

        transport.seek(250.0).await.unwrap();
        assert_eq!(transport.snapshot().current_time_seconds, 100.0);

        transport.seek(-10.0).await.unwrap();
        assert_eq!(transport.snapshot().current_time_seconds, 0.0);
    }

    #[tokio::test]
    async fn skips_inherit_seek_clamping() {
        let mut engine = MockEngine::new();
        engine.expect_play().returning(|| Ok(()));
        engine.expect_set_rate().returning(|_| Ok(()));
        engine
            .expect_seek()
            .with(eq(45.0f64))
            .times(1)
            .returning(|_| Ok(()));
        engine
            .expect_seek()
            .with(eq(0.0f64))
            .times(1)
            .returning(|_| Ok(()));

        let mut transport = TransportController::new(Arc::new(engine), 1.0);
        transport.record_duration(100.0);
        transport.play().await.unwrap();

        transport.record_time(30.0);
        transport.skip_forward(15.0).await.unwrap();

        transport.record_time(5.0);
        transport.skip_backward(15.0).await.unwrap();
        assert_eq!(transport.snapshot().current_time_seconds, 0.0);
    }

    #[tokio::test]
    async fn toggle_dispatches_on_tracked_flag() {
        let mut engine = MockEngine::new();
        engine.expect_play().times(1).returning(|| Ok(()));
        engine.expect_set_rate().returning(|_| Ok(()));
        engine.expect_pause().times(1).returning(|| Ok(()));

        let mut transport = TransportController::new(Arc::new(engine), 1.0);
        transport.toggle().await.unwrap();
        assert!(transport.is_playing());
        transport.toggle().await.unwrap();
        assert!(!transport.is_playing());
    }

    #[tokio::test]
    async fn time_samples_are_dropped_while_paused() {
        let engine = MockEngine::new();
        let mut transport = TransportController::new(Arc::new(engine), 1.0);

        assert!(!transport.record_time(12.0));
        assert_eq!(transport.snapshot().current_time_seconds, 0.0);

        transport.apply_external(true);
        assert!(transport.record_time(12.0));
        assert_eq!(transport.snapshot().current_time_seconds, 12.0);
    }

    #[tokio::test]
    async fn apply_external_issues_no_engine_command() {
        // Any engine call would trip the mock's default (no expectations).
        let engine = MockEngine::new();
        let mut transport = TransportController::new(Arc::new(engine), 1.0);

        transport.apply_external(true);
        assert!(transport.is_playing());
        transport.apply_external(false);
        assert!(!transport.is_playing());
    }
}
