//! # Playlist/Queue Controller
//!
//! Owns the ordered list of playable entries and the current position, and
//! picks the cheapest valid strategy for any index change:
//!
//! - **Restart**: target equals the current index. Seek the current item
//!   back to zero; the underlying queue is untouched.
//! - **Advance**: target is exactly the next index. The engine already has
//!   that entry staged, so a single O(1) head advance suffices.
//! - **Rebuild**: anything else. Tear the whole queue down and reconstruct
//!   it starting at the target; cost is proportional to the remaining
//!   entries. Required for every backward move, including wrap-around.
//!
//! Out-of-range targets are silent no-ops by contract, never errors.
//! Resuming playback after a navigation is the orchestrator's job, through
//! the transport controller.

use bridge_traits::engine::PlaybackEngine;
use bridge_traits::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One playable entry. Immutable except `duration_seconds`, which is patched
/// once the engine reports a real duration. Identity is `source_url`, stable
/// across queue re-creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub title: String,
    pub source_url: String,
    /// `None` until the engine resolves the real duration.
    pub duration_seconds: Option<f64>,
    pub description: String,
}

impl PlaylistEntry {
    /// Create an entry with an unknown duration.
    pub fn new(
        title: impl Into<String>,
        source_url: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            source_url: source_url.into(),
            duration_seconds: None,
            description: description.into(),
        }
    }
}

/// Read-only projection of the queue published to subscribers.
///
/// Invariant: when `entries` is non-empty, `current_index` is within
/// `[0, entries.len())` after every public operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistState {
    pub entries: Vec<PlaylistEntry>,
    pub current_index: usize,
}

/// Strategy chosen for an index change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationStrategy {
    Restart,
    Advance,
    Rebuild,
}

/// Outcome of a natural end-of-item signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EndOfItemOutcome {
    /// More entries remained; the engine auto-advanced its own queue head,
    /// so only the stored rate needs reasserting to survive the transition.
    AdvancedInPlace,
    /// The ended entry was the last; the queue was rebuilt at index 0 and
    /// playback must be explicitly resumed.
    WrappedToStart,
    /// Empty playlist; nothing to do.
    Ignored,
}

/// Single-owner queue controller. All engine effects go through the injected
/// [`PlaybackEngine`]; only the orchestrator task touches this.
pub(crate) struct QueueController {
    engine: Arc<dyn PlaybackEngine>,
    entries: Vec<PlaylistEntry>,
    current_index: usize,
}

impl QueueController {
    pub fn new(engine: Arc<dyn PlaybackEngine>, entries: Vec<PlaylistEntry>) -> Self {
        Self {
            engine,
            entries,
            current_index: 0,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_entry(&self) -> Option<&PlaylistEntry> {
        self.entries.get(self.current_index)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn last_index(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    fn urls(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.source_url.clone()).collect()
    }

    /// Read-only snapshot for the playlist watch channel.
    pub fn snapshot(&self) -> PlaylistState {
        PlaylistState {
            entries: self.entries.clone(),
            current_index: self.current_index,
        }
    }

    /// Strategy that `switch_to(index)` would use; `None` for out-of-range.
    pub fn strategy_for(&self, index: usize) -> Option<NavigationStrategy> {
        if index >= self.entries.len() {
            return None;
        }
        Some(if index == self.current_index {
            NavigationStrategy::Restart
        } else if index == self.current_index + 1 {
            NavigationStrategy::Advance
        } else {
            NavigationStrategy::Rebuild
        })
    }

    /// Moves the queue to `index` using the cheapest valid strategy and
    /// updates the current position. Returns the strategy used, or `None`
    /// when the target was out of range and nothing happened. The caller
    /// resumes playback afterwards.
    pub async fn switch_to(&mut self, index: usize) -> Result<Option<NavigationStrategy>> {
        let Some(strategy) = self.strategy_for(index) else {
            tracing::debug!(index, len = self.entries.len(), "ignoring out-of-range switch");
            return Ok(None);
        };

        match strategy {
            NavigationStrategy::Restart => self.engine.seek(0.0).await?,
            NavigationStrategy::Advance => self.engine.advance_to_next().await?,
            NavigationStrategy::Rebuild => self.engine.rebuild_queue(self.urls(), index).await?,
        }

        self.current_index = index;
        tracing::debug!(index, ?strategy, "switched queue position");
        Ok(Some(strategy))
    }

    /// Skips to the next entry, wrapping from the last back to the first.
    /// The wrap is a rebuild: an advance cannot move the queue head backward.
    pub async fn play_next(&mut self) -> Result<Option<NavigationStrategy>> {
        if self.is_empty() {
            return Ok(None);
        }
        let target = if self.current_index == self.last_index() {
            0
        } else {
            self.current_index + 1
        };
        self.switch_to(target).await
    }

    /// Skips to the previous entry, wrapping from the first to the last.
    pub async fn play_previous(&mut self) -> Result<Option<NavigationStrategy>> {
        if self.is_empty() {
            return Ok(None);
        }
        let target = if self.current_index == 0 {
            self.last_index()
        } else {
            self.current_index - 1
        };
        self.switch_to(target).await
    }

    /// Handles a natural end-of-item signal (distinct from a user-initiated
    /// skip: the engine auto-advances its own queue head on natural end).
    pub async fn handle_item_ended(&mut self) -> Result<EndOfItemOutcome> {
        if self.is_empty() {
            return Ok(EndOfItemOutcome::Ignored);
        }
        if self.current_index < self.last_index() {
            self.current_index += 1;
            tracing::debug!(index = self.current_index, "item ended, following engine advance");
            Ok(EndOfItemOutcome::AdvancedInPlace)
        } else {
            self.engine.rebuild_queue(self.urls(), 0).await?;
            self.current_index = 0;
            tracing::debug!("last item ended, wrapped to start");
            Ok(EndOfItemOutcome::WrappedToStart)
        }
    }

    /// Patches one entry's resolved duration; out-of-range is a silent no-op.
    pub fn update_duration(&mut self, seconds: f64, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.duration_seconds = Some(seconds);
        }
    }

    /// Rebuilds the queue at the current index without moving it. Used
    /// exclusively by the recovery policy; the caller resumes playback.
    pub async fn reload(&mut self) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        self.engine
            .rebuild_queue(self.urls(), self.current_index)
            .await?;
        tracing::info!(index = self.current_index, "queue reloaded at current position");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::engine::{
        EngineSignalStream, MediaOption, MediaOptionKind, PlaybackEngine,
    };
    use std::sync::Mutex;

    /// Records every structural command the controller issues.
    #[derive(Debug, Clone, PartialEq)]
    enum Issued {
        Seek(f64),
        Advance,
        Rebuild { len: usize, start_index: usize },
    }

    #[derive(Default)]
    struct RecordingEngine {
        issued: Mutex<Vec<Issued>>,
    }

    impl RecordingEngine {
        fn take(&self) -> Vec<Issued> {
            std::mem::take(&mut self.issued.lock().unwrap())
        }
    }

    #[async_trait]
    impl PlaybackEngine for RecordingEngine {
        async fn play(&self) -> bridge_traits::error::Result<()> {
            Ok(())
        }
        async fn pause(&self) -> bridge_traits::error::Result<()> {
            Ok(())
        }
        async fn seek(&self, seconds: f64) -> bridge_traits::error::Result<()> {
            self.issued.lock().unwrap().push(Issued::Seek(seconds));
            Ok(())
        }
        async fn set_rate(&self, _rate: f32) -> bridge_traits::error::Result<()> {
            Ok(())
        }
        async fn set_playlist(&self, _urls: Vec<String>) -> bridge_traits::error::Result<()> {
            Ok(())
        }
        async fn rebuild_queue(
            &self,
            urls: Vec<String>,
            start_index: usize,
        ) -> bridge_traits::error::Result<()> {
            self.issued.lock().unwrap().push(Issued::Rebuild {
                len: urls.len(),
                start_index,
            });
            Ok(())
        }
        async fn advance_to_next(&self) -> bridge_traits::error::Result<()> {
            self.issued.lock().unwrap().push(Issued::Advance);
            Ok(())
        }
        async fn media_options(&self) -> bridge_traits::error::Result<Vec<MediaOption>> {
            Ok(Vec::new())
        }
        async fn select_media_option(
            &self,
            _kind: MediaOptionKind,
            _locale: String,
        ) -> bridge_traits::error::Result<()> {
            Ok(())
        }
        async fn subscribe_signals(
            &self,
        ) -> bridge_traits::error::Result<Box<dyn EngineSignalStream>> {
            Err(bridge_traits::BridgeError::NotAvailable(
                "test engine has no signal surface".into(),
            ))
        }
    }

    fn controller(n: usize) -> (Arc<RecordingEngine>, QueueController) {
        let engine = Arc::new(RecordingEngine::default());
        let entries = (0..n)
            .map(|i| PlaylistEntry::new(format!("track {i}"), format!("https://t/{i}"), ""))
            .collect();
        (engine.clone(), QueueController::new(engine, entries))
    }

    #[tokio::test]
    async fn adjacent_switch_uses_advance_not_rebuild() {
        let (engine, mut queue) = controller(3);
        let used = queue.switch_to(1).await.unwrap();
        assert_eq!(used, Some(NavigationStrategy::Advance));
        assert_eq!(queue.current_index(), 1);
        assert_eq!(engine.take(), vec![Issued::Advance]);
    }

    #[tokio::test]
    async fn same_index_restarts_without_touching_queue() {
        let (engine, mut queue) = controller(3);
        let used = queue.switch_to(0).await.unwrap();
        assert_eq!(used, Some(NavigationStrategy::Restart));
        assert_eq!(engine.take(), vec![Issued::Seek(0.0)]);
    }

    #[tokio::test]
    async fn distant_switch_rebuilds_at_target() {
        let (engine, mut queue) = controller(4);
        let used = queue.switch_to(3).await.unwrap();
        assert_eq!(used, Some(NavigationStrategy::Rebuild));
        assert_eq!(
            engine.take(),
            vec![Issued::Rebuild {
                len: 4,
                start_index: 3
            }]
        );
    }

    #[tokio::test]
    async fn out_of_range_switch_is_a_noop() {
        let (engine, mut queue) = controller(3);
        assert_eq!(queue.switch_to(7).await.unwrap(), None);
        assert_eq!(queue.current_index(), 0);
        assert!(engine.take().is_empty());
    }

    #[tokio::test]
    async fn play_next_from_last_wraps_via_rebuild() {
        let (engine, mut queue) = controller(3);
        queue.switch_to(2).await.unwrap();
        engine.take();

        let used = queue.play_next().await.unwrap();
        assert_eq!(used, Some(NavigationStrategy::Rebuild));
        assert_eq!(queue.current_index(), 0);
        assert_eq!(
            engine.take(),
            vec![Issued::Rebuild {
                len: 3,
                start_index: 0
            }]
        );
    }

    #[tokio::test]
    async fn single_entry_wrap_restarts_instead_of_rebuilding() {
        // Wrapping on a one-entry playlist targets the current index, so it
        // resolves to a restart: one seek, no queue reconstruction.
        let (engine, mut queue) = controller(1);

        assert_eq!(
            queue.play_next().await.unwrap(),
            Some(NavigationStrategy::Restart)
        );
        assert_eq!(queue.current_index(), 0);
        assert_eq!(engine.take(), vec![Issued::Seek(0.0)]);

        assert_eq!(
            queue.play_previous().await.unwrap(),
            Some(NavigationStrategy::Restart)
        );
        assert_eq!(engine.take(), vec![Issued::Seek(0.0)]);
    }

    #[tokio::test]
    async fn play_previous_from_first_wraps_to_last() {
        let (engine, mut queue) = controller(3);
        let used = queue.play_previous().await.unwrap();
        assert_eq!(used, Some(NavigationStrategy::Rebuild));
        assert_eq!(queue.current_index(), 2);
        assert_eq!(
            engine.take(),
            vec![Issued::Rebuild {
                len: 3,
                start_index: 2
            }]
        );
    }

    #[tokio::test]
    async fn natural_end_mid_list_advances_in_place() {
        let (engine, mut queue) = controller(3);
        let outcome = queue.handle_item_ended().await.unwrap();
        assert_eq!(outcome, EndOfItemOutcome::AdvancedInPlace);
        assert_eq!(queue.current_index(), 1);
        // The engine advanced its own queue head; no structural command.
        assert!(engine.take().is_empty());
    }

    #[tokio::test]
    async fn natural_end_of_last_item_wraps_and_requests_rebuild() {
        let (engine, mut queue) = controller(3);
        queue.switch_to(2).await.unwrap();
        engine.take();

        let outcome = queue.handle_item_ended().await.unwrap();
        assert_eq!(outcome, EndOfItemOutcome::WrappedToStart);
        assert_eq!(queue.current_index(), 0);
        assert_eq!(
            engine.take(),
            vec![Issued::Rebuild {
                len: 3,
                start_index: 0
            }]
        );
    }

    #[tokio::test]
    async fn index_stays_in_range_under_arbitrary_navigation() {
        let (_engine, mut queue) = controller(4);
        queue.play_previous().await.unwrap();
        queue.play_next().await.unwrap();
        queue.switch_to(2).await.unwrap();
        queue.switch_to(9).await.unwrap();
        queue.handle_item_ended().await.unwrap();
        queue.handle_item_ended().await.unwrap();
        queue.play_next().await.unwrap();
        for _ in 0..10 {
            queue.play_next().await.unwrap();
            assert!(queue.current_index() < 4);
        }
    }

    #[tokio::test]
    async fn duration_patch_ignores_out_of_range_index() {
        let (_engine, mut queue) = controller(2);
        queue.update_duration(120.0, 1);
        assert_eq!(queue.snapshot().entries[1].duration_seconds, Some(120.0));

        queue.update_duration(99.0, 5);
        let snapshot = queue.snapshot();
        assert!(snapshot.entries[0].duration_seconds.is_none());
        assert_eq!(snapshot.entries[1].duration_seconds, Some(120.0));
    }

    #[tokio::test]
    async fn reload_rebuilds_at_current_index_without_moving_it() {
        let (engine, mut queue) = controller(3);
        queue.switch_to(1).await.unwrap();
        engine.take();

        queue.reload().await.unwrap();
        assert_eq!(queue.current_index(), 1);
        assert_eq!(
            engine.take(),
            vec![Issued::Rebuild {
                len: 3,
                start_index: 1
            }]
        );
    }

    #[tokio::test]
    async fn empty_playlist_operations_are_noops() {
        let (engine, mut queue) = controller(0);
        assert_eq!(queue.play_next().await.unwrap(), None);
        assert_eq!(queue.play_previous().await.unwrap(), None);
        assert_eq!(
            queue.handle_item_ended().await.unwrap(),
            EndOfItemOutcome::Ignored
        );
        queue.reload().await.unwrap();
        assert!(engine.take().is_empty());
    }
}
