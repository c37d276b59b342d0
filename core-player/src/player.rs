//! # Playback Orchestrator
//!
//! The [`Player`] facade and the actor behind it. All mutable state lives on
//! one spawned task; engine signals, connectivity transitions, remote-control
//! intents, and handle commands are marshaled onto it through channels, so
//! there is exactly one writer and no locks.
//!
//! Observable state flows out three ways:
//!
//! - `watch` channels for the latest [`PlayerState`], [`PlaylistState`], and
//!   [`MediaSelectionState`] (late subscribers see the current value),
//! - an [`EventBus`] carrying every [`PlayerEvent`] transition,
//! - pushes of [`NowPlayingInfo`] to the host's remote-control surface.
//!
//! Engine commands are fire-and-forget: a delivery failure is logged and the
//! tracked state is left unchanged, never propagated to the caller. The
//! engine's real reaction arrives later through its signal stream.

use crate::config::PlayerConfig;
use crate::error::{PlayerError, Result};
use crate::events::PlayerEvent;
use crate::guard::{self, EchoDecision};
use crate::playlist::{EndOfItemOutcome, NavigationStrategy, PlaylistState, QueueController};
use crate::recovery;
use crate::state::{PlayerState, SignalInputs};
use crate::transport::{TransportController, TransportSnapshot};
use bridge_traits::engine::{
    EngineSignal, ItemStatus, MediaOption, MediaOptionKind, PlaybackEngine,
};
use bridge_traits::remote::{NowPlayingInfo, RemoteCommand, RemoteCommandCenter};
use core_runtime::events::{EventBus, EventStream};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// Currently selected media tracks, by locale, per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSelectionState {
    /// Selected audio track locale, `None` for the engine default.
    pub audible: Option<String>,
    /// Selected subtitle track locale, `None` for none.
    pub legible: Option<String>,
}

/// Commands marshaled from the [`Player`] handle onto the actor task.
enum PlayerCommand {
    Play,
    Pause,
    Toggle,
    Seek { seconds: f64 },
    SkipForward { seconds: f64 },
    SkipBackward { seconds: f64 },
    SetSpeed { rate: f32 },
    PlayNext,
    PlayPrevious,
    PlayItemAt { index: usize },
    SelectMediaOption { kind: MediaOptionKind, locale: String },
    MediaOptions {
        reply: oneshot::Sender<bridge_traits::error::Result<Vec<MediaOption>>>,
    },
    Close,
}

/// Handle to a running playback session.
///
/// Cheap to use from any task; every method marshals onto the player's own
/// task. After [`close`](Player::close) (or an engine shutdown) commands fail
/// with [`PlayerError::Closed`].
pub struct Player {
    commands: mpsc::Sender<PlayerCommand>,
    state_rx: watch::Receiver<PlayerState>,
    playlist_rx: watch::Receiver<PlaylistState>,
    selection_rx: watch::Receiver<MediaSelectionState>,
    events: EventBus<PlayerEvent>,
    task: tokio::task::JoinHandle<()>,
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("state", &*self.state_rx.borrow())
            .finish()
    }
}

impl Player {
    /// Starts a playback session: hands the playlist to the engine,
    /// subscribes to every configured signal surface, and spawns the actor.
    ///
    /// # Errors
    ///
    /// Fails when a configured bridge refuses its subscription. Engine
    /// *commands* (including the initial playlist hand-off) are
    /// fire-and-forget and never fail the spawn.
    pub async fn spawn(config: PlayerConfig) -> Result<Player> {
        let PlayerConfig {
            engine,
            connectivity_monitor,
            command_center,
            entries,
            initial_rate,
            event_buffer_size,
        } = config;

        let urls: Vec<String> = entries.iter().map(|e| e.source_url.clone()).collect();
        if !urls.is_empty() {
            if let Err(error) = engine.set_playlist(urls).await {
                tracing::warn!(%error, "failed to hand the playlist to the engine");
            }
        }

        let mut signal_stream = engine.subscribe_signals().await?;
        let (signal_tx, signal_rx) = mpsc::channel(64);
        tokio::spawn(async move {
            while let Some(signal) = signal_stream.next().await {
                if signal_tx.send(signal).await.is_err() {
                    break;
                }
            }
        });

        // Channels exist even when the bridge does not: the dropped sender
        // closes the branch on the first poll.
        let (conn_tx, conn_rx) = mpsc::channel(8);
        match &connectivity_monitor {
            Some(monitor) => {
                let mut stream = monitor.subscribe_changes().await?;
                tokio::spawn(async move {
                    while let Some(connected) = stream.next().await {
                        if conn_tx.send(connected).await.is_err() {
                            break;
                        }
                    }
                });
            }
            None => drop(conn_tx),
        }

        let (remote_tx, remote_rx) = mpsc::channel(16);
        match &command_center {
            Some(center) => {
                let mut stream = center.subscribe_commands().await?;
                tokio::spawn(async move {
                    while let Some(command) = stream.next().await {
                        if remote_tx.send(command).await.is_err() {
                            break;
                        }
                    }
                });
            }
            None => drop(remote_tx),
        }

        let queue = QueueController::new(engine.clone(), entries);
        let (state_tx, state_rx) = watch::channel(PlayerState::Loading);
        let (playlist_tx, playlist_rx) = watch::channel(queue.snapshot());
        let (selection_tx, selection_rx) = watch::channel(MediaSelectionState::default());
        let events = EventBus::new(event_buffer_size);

        let orchestrator = Orchestrator {
            transport: TransportController::new(engine.clone(), initial_rate),
            queue,
            engine,
            command_center,
            inputs: SignalInputs::default(),
            last_published: PlayerState::Loading,
            state_tx,
            playlist_tx,
            selection_tx,
            events: events.clone(),
        };

        let (command_tx, command_rx) = mpsc::channel(32);
        let task = tokio::spawn(orchestrator.run(command_rx, signal_rx, conn_rx, remote_rx));

        Ok(Player {
            commands: command_tx,
            state_rx,
            playlist_rx,
            selection_rx,
            events,
            task,
        })
    }

    async fn send(&self, command: PlayerCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PlayerError::Closed)
    }

    /// Begin or resume playback at the stored speed.
    pub async fn play(&self) -> Result<()> {
        self.send(PlayerCommand::Play).await
    }

    /// Pause playback.
    pub async fn pause(&self) -> Result<()> {
        self.send(PlayerCommand::Pause).await
    }

    /// Play or pause based on the tracked playing flag.
    pub async fn toggle(&self) -> Result<()> {
        self.send(PlayerCommand::Toggle).await
    }

    /// Seek within the current item; the target is clamped to
    /// `[0, duration]`.
    pub async fn seek(&self, seconds: f64) -> Result<()> {
        self.send(PlayerCommand::Seek { seconds }).await
    }

    /// Seek forward by `seconds`, clamped to the item's end.
    pub async fn skip_forward(&self, seconds: f64) -> Result<()> {
        self.send(PlayerCommand::SkipForward { seconds }).await
    }

    /// Seek backward by `seconds`, clamped to zero.
    pub async fn skip_backward(&self, seconds: f64) -> Result<()> {
        self.send(PlayerCommand::SkipBackward { seconds }).await
    }

    /// Set the playback speed. Stored always; applied to the engine only
    /// while playing, and reasserted on the next play.
    pub async fn set_speed(&self, rate: f32) -> Result<()> {
        self.send(PlayerCommand::SetSpeed { rate }).await
    }

    /// Skip to the next playlist entry, wrapping from the last to the first.
    pub async fn play_next(&self) -> Result<()> {
        self.send(PlayerCommand::PlayNext).await
    }

    /// Skip to the previous playlist entry, wrapping from the first to the
    /// last.
    pub async fn play_previous(&self) -> Result<()> {
        self.send(PlayerCommand::PlayPrevious).await
    }

    /// Jump to an arbitrary playlist index. Out-of-range is a silent no-op.
    pub async fn play_item_at(&self, index: usize) -> Result<()> {
        self.send(PlayerCommand::PlayItemAt { index }).await
    }

    /// Select a media track of `kind` by locale on the current item.
    pub async fn select_media_option(
        &self,
        kind: MediaOptionKind,
        locale: impl Into<String>,
    ) -> Result<()> {
        self.send(PlayerCommand::SelectMediaOption {
            kind,
            locale: locale.into(),
        })
        .await
    }

    /// Media tracks selectable on the current item.
    pub async fn media_options(&self) -> Result<Vec<MediaOption>> {
        let (reply, rx) = oneshot::channel();
        self.send(PlayerCommand::MediaOptions { reply }).await?;
        rx.await
            .map_err(|_| PlayerError::Closed)?
            .map_err(PlayerError::from)
    }

    /// Latest published player state.
    pub fn state(&self) -> PlayerState {
        *self.state_rx.borrow()
    }

    /// Watch the player state. The receiver starts at the current value.
    pub fn subscribe_state(&self) -> watch::Receiver<PlayerState> {
        self.state_rx.clone()
    }

    /// Latest playlist snapshot.
    pub fn playlist(&self) -> PlaylistState {
        self.playlist_rx.borrow().clone()
    }

    /// Watch the playlist state.
    pub fn subscribe_playlist(&self) -> watch::Receiver<PlaylistState> {
        self.playlist_rx.clone()
    }

    /// Latest media-track selection.
    pub fn media_selection(&self) -> MediaSelectionState {
        self.selection_rx.borrow().clone()
    }

    /// Watch the media-track selection.
    pub fn subscribe_media_selection(&self) -> watch::Receiver<MediaSelectionState> {
        self.selection_rx.clone()
    }

    /// Subscribe to the full event stream. Past events are not replayed.
    pub fn subscribe_events(&self) -> EventStream<PlayerEvent> {
        EventStream::new(self.events.subscribe())
    }

    /// Shuts the session down: clears now-playing metadata, emits
    /// [`PlayerEvent::Closed`], and waits for the actor to finish.
    pub async fn close(self) -> Result<()> {
        // A send error means the actor already stopped; still join it.
        self.commands.send(PlayerCommand::Close).await.ok();
        self.task.await.map_err(|_| PlayerError::Closed)?;
        Ok(())
    }
}

/// The single-writer actor owning all mutable playback state.
struct Orchestrator {
    transport: TransportController,
    queue: QueueController,
    engine: Arc<dyn PlaybackEngine>,
    command_center: Option<Arc<dyn RemoteCommandCenter>>,
    inputs: SignalInputs,
    /// Last state actually sent to subscribers; the dedupe baseline. Under
    /// the payload-blind equality a `Failed` never re-notifies for a
    /// different kind.
    last_published: PlayerState,
    state_tx: watch::Sender<PlayerState>,
    playlist_tx: watch::Sender<PlaylistState>,
    selection_tx: watch::Sender<MediaSelectionState>,
    events: EventBus<PlayerEvent>,
}

impl Orchestrator {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<PlayerCommand>,
        mut signals: mpsc::Receiver<EngineSignal>,
        mut connectivity: mpsc::Receiver<bool>,
        mut remote: mpsc::Receiver<RemoteCommand>,
    ) {
        self.push_now_playing().await;

        let mut signals_open = true;
        let mut connectivity_open = true;
        let mut remote_open = true;

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(PlayerCommand::Close) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
                signal = signals.recv(), if signals_open => match signal {
                    Some(signal) => self.handle_signal(signal).await,
                    None => {
                        tracing::debug!("engine signal stream ended");
                        signals_open = false;
                    }
                },
                connected = connectivity.recv(), if connectivity_open => match connected {
                    Some(connected) => self.handle_connectivity(connected).await,
                    None => connectivity_open = false,
                },
                command = remote.recv(), if remote_open => match command {
                    Some(command) => self.handle_remote(command).await,
                    None => remote_open = false,
                },
            }
        }

        self.shutdown().await;
    }

    async fn shutdown(&mut self) {
        if let Some(center) = &self.command_center {
            if let Err(error) = center.clear_now_playing().await {
                tracing::warn!(%error, "failed to clear now-playing info");
            }
        }
        self.events.emit(PlayerEvent::Closed).ok();
        tracing::info!("player closed");
    }

    // ---- engine signals ----------------------------------------------------

    async fn handle_signal(&mut self, signal: EngineSignal) {
        match signal {
            EngineSignal::Time { seconds } => {
                if self.transport.record_time(seconds) {
                    self.events
                        .emit(PlayerEvent::PositionChanged {
                            position_seconds: seconds,
                            duration_seconds: self.transport.snapshot().duration_seconds,
                        })
                        .ok();
                    self.push_now_playing().await;
                }
            }
            EngineSignal::Duration { seconds } => {
                self.transport.record_duration(seconds);
                let index = self.queue.current_index();
                self.queue.update_duration(seconds, index);
                self.publish_playlist();
                self.events
                    .emit(PlayerEvent::DurationResolved {
                        index,
                        duration_seconds: seconds,
                    })
                    .ok();
                self.push_now_playing().await;
            }
            EngineSignal::ItemStatus(status) => {
                self.inputs.item_status = Some(status);
                self.republish_state();
            }
            EngineSignal::Buffering(buffering) => {
                self.inputs.buffering = Some(buffering);
                self.republish_state();
            }
            EngineSignal::PlaybackEnded => self.handle_playback_ended().await,
            EngineSignal::ExternalPlayingChanged { is_playing } => {
                self.handle_external_playing(is_playing).await
            }
        }
    }

    async fn handle_playback_ended(&mut self) {
        match self.queue.handle_item_ended().await {
            Ok(EndOfItemOutcome::AdvancedInPlace) => {
                // The engine already moved its queue head; only the stored
                // rate needs reasserting to survive the item transition.
                self.transport.reset_position();
                if let Err(error) = self.transport.reassert_rate().await {
                    tracing::warn!(%error, "failed to reassert rate across item transition");
                }
                self.emit_track_changed();
                self.publish_playlist();
                self.push_now_playing().await;
            }
            Ok(EndOfItemOutcome::WrappedToStart) => {
                // The rebuilt queue comes up stopped; unlike the increment
                // branch, playback must be explicitly resumed.
                self.transport.reset_position();
                match self.transport.play().await {
                    Ok(()) => {
                        self.inputs.is_playing = Some(true);
                        self.republish_state();
                    }
                    Err(error) => {
                        tracing::warn!(%error, "failed to resume playback after wrap")
                    }
                }
                self.emit_track_changed();
                self.publish_playlist();
                self.push_now_playing().await;
            }
            Ok(EndOfItemOutcome::Ignored) => {}
            Err(error) => {
                tracing::warn!(%error, "failed to wrap queue after last item ended");
            }
        }
    }

    async fn handle_external_playing(&mut self, is_playing: bool) {
        match guard::reconcile(self.transport.is_playing(), is_playing) {
            EchoDecision::Ignore => {
                tracing::debug!(is_playing, "ignoring play/pause echo of own command");
            }
            EchoDecision::Apply => {
                tracing::debug!(is_playing, "adopting external play/pause transition");
                self.transport.apply_external(is_playing);
                self.inputs.is_playing = Some(is_playing);
                self.republish_state();
                self.events
                    .emit(PlayerEvent::ExternalPlaybackChanged { is_playing })
                    .ok();
                self.push_now_playing().await;
            }
        }
    }

    // ---- connectivity ------------------------------------------------------

    async fn handle_connectivity(&mut self, connected: bool) {
        if !recovery::should_reload(&self.last_published, connected) {
            return;
        }
        let PlayerState::Failed(kind) = self.last_published else {
            return;
        };
        tracing::info!(?kind, "connectivity restored, reloading current position");
        self.events.emit(PlayerEvent::RecoveryStarted { kind }).ok();

        if let Err(error) = self.queue.reload().await {
            tracing::warn!(%error, "recovery reload failed to reach the engine");
            return;
        }
        self.transport.reset_position();
        match self.transport.play().await {
            Ok(()) => self.inputs.is_playing = Some(true),
            Err(error) => tracing::warn!(%error, "failed to resume after recovery reload"),
        }
        // The reloaded item starts over; fresh status signals follow.
        self.inputs.item_status = Some(ItemStatus::Unknown);
        self.republish_state();
    }

    // ---- commands ----------------------------------------------------------

    async fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::Play => self.do_play().await,
            PlayerCommand::Pause => self.do_pause().await,
            PlayerCommand::Toggle => self.do_toggle().await,
            PlayerCommand::Seek { seconds } => self.do_seek(seconds).await,
            PlayerCommand::SkipForward { seconds } => self.do_skip(seconds, true).await,
            PlayerCommand::SkipBackward { seconds } => self.do_skip(seconds, false).await,
            PlayerCommand::SetSpeed { rate } => self.do_set_speed(rate).await,
            PlayerCommand::PlayNext => self.do_play_next().await,
            PlayerCommand::PlayPrevious => self.do_play_previous().await,
            PlayerCommand::PlayItemAt { index } => self.do_play_item_at(index).await,
            PlayerCommand::SelectMediaOption { kind, locale } => {
                self.do_select_media_option(kind, locale).await
            }
            PlayerCommand::MediaOptions { reply } => {
                let _ = reply.send(self.engine.media_options().await);
            }
            // Handled in the run loop before dispatch.
            PlayerCommand::Close => {}
        }
    }

    async fn handle_remote(&mut self, command: RemoteCommand) {
        tracing::debug!(?command, "remote command received");
        match command {
            RemoteCommand::Play => self.do_play().await,
            RemoteCommand::Pause => self.do_pause().await,
            RemoteCommand::Toggle => self.do_toggle().await,
            RemoteCommand::Next => self.do_play_next().await,
            RemoteCommand::SkipForward { seconds } => self.do_skip(seconds, true).await,
            RemoteCommand::SkipBackward { seconds } => self.do_skip(seconds, false).await,
            RemoteCommand::SeekTo { seconds } => self.do_seek(seconds).await,
        }
    }

    async fn do_play(&mut self) {
        match self.transport.play().await {
            Ok(()) => {
                self.inputs.is_playing = Some(true);
                self.republish_state();
                self.push_now_playing().await;
            }
            Err(error) => tracing::warn!(%error, "play command failed to reach the engine"),
        }
    }

    async fn do_pause(&mut self) {
        match self.transport.pause().await {
            Ok(()) => {
                self.inputs.is_playing = Some(false);
                self.republish_state();
                self.push_now_playing().await;
            }
            Err(error) => tracing::warn!(%error, "pause command failed to reach the engine"),
        }
    }

    async fn do_toggle(&mut self) {
        match self.transport.toggle().await {
            Ok(()) => {
                self.inputs.is_playing = Some(self.transport.is_playing());
                self.republish_state();
                self.push_now_playing().await;
            }
            Err(error) => tracing::warn!(%error, "toggle command failed to reach the engine"),
        }
    }

    async fn do_seek(&mut self, seconds: f64) {
        match self.transport.seek(seconds).await {
            Ok(()) => {
                let snapshot = self.transport.snapshot();
                self.events
                    .emit(PlayerEvent::PositionChanged {
                        position_seconds: snapshot.current_time_seconds,
                        duration_seconds: snapshot.duration_seconds,
                    })
                    .ok();
                self.push_now_playing().await;
            }
            Err(error) => tracing::warn!(%error, "seek command failed to reach the engine"),
        }
    }

    async fn do_skip(&mut self, seconds: f64, forward: bool) {
        let result = if forward {
            self.transport.skip_forward(seconds).await
        } else {
            self.transport.skip_backward(seconds).await
        };
        match result {
            Ok(()) => {
                let snapshot = self.transport.snapshot();
                self.events
                    .emit(PlayerEvent::PositionChanged {
                        position_seconds: snapshot.current_time_seconds,
                        duration_seconds: snapshot.duration_seconds,
                    })
                    .ok();
                self.push_now_playing().await;
            }
            Err(error) => tracing::warn!(%error, "skip command failed to reach the engine"),
        }
    }

    async fn do_set_speed(&mut self, rate: f32) {
        match self.transport.set_speed(rate).await {
            Ok(()) => self.push_now_playing().await,
            Err(error) => tracing::warn!(%error, "speed command failed to reach the engine"),
        }
    }

    async fn do_play_next(&mut self) {
        let previous = self.queue.current_index();
        match self.queue.play_next().await {
            Ok(Some(strategy)) => self.after_navigation(strategy, previous).await,
            Ok(None) => {}
            Err(error) => tracing::warn!(%error, "next-entry command failed to reach the engine"),
        }
    }

    async fn do_play_previous(&mut self) {
        let previous = self.queue.current_index();
        match self.queue.play_previous().await {
            Ok(Some(strategy)) => self.after_navigation(strategy, previous).await,
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(%error, "previous-entry command failed to reach the engine")
            }
        }
    }

    async fn do_play_item_at(&mut self, index: usize) {
        let previous = self.queue.current_index();
        match self.queue.switch_to(index).await {
            Ok(Some(strategy)) => self.after_navigation(strategy, previous).await,
            Ok(None) => {}
            Err(error) => tracing::warn!(%error, "switch command failed to reach the engine"),
        }
    }

    async fn do_select_media_option(&mut self, kind: MediaOptionKind, locale: String) {
        match self.engine.select_media_option(kind, locale.clone()).await {
            Ok(()) => {
                self.selection_tx.send_modify(|selection| match kind {
                    MediaOptionKind::Audible => selection.audible = Some(locale),
                    MediaOptionKind::Legible => selection.legible = Some(locale),
                });
            }
            Err(error) => {
                tracing::warn!(%error, ?kind, "media-option selection failed to reach the engine")
            }
        }
    }

    /// Position/playlist bookkeeping shared by every successful navigation.
    /// A restart keeps the item and its known duration; any real move resets
    /// both. Playback is resumed in every case: navigation expresses playing
    /// intent, and a rebuilt queue comes up stopped.
    async fn after_navigation(&mut self, strategy: NavigationStrategy, previous_index: usize) {
        match strategy {
            NavigationStrategy::Restart => self.transport.rewind(),
            NavigationStrategy::Advance | NavigationStrategy::Rebuild => {
                self.transport.reset_position()
            }
        }
        match self.transport.play().await {
            Ok(()) => {
                self.inputs.is_playing = Some(true);
                self.republish_state();
            }
            Err(error) => tracing::warn!(%error, "failed to resume playback after navigation"),
        }
        self.publish_playlist();
        if self.queue.current_index() != previous_index {
            self.emit_track_changed();
        }
        self.push_now_playing().await;
    }

    // ---- projections -------------------------------------------------------

    /// Derives and publishes the unified state if it changed under the
    /// payload-blind equality. No-op while any reducer input is still unset.
    fn republish_state(&mut self) {
        let Some(state) = self.inputs.derive_latest() else {
            return;
        };
        if state == self.last_published {
            return;
        }
        tracing::debug!(%state, previous = %self.last_published, "player state changed");
        self.last_published = state;
        self.state_tx.send_replace(state);
        self.events.emit(PlayerEvent::StateChanged { state }).ok();
    }

    fn publish_playlist(&mut self) {
        self.playlist_tx.send_replace(self.queue.snapshot());
    }

    fn emit_track_changed(&self) {
        if let Some(entry) = self.queue.current_entry() {
            self.events
                .emit(PlayerEvent::TrackChanged {
                    index: self.queue.current_index(),
                    source_url: entry.source_url.clone(),
                })
                .ok();
        }
    }

    async fn push_now_playing(&self) {
        let Some(center) = &self.command_center else {
            return;
        };
        let Some(entry) = self.queue.current_entry() else {
            return;
        };
        let TransportSnapshot {
            is_playing,
            rate,
            current_time_seconds,
            duration_seconds,
        } = self.transport.snapshot();

        let info = NowPlayingInfo {
            title: entry.title.clone(),
            artist: if entry.description.is_empty() {
                None
            } else {
                Some(entry.description.clone())
            },
            duration_seconds: entry.duration_seconds.unwrap_or(duration_seconds),
            elapsed_seconds: current_time_seconds,
            rate: if is_playing { rate } else { 0.0 },
        };
        if let Err(error) = center.update_now_playing(info).await {
            tracing::warn!(%error, "failed to update now-playing info");
        }
    }
}
