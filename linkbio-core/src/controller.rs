//! Playback controller: owns play/pause intent and couples the audio clock
//! to lyric synchronization.
//!
//! The controller never renders anything. Every operation returns plain data
//! (an outcome, a [`TickUpdate`], a [`RenderState`]) for the render layer to
//! apply, and no operation returns an error: a missing audio source, an
//! unknown duration or a refused play request are all reduced-feature states.

use crate::audio::{AudioEvent, AudioSource, PendingPlay};
use crate::cue::{Cue, CueTrack};
use crate::document::{MusicConfig, DEFAULT_DISPLAY_DURATION};
use crate::error::{CoreError, Result};
use crate::playback::{PlaybackState, PlaybackStatus};
use crate::sync::{CueUpdate, LyricSync};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info};

const LOG_TARGET: &str = "linkbio::controller";

/// Result of [`PlaybackController::toggle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Playback was requested
    Playing,
    /// Playback was paused
    Paused,
    /// The source refused to play; state is unchanged
    Refused,
    /// No usable audio source; nothing happened
    Unavailable,
}

/// Result of [`PlaybackController::seek_to_ratio`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOutcome {
    /// The source was asked to jump to `target`
    Seeked { target: Duration },
    /// No source, unknown duration or a NaN ratio
    Ignored,
}

/// Result of resolving a deferred play request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The environment allowed playback and the controller is now playing
    Started,
    /// The environment refused playback; the controller is not playing
    Blocked,
    /// The user changed the state before the outcome arrived; it was discarded
    Superseded,
}

/// Data produced by one time signal tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickUpdate {
    pub progress_ratio: f64,
    pub cue: CueUpdate,
}

/// Icon shown on the transport button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportIcon {
    Play,
    Pause,
}

/// Everything the render layer needs to draw the player
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub status: PlaybackStatus,
    pub icon: TransportIcon,
    pub progress_ratio: f64,
    pub elapsed: Duration,
    /// Total time to display; falls back to a default when unknown
    pub total: Duration,
    pub transport_enabled: bool,
    /// Album art rotates only while playing
    pub album_art_spinning: bool,
    /// Cue to display, the first cue before playback
    pub lyric: Option<Cue>,
}

/// A play request whose outcome has not arrived yet.
///
/// Created by [`PlaybackController::autoplay_attempt`], or by
/// [`PlaybackController::toggle`] when the source decides later (see
/// [`PlaybackController::take_pending_play`]). Await [`Self::outcome`]
/// without holding the controller, then hand the result to
/// [`PlaybackController::resolve_play`].
#[derive(Debug)]
pub struct PlayAttempt {
    pending: PendingPlay,
    ticket: PlayTicket,
}

impl PlayAttempt {
    /// Wait for the environment's decision
    pub async fn outcome(self) -> (PlayTicket, Result<()>) {
        (self.ticket, self.pending.outcome().await)
    }
}

/// Identifies the controller state a play request started from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayTicket {
    generation: u64,
    /// Status to fall back to on refusal; `None` for autoplay, which leaves
    /// the state untouched until it succeeds
    revert_to: Option<PlaybackStatus>,
}

/// Transport over an abstract audio source, synchronized with lyrics
pub struct PlaybackController {
    source: Option<Box<dyn AudioSource>>,
    state: PlaybackState,
    sync: LyricSync,
    fallback_duration: Option<Duration>,
    /// Bumped on every status transition and source swap; stale play results
    /// compare against it
    generation: u64,
    /// User play request still waiting for the source's decision
    pending_play: Option<PlayAttempt>,
}

impl PlaybackController {
    /// Create a controller for the document's music section.
    ///
    /// `source` is ignored when the document disables audio, so a placeholder
    /// audio file always yields the idle path.
    #[must_use]
    pub fn new(music: &MusicConfig, source: Option<Box<dyn AudioSource>>) -> Self {
        let source = if music.audio_file().is_some() {
            source
        } else {
            if source.is_some() {
                info!(target: LOG_TARGET, "Audio file not configured; player disabled");
            }
            None
        };
        let fallback_duration = music.fallback_duration();
        let duration = source
            .as_ref()
            .and_then(|s| s.duration())
            .or(fallback_duration);

        Self {
            state: PlaybackState::new(source.is_some(), duration),
            source,
            sync: LyricSync::new(music.cue_track()),
            fallback_duration,
            generation: 0,
            pending_play: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &PlaybackState {
        &self.state
    }

    #[must_use]
    pub const fn status(&self) -> PlaybackStatus {
        self.state.status
    }

    #[must_use]
    pub const fn lyrics(&self) -> &LyricSync {
        &self.sync
    }

    /// Whether transport controls do anything
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.source.is_some()
    }

    /// Subscribe to the source's events, `None` when disabled
    #[must_use]
    pub fn subscribe(&self) -> Option<broadcast::Receiver<AudioEvent>> {
        self.source.as_ref().map(|s| s.subscribe())
    }

    /// Set output volume on the source
    pub fn set_volume(&mut self, volume: f64) {
        if let Some(source) = self.source.as_mut() {
            source.set_volume(volume);
        }
    }

    fn transition(&mut self, status: PlaybackStatus) {
        if self.state.status != status {
            debug!(target: LOG_TARGET, "Playback {} -> {}", self.state.status, status);
            self.state.status = status;
            self.invalidate_pending();
        }
    }

    /// Make every outstanding play ticket stale
    fn invalidate_pending(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Play when paused, idle or ended; pause when playing.
    ///
    /// Returns [`ToggleOutcome::Unavailable`] without touching state when no
    /// usable audio source is configured, and [`ToggleOutcome::Refused`] when
    /// the source turns the play request down on the spot. A request the
    /// source decides on later is kept for [`Self::take_pending_play`], and
    /// the controller shows `Playing` until the outcome says otherwise.
    pub fn toggle(&mut self) -> ToggleOutcome {
        let Some(source) = self.source.as_mut() else {
            debug!(target: LOG_TARGET, "Toggle ignored: no audio source");
            return ToggleOutcome::Unavailable;
        };

        if self.state.is_playing() {
            source.pause();
            self.pending_play = None;
            self.transition(PlaybackStatus::Paused);
            return ToggleOutcome::Paused;
        }

        let previous = self.state.status;
        if previous == PlaybackStatus::Ended {
            source.set_current_time(Duration::ZERO);
        }
        // A track rewound from its end is no longer ended, played or not
        let revert_to = match previous {
            PlaybackStatus::Ended => PlaybackStatus::Paused,
            other => other,
        };

        let mut pending = source.play();
        match pending.try_outcome() {
            Some(Err(e)) => {
                info!(target: LOG_TARGET, "Play request refused: {e}");
                self.transition(revert_to);
                ToggleOutcome::Refused
            }
            Some(Ok(())) => {
                self.transition(PlaybackStatus::Playing);
                ToggleOutcome::Playing
            }
            None => {
                self.transition(PlaybackStatus::Playing);
                self.pending_play = Some(PlayAttempt {
                    pending,
                    ticket: PlayTicket {
                        generation: self.generation,
                        revert_to: Some(revert_to),
                    },
                });
                ToggleOutcome::Playing
            }
        }
    }

    /// Take the play request [`Self::toggle`] left undecided, if any.
    ///
    /// Await it and pass the result to [`Self::resolve_play`], so a late
    /// refusal takes the controller out of `Playing`.
    pub fn take_pending_play(&mut self) -> Option<PlayAttempt> {
        self.pending_play.take()
    }

    /// Jump to `ratio` of the track duration.
    ///
    /// The ratio is clamped to `[0, 1]`. Ignored when there is no source,
    /// the duration is unknown, or the ratio is NaN.
    pub fn seek_to_ratio(&mut self, ratio: f64) -> SeekOutcome {
        let Some(source) = self.source.as_mut() else {
            return SeekOutcome::Ignored;
        };
        let Some(duration) = self.state.duration.filter(|d| !d.is_zero()) else {
            debug!(target: LOG_TARGET, "Seek ignored: duration unknown");
            return SeekOutcome::Ignored;
        };
        if ratio.is_nan() {
            return SeekOutcome::Ignored;
        }

        let target = Duration::try_from_secs_f64(duration.as_secs_f64() * ratio.clamp(0.0, 1.0))
            .unwrap_or(duration);
        debug!(target: LOG_TARGET, "Seeking to {:?} ({:.3})", target, ratio);
        source.set_current_time(target);

        if self.state.status == PlaybackStatus::Ended {
            self.transition(PlaybackStatus::Paused);
        }
        SeekOutcome::Seeked { target }
    }

    /// Feed a time signal tick.
    ///
    /// Updates the current time and progress ratio and forwards the time to
    /// lyric synchronization, returning any cue change.
    pub fn on_time_advance(&mut self, current_time: Duration) -> TickUpdate {
        self.state.current_time = current_time;
        TickUpdate {
            progress_ratio: self.state.progress_ratio(),
            cue: self.sync.advance(current_time),
        }
    }

    /// Source metadata loaded; prefer its duration over the document's
    pub fn on_metadata_ready(&mut self, duration: Option<Duration>) {
        let duration = duration
            .filter(|d| !d.is_zero())
            .or(self.fallback_duration);
        debug!(target: LOG_TARGET, "Metadata ready, duration {:?}", duration);
        self.state.duration = duration;
    }

    /// Source reached the end of the track
    pub fn on_ended(&mut self) {
        if self.source.is_none() {
            return;
        }
        info!(target: LOG_TARGET, "Playback ended");
        self.transition(PlaybackStatus::Ended);
    }

    /// Dispatch a source event to the matching handler.
    ///
    /// Returns the tick update for [`AudioEvent::TimeAdvanced`].
    pub fn handle_event(&mut self, event: AudioEvent) -> Option<TickUpdate> {
        match event {
            AudioEvent::MetadataReady { duration } => {
                self.on_metadata_ready(duration);
                None
            }
            AudioEvent::TimeAdvanced { position } => Some(self.on_time_advance(position)),
            AudioEvent::Ended => {
                self.on_ended();
                None
            }
        }
    }

    /// Ask the source to start playing without a user gesture.
    ///
    /// Returns `None` when already playing or when no source is configured.
    /// The state does not change until [`Self::resolve_play`] applies the
    /// outcome, so the controller stays responsive to [`Self::toggle`] while
    /// the attempt is outstanding.
    pub fn autoplay_attempt(&mut self) -> Option<PlayAttempt> {
        if self.state.is_playing() {
            return None;
        }
        let source = self.source.as_mut()?;
        debug!(target: LOG_TARGET, "Attempting autoplay via {}", source.name());

        Some(PlayAttempt {
            pending: source.play(),
            ticket: PlayTicket {
                generation: self.generation,
                revert_to: None,
            },
        })
    }

    /// Apply the outcome of a deferred play request.
    ///
    /// A result that arrives after the playback state changed or the source
    /// was replaced is discarded; a discarded success re-pauses the source so
    /// it agrees with the controller. Refusals are logged, never surfaced: an
    /// autoplay refusal leaves the state alone, a refused user request falls
    /// back to the status it started from.
    pub fn resolve_play(&mut self, ticket: PlayTicket, result: Result<()>) -> PlayOutcome {
        if ticket.generation != self.generation {
            debug!(target: LOG_TARGET, "Discarding stale play outcome");
            if result.is_ok() && !self.state.is_playing() {
                if let Some(source) = self.source.as_mut() {
                    source.pause();
                }
            }
            return PlayOutcome::Superseded;
        }

        match result {
            Ok(()) => {
                info!(target: LOG_TARGET, "Playback started");
                self.transition(PlaybackStatus::Playing);
                PlayOutcome::Started
            }
            Err(e) => {
                match e {
                    CoreError::PlaybackRejected { reason } => {
                        info!(target: LOG_TARGET, "Playback blocked: {reason}");
                    }
                    other => info!(target: LOG_TARGET, "Playback failed: {other}"),
                }
                if let Some(status) = ticket.revert_to {
                    self.transition(status);
                }
                PlayOutcome::Blocked
            }
        }
    }

    /// Swap the audio source, resetting lyrics and transport state.
    ///
    /// Play requests made against the previous source are invalidated.
    pub fn replace_source(&mut self, source: Option<Box<dyn AudioSource>>) {
        if let Some(old) = self.source.as_mut() {
            old.pause();
        }
        self.source = source;
        self.pending_play = None;
        self.invalidate_pending();

        let duration = self
            .source
            .as_ref()
            .and_then(|s| s.duration())
            .or(self.fallback_duration);
        let status = if self.source.is_some() {
            PlaybackStatus::Paused
        } else {
            PlaybackStatus::Idle
        };
        self.state.current_time = Duration::ZERO;
        self.state.duration = duration;
        self.state.has_source = self.source.is_some();
        self.transition(status);
        self.sync.reset();
    }

    /// Load a new cue track; the active cue is forgotten
    pub fn load_track(&mut self, track: CueTrack) {
        self.sync.load_track(track);
    }

    /// Snapshot for the render layer
    #[must_use]
    pub fn render_state(&self) -> RenderState {
        let playing = self.state.is_playing();
        let lyric = self
            .sync
            .active_cue()
            .or_else(|| self.sync.track().first())
            .cloned();

        RenderState {
            status: self.state.status,
            icon: if playing {
                TransportIcon::Pause
            } else {
                TransportIcon::Play
            },
            progress_ratio: self.state.progress_ratio(),
            elapsed: self.state.current_time,
            total: self.state.duration.unwrap_or(DEFAULT_DISPLAY_DURATION),
            transport_enabled: self.is_available(),
            album_art_spinning: playing,
            lyric,
        }
    }
}
