//! Audio resource boundary.
//!
//! The player never talks to a concrete audio backend. It drives an
//! [`AudioSource`] and reacts to the [`AudioEvent`]s the source broadcasts.

use crate::error::{CoreError, Result};
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};

/// Events emitted by an audio source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEvent {
    /// Track metadata finished loading
    MetadataReady {
        /// Duration reported by the source, `None` if it could not tell
        duration: Option<Duration>,
    },
    /// Playback position moved, by playing or by a seek
    TimeAdvanced { position: Duration },
    /// Playback reached the end of the track
    Ended,
}

/// Deferred outcome of a [`AudioSource::play`] request.
///
/// The environment may refuse playback (for example an autoplay policy), and
/// it may only decide after the request was made.
#[derive(Debug)]
pub struct PendingPlay {
    rx: oneshot::Receiver<Result<()>>,
}

impl PendingPlay {
    /// Create a pending request together with the sender that resolves it
    #[must_use]
    pub fn channel() -> (oneshot::Sender<Result<()>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// A request that already succeeded
    #[must_use]
    pub fn resolved() -> Self {
        Self::settled(Ok(()))
    }

    /// A request that was already refused
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::settled(Err(CoreError::PlaybackRejected {
            reason: reason.into(),
        }))
    }

    fn settled(result: Result<()>) -> Self {
        let (tx, pending) = Self::channel();
        // The receiver is alive in `pending`, so the send cannot fail
        let _ = tx.send(result);
        pending
    }

    /// The outcome if the environment already decided, without waiting.
    ///
    /// After this returns `Some`, the request is spent and [`Self::outcome`]
    /// reports [`CoreError::SourceClosed`].
    pub fn try_outcome(&mut self) -> Option<Result<()>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(CoreError::SourceClosed)),
        }
    }

    /// Wait for the environment's decision.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PlaybackRejected`] when playback was refused and
    /// [`CoreError::SourceClosed`] when the source dropped the request.
    pub async fn outcome(self) -> Result<()> {
        self.rx.await.unwrap_or(Err(CoreError::SourceClosed))
    }
}

/// Capability the player needs from an audio backend.
///
/// Implementations should:
///
/// - Broadcast [`AudioEvent::MetadataReady`] once the duration is known
/// - Broadcast [`AudioEvent::TimeAdvanced`] at sub-second granularity while
///   playing and after every seek
/// - Broadcast [`AudioEvent::Ended`] when playback reaches the end
pub trait AudioSource: Send {
    /// Returns a human-readable name for this source.
    fn name(&self) -> &'static str;

    /// Request playback. The outcome resolves later.
    fn play(&mut self) -> PendingPlay;

    /// Stop advancing the position.
    fn pause(&mut self);

    /// Current playback position.
    fn current_time(&self) -> Duration;

    /// Jump to `position`.
    fn set_current_time(&mut self, position: Duration);

    /// Track duration, `None` until metadata is loaded.
    fn duration(&self) -> Option<Duration>;

    /// Set output volume in `[0, 1]`.
    fn set_volume(&mut self, volume: f64);

    /// Subscribe to source events.
    fn subscribe(&self) -> broadcast::Receiver<AudioEvent>;
}
