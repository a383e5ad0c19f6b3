//! Headless audio source driven by a clock.
//!
//! [`ClockAudioSource`] produces no sound. It advances a position on a fixed
//! tick and emits the same events a media element would, which is all the
//! lyric player needs to run in a terminal or under test.

use crate::audio::{AudioEvent, AudioSource, PendingPlay};
use crate::time::DurationExt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const LOG_TARGET: &str = "linkbio::clock";

/// Default time signal cadence, matching a browser's `timeupdate` rate
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Shared flag recording that the user interacted with the player.
///
/// Clones observe the same flag, so the render layer can keep a handle after
/// the source is handed to the controller.
#[derive(Debug, Clone, Default)]
pub struct UserActivation(Arc<AtomicBool>);

impl UserActivation {
    /// Record a user gesture
    pub fn grant(&self) {
        if !self.0.swap(true, Ordering::SeqCst) {
            debug!(target: LOG_TARGET, "User activation granted");
        }
    }

    #[must_use]
    pub fn is_granted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Audio source that advances its position on a timer
pub struct ClockAudioSource {
    duration: Duration,
    tick_interval: Duration,
    position_ms: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    session: Option<CancellationToken>,
    metadata_loaded: bool,
    require_activation: bool,
    activation: UserActivation,
    volume: f64,
    event_tx: broadcast::Sender<AudioEvent>,
}

impl ClockAudioSource {
    /// Create a clock for a track of `duration`, ticking every `tick_interval`
    #[must_use]
    pub fn new(duration: Duration, tick_interval: Duration) -> Self {
        let (event_tx, _) = broadcast::channel(64);

        Self {
            duration,
            tick_interval: if tick_interval.is_zero() {
                DEFAULT_TICK_INTERVAL
            } else {
                tick_interval
            },
            position_ms: Arc::new(AtomicU64::new(0)),
            running: Arc::new(AtomicBool::new(false)),
            session: None,
            metadata_loaded: false,
            require_activation: false,
            activation: UserActivation::default(),
            volume: 1.0,
            event_tx,
        }
    }

    /// Refuse `play()` until the user activation is granted.
    ///
    /// Mirrors browser autoplay policies, where playback needs a user gesture.
    #[must_use]
    pub const fn with_activation_required(mut self, required: bool) -> Self {
        self.require_activation = required;
        self
    }

    /// Handle for granting user activation later
    #[must_use]
    pub fn user_activation(&self) -> UserActivation {
        self.activation.clone()
    }

    /// Finish loading metadata and announce the duration
    pub fn load(&mut self) {
        self.metadata_loaded = true;
        let _ = self.event_tx.send(AudioEvent::MetadataReady {
            duration: self.duration(),
        });
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    #[must_use]
    pub const fn volume(&self) -> f64 {
        self.volume
    }

    fn duration_ms(&self) -> u64 {
        self.duration.as_millis_u64()
    }

    fn stop_session(&mut self) {
        if let Some(token) = self.session.take() {
            token.cancel();
        }
        self.running.store(false, Ordering::SeqCst);
    }
}

impl AudioSource for ClockAudioSource {
    fn name(&self) -> &'static str {
        "clock"
    }

    fn play(&mut self) -> PendingPlay {
        if self.require_activation && !self.activation.is_granted() {
            info!(target: LOG_TARGET, "Play request refused: no user activation yet");
            return PendingPlay::rejected("playback requires user activation");
        }
        if self.is_running() {
            return PendingPlay::resolved();
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return PendingPlay::rejected("no async runtime available");
        };

        let duration_ms = self.duration_ms();
        // Playing an ended track starts it over
        if self.position_ms.load(Ordering::SeqCst) >= duration_ms {
            self.position_ms.store(0, Ordering::SeqCst);
        }

        self.stop_session();
        let token = CancellationToken::new();
        self.session = Some(token.clone());
        self.running.store(true, Ordering::SeqCst);

        let position_ms = Arc::clone(&self.position_ms);
        let running = Arc::clone(&self.running);
        let event_tx = self.event_tx.clone();
        let tick_interval = self.tick_interval;
        let step_ms = tick_interval.as_millis_u64();

        runtime.spawn(async move {
            let mut interval = tokio::time::interval(tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            interval.tick().await;

            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = interval.tick() => {
                        let previous = position_ms.fetch_add(step_ms, Ordering::SeqCst);
                        let position = previous.saturating_add(step_ms);
                        if position >= duration_ms {
                            position_ms.store(duration_ms, Ordering::SeqCst);
                            let _ = event_tx.send(AudioEvent::TimeAdvanced {
                                position: Duration::from_millis(duration_ms),
                            });
                            let _ = event_tx.send(AudioEvent::Ended);
                            break;
                        }
                        let _ = event_tx.send(AudioEvent::TimeAdvanced {
                            position: Duration::from_millis(position),
                        });
                    }
                }
            }

            if !token.is_cancelled() {
                running.store(false, Ordering::SeqCst);
            }
        });

        PendingPlay::resolved()
    }

    fn pause(&mut self) {
        self.stop_session();
    }

    fn current_time(&self) -> Duration {
        Duration::from_millis(self.position_ms.load(Ordering::SeqCst))
    }

    fn set_current_time(&mut self, position: Duration) {
        let position = position.min(self.duration);
        self.position_ms
            .store(position.as_millis_u64(), Ordering::SeqCst);
        let _ = self.event_tx.send(AudioEvent::TimeAdvanced { position });
    }

    fn duration(&self) -> Option<Duration> {
        (self.metadata_loaded && !self.duration.is_zero()).then_some(self.duration)
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
    }

    fn subscribe(&self) -> broadcast::Receiver<AudioEvent> {
        self.event_tx.subscribe()
    }
}

impl Drop for ClockAudioSource {
    fn drop(&mut self) {
        self.stop_session();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(duration_secs: u64) -> ClockAudioSource {
        ClockAudioSource::new(Duration::from_secs(duration_secs), Duration::from_millis(250))
    }

    #[tokio::test]
    async fn test_load_announces_duration() {
        let mut source = clock(180);
        let mut rx = source.subscribe();
        assert!(source.duration().is_none());

        source.load();
        assert_eq!(
            rx.recv().await.unwrap(),
            AudioEvent::MetadataReady {
                duration: Some(Duration::from_secs(180))
            }
        );
        assert_eq!(source.duration(), Some(Duration::from_secs(180)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_emits_time_advanced() {
        let mut source = clock(10);
        let mut rx = source.subscribe();
        source.play().outcome().await.unwrap();

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(
            first,
            AudioEvent::TimeAdvanced {
                position: Duration::from_millis(250)
            }
        );
        assert_eq!(
            second,
            AudioEvent::TimeAdvanced {
                position: Duration::from_millis(500)
            }
        );
        assert!(source.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaching_duration_emits_ended() {
        let mut source = clock(1);
        let mut rx = source.subscribe();
        source.play().outcome().await.unwrap();

        let mut events = Vec::new();
        loop {
            let event = rx.recv().await.unwrap();
            events.push(event);
            if event == AudioEvent::Ended {
                break;
            }
        }

        assert_eq!(events.len(), 5);
        assert_eq!(
            events[3],
            AudioEvent::TimeAdvanced {
                position: Duration::from_secs(1)
            }
        );
        assert_eq!(source.current_time(), Duration::from_secs(1));
        tokio::task::yield_now().await;
        assert!(!source.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_stops_clock() {
        let mut source = clock(10);
        let mut rx = source.subscribe();
        source.play().outcome().await.unwrap();
        rx.recv().await.unwrap();

        source.pause();
        let paused_at = source.current_time();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(source.current_time(), paused_at);
        assert!(!source.is_running());
    }

    #[tokio::test]
    async fn test_seek_emits_and_clamps() {
        let mut source = clock(10);
        let mut rx = source.subscribe();

        source.set_current_time(Duration::from_secs(4));
        assert_eq!(
            rx.recv().await.unwrap(),
            AudioEvent::TimeAdvanced {
                position: Duration::from_secs(4)
            }
        );

        source.set_current_time(Duration::from_secs(40));
        assert_eq!(source.current_time(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_activation_required() {
        let mut source = clock(10).with_activation_required(true);
        assert!(source.play().outcome().await.is_err());
        assert!(!source.is_running());

        let activation = source.user_activation();
        activation.grant();
        assert!(activation.is_granted());
        assert!(source.play().outcome().await.is_ok());
        assert!(source.is_running());
        source.pause();
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_after_end_restarts() {
        let mut source = clock(10);
        source.set_current_time(Duration::from_secs(10));
        let mut rx = source.subscribe();

        source.play().outcome().await.unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            AudioEvent::TimeAdvanced {
                position: Duration::from_millis(250)
            }
        );
        source.pause();
    }

    #[test]
    fn test_play_without_runtime_is_rejected() {
        let mut source = clock(10);
        let pending = source.play();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        assert!(runtime.block_on(pending.outcome()).is_err());
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut source = clock(10);
        source.set_volume(0.3);
        assert!((source.volume() - 0.3).abs() < f64::EPSILON);
        source.set_volume(4.0);
        assert!((source.volume() - 1.0).abs() < f64::EPSILON);
        source.set_volume(f64::NAN);
        assert!(source.volume().abs() < f64::EPSILON);
    }
}
