use std::fmt;
use std::time::Duration;

/// Transport state of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// No usable audio source is configured
    #[default]
    Idle,
    Playing,
    Paused,
    /// The source reached the end of the track
    Ended,
}

impl PlaybackStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current playback state of the audio source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    /// Last time reported by the source
    pub current_time: Duration,
    /// Total track duration, `None` until known
    pub duration: Option<Duration>,
    /// Whether a usable audio source is configured
    pub has_source: bool,
}

impl PlaybackState {
    /// Initial state: `Paused` with a usable source, otherwise `Idle`
    #[must_use]
    pub fn new(has_source: bool, duration: Option<Duration>) -> Self {
        Self {
            status: if has_source {
                PlaybackStatus::Paused
            } else {
                PlaybackStatus::Idle
            },
            current_time: Duration::ZERO,
            duration: duration.filter(|d| !d.is_zero()),
            has_source,
        }
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        matches!(self.status, PlaybackStatus::Playing)
    }

    /// Fraction of the duration elapsed, clamped to `[0, 1]`.
    ///
    /// Zero while the duration is unknown.
    #[must_use]
    pub fn progress_ratio(&self) -> f64 {
        match self.duration {
            Some(duration) if !duration.is_zero() => {
                (self.current_time.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}
