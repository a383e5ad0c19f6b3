//! Time and duration conversion utilities.
//!
//! Cue times and durations arrive from the profile document as real seconds.
//! Everything past the document boundary works in [`Duration`], so the
//! conversions here never panic on negative, NaN or infinite input.

use std::time::Duration;

/// Extension trait for safe Duration conversions.
pub trait DurationExt {
    /// Convert duration to milliseconds as u64, saturating at `u64::MAX`.
    fn as_millis_u64(&self) -> u64;

    /// Convert duration to whole seconds as u32, saturating at `u32::MAX`.
    ///
    /// `u32::MAX` seconds is approximately 136 years, far beyond any track.
    fn as_secs_u32(&self) -> u32;

    /// Format as a `m:ss` clock, the way the player shows elapsed and total time.
    fn format_clock(&self) -> String;
}

impl DurationExt for Duration {
    fn as_millis_u64(&self) -> u64 {
        u64::try_from(self.as_millis()).unwrap_or(u64::MAX)
    }

    fn as_secs_u32(&self) -> u32 {
        u32::try_from(self.as_secs()).unwrap_or(u32::MAX)
    }

    fn format_clock(&self) -> String {
        let secs = self.as_secs();
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

/// Convert real seconds into a [`Duration`].
///
/// Negative and NaN inputs become zero; values too large to represent
/// (including `+inf`) saturate at [`Duration::MAX`].
#[must_use]
pub fn duration_from_secs_f64(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Convert real seconds into a strictly positive [`Duration`].
///
/// Returns `None` for zero, negative or NaN inputs, which the player treats
/// as "duration unknown".
#[must_use]
pub fn positive_duration_from_secs_f64(secs: f64) -> Option<Duration> {
    let duration = duration_from_secs_f64(secs);
    (!duration.is_zero()).then_some(duration)
}
