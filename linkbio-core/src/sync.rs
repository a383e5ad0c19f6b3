use crate::cue::{Cue, CueTrack};
use std::time::Duration;
use tracing::debug;

const LOG_TARGET: &str = "linkbio::sync";

/// Result of feeding a playback time into [`LyricSync`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueUpdate {
    /// Whether the active cue differs from the previous evaluation
    pub changed: bool,
    /// Cue at the new active index, `None` before the first cue
    pub cue: Option<Cue>,
}

impl CueUpdate {
    const fn unchanged(cue: Option<Cue>) -> Self {
        Self {
            changed: false,
            cue,
        }
    }
}

/// Maps a playback time to the current lyric cue.
///
/// The active index is always the greatest index whose cue time is less than
/// or equal to the last processed time, so equal timestamps resolve to the
/// later cue. Time is not assumed to be monotonic: a backward seek moves the
/// index down, including back to "no cue yet".
#[derive(Debug, Clone, Default)]
pub struct LyricSync {
    track: CueTrack,
    active_index: Option<usize>,
}

impl LyricSync {
    #[must_use]
    pub const fn new(track: CueTrack) -> Self {
        Self {
            track,
            active_index: None,
        }
    }

    /// Replace the cue track and forget the active cue
    pub fn load_track(&mut self, track: CueTrack) {
        debug!(target: LOG_TARGET, "Loaded cue track with {} cues", track.len());
        self.track = track;
        self.reset();
    }

    /// Forget the active cue
    pub fn reset(&mut self) {
        self.active_index = None;
    }

    #[must_use]
    pub const fn track(&self) -> &CueTrack {
        &self.track
    }

    /// Index of the cue currently shown, `None` before the first cue
    #[must_use]
    pub const fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    #[must_use]
    pub fn active_cue(&self) -> Option<&Cue> {
        self.active_index.and_then(|i| self.track.get(i))
    }

    /// Evaluate the track at `current_time`.
    ///
    /// Recomputes from the start of the track on every call, which handles
    /// seeks in either direction. Tracks hold tens of cues, so the linear
    /// scan is cheap enough for every time signal tick.
    pub fn advance(&mut self, current_time: Duration) -> CueUpdate {
        if self.track.is_empty() {
            return CueUpdate::default();
        }

        let new_index = self.index_at(current_time);
        if new_index == self.active_index {
            return CueUpdate::unchanged(self.active_cue().cloned());
        }

        debug!(
            target: LOG_TARGET,
            "Active cue {:?} -> {:?} at {:?}", self.active_index, new_index, current_time
        );
        self.active_index = new_index;

        CueUpdate {
            changed: true,
            cue: self.active_cue().cloned(),
        }
    }

    /// Greatest index whose cue time is at or before `time`
    fn index_at(&self, time: Duration) -> Option<usize> {
        let mut found = None;
        for (i, cue) in self.track.iter().enumerate() {
            if cue.time <= time {
                found = Some(i);
            } else {
                break;
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(cues: &[(u64, &str)]) -> CueTrack {
        CueTrack::new(
            cues.iter()
                .map(|(secs, text)| Cue::new(Duration::from_secs(*secs), *text))
                .collect(),
        )
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_selects_greatest_qualifying_index() {
        let mut sync = LyricSync::new(track(&[(0, "a"), (10, "b"), (20, "c"), (30, "d")]));

        let cases = [(0, Some(0)), (9, Some(0)), (10, Some(1)), (25, Some(2)), (300, Some(3))];
        for (time, expected) in cases {
            sync.advance(secs(time));
            assert_eq!(sync.active_index(), expected, "at {time}s");
        }
    }

    #[test]
    fn test_no_cue_before_first_timestamp() {
        let mut sync = LyricSync::new(track(&[(5, "a"), (10, "b")]));
        let update = sync.advance(secs(2));
        assert!(!update.changed);
        assert!(update.cue.is_none());
        assert_eq!(sync.active_index(), None);
    }

    #[test]
    fn test_same_time_twice_reports_no_change() {
        let mut sync = LyricSync::new(track(&[(0, "a"), (10, "b")]));

        let first = sync.advance(secs(12));
        assert!(first.changed);
        assert_eq!(first.cue.unwrap().text, "b");

        let second = sync.advance(secs(12));
        assert!(!second.changed);
        assert_eq!(second.cue.unwrap().text, "b");
    }

    #[test]
    fn test_backward_seek_lowers_index() {
        let mut sync = LyricSync::new(track(&[(0, "a"), (10, "b"), (20, "c"), (30, "d")]));

        sync.advance(secs(50));
        assert_eq!(sync.active_index(), Some(3));

        let update = sync.advance(secs(5));
        assert!(update.changed);
        assert_eq!(sync.active_index(), Some(0));
        assert_eq!(update.cue.unwrap().text, "a");
    }

    #[test]
    fn test_backward_seek_before_first_cue() {
        let mut sync = LyricSync::new(track(&[(10, "a"), (20, "b")]));

        sync.advance(secs(15));
        let update = sync.advance(secs(1));
        assert!(update.changed);
        assert!(update.cue.is_none());
        assert_eq!(sync.active_index(), None);
    }

    #[test]
    fn test_duplicate_timestamps_last_wins() {
        let mut sync = LyricSync::new(track(&[(0, "a"), (5, "b"), (5, "c")]));
        let update = sync.advance(secs(5));
        assert!(update.changed);
        assert_eq!(update.cue.unwrap().text, "c");
        assert_eq!(sync.active_index(), Some(2));
    }

    #[test]
    fn test_empty_track_never_changes() {
        let mut sync = LyricSync::default();
        for time in [0, 5, 1000, 0] {
            assert_eq!(sync.advance(secs(time)), CueUpdate::default());
        }
        assert_eq!(sync.active_index(), None);
    }

    #[test]
    fn test_unsorted_track_does_not_panic() {
        let mut sync = LyricSync::new(track(&[(30, "late"), (0, "early"), (10, "mid")]));
        for time in [0, 5, 15, 40, 2] {
            let update = sync.advance(secs(time));
            if let Some(index) = sync.active_index() {
                assert!(index < sync.track().len());
                assert!(update.cue.is_some());
            }
        }
    }

    #[test]
    fn test_reset_forgets_active_cue() {
        let mut sync = LyricSync::new(track(&[(0, "a"), (10, "b")]));
        sync.advance(secs(11));
        sync.reset();
        assert_eq!(sync.active_index(), None);

        // Re-evaluating the same time after reset is a change again
        assert!(sync.advance(secs(11)).changed);
    }

    #[test]
    fn test_load_track_resets() {
        let mut sync = LyricSync::new(track(&[(0, "a")]));
        sync.advance(secs(1));
        sync.load_track(track(&[(0, "x"), (2, "y")]));
        assert_eq!(sync.active_index(), None);

        let update = sync.advance(secs(1));
        assert!(update.changed);
        assert_eq!(update.cue.unwrap().text, "x");
    }

    #[test]
    fn test_cue_text_is_returned_raw() {
        let mut sync = LyricSync::new(track(&[(0, "line one\nline two")]));
        let update = sync.advance(secs(0));
        assert_eq!(update.cue.unwrap().text, "line one\nline two");
    }
}
