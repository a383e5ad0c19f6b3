use crate::document::TimeSyncEntry;
use crate::time::duration_from_secs_f64;
use std::time::Duration;
use tracing::warn;

const LOG_TARGET: &str = "linkbio::cue";

/// A single timestamped lyric line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// When this cue becomes current, measured from track start
    pub time: Duration,
    /// Raw lyric text, may contain line breaks
    pub text: String,
}

impl Cue {
    #[must_use]
    pub fn new(time: Duration, text: impl Into<String>) -> Self {
        Self {
            time,
            text: text.into(),
        }
    }

    /// Split the text into display lines.
    ///
    /// Both `\n` and `\r\n` separate lines.
    pub fn display_lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }
}

/// The full ordered set of cues for one song.
///
/// Cues are expected in ascending time order. The order is not enforced:
/// an unsorted track still selects some cue or none, it just may not be
/// the one a listener expects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueTrack {
    cues: Vec<Cue>,
}

impl CueTrack {
    /// Create a track from cues, keeping their order as given
    #[must_use]
    pub fn new(cues: Vec<Cue>) -> Self {
        let track = Self { cues };
        if !track.is_sorted() {
            warn!(
                target: LOG_TARGET,
                "Cue track with {} cues is not sorted by time; lyric selection may be off",
                track.len()
            );
        }
        track
    }

    /// Build a track from the profile document's `timeSync` entries
    #[must_use]
    pub fn from_entries(entries: &[TimeSyncEntry]) -> Self {
        Self::new(
            entries
                .iter()
                .map(|entry| Cue::new(duration_from_secs_f64(entry.time), entry.text.clone()))
                .collect(),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Cue> {
        self.cues.get(index)
    }

    /// The cue shown before playback starts
    #[must_use]
    pub fn first(&self) -> Option<&Cue> {
        self.cues.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cue> {
        self.cues.iter()
    }

    /// Check whether cue times are non-decreasing
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.cues.windows(2).all(|pair| pair[0].time <= pair[1].time)
    }
}

impl<'a> IntoIterator for &'a CueTrack {
    type Item = &'a Cue;
    type IntoIter = std::slice::Iter<'a, Cue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
