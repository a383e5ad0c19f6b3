//! Profile document: the JSON file that drives the whole page.

use crate::cue::CueTrack;
use crate::error::Result;
use crate::time::positive_duration_from_secs_f64;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

const LOG_TARGET: &str = "linkbio::document";

/// Placeholder shipped in the template document for the audio file
pub const AUDIO_FILE_SENTINEL: &str = "YOUR_AUDIO_FILE_URL.mp3";

/// Placeholder shipped in the template document for the album art
pub const ALBUM_ART_SENTINEL: &str = "YOUR_ALBUM_ART_URL_HERE";

/// Album art shown when the document does not provide one
pub const FALLBACK_ALBUM_ART: &str =
    "https://images.unsplash.com/photo-1511379938547-c1f69419868d?w=300&h=300&fit=crop";

/// Duration displayed when neither the source nor the document know it
pub const DEFAULT_DISPLAY_DURATION: Duration = Duration::from_secs(180);

/// Whole profile document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDocument {
    pub profile: Profile,
    #[serde(default)]
    pub links: Vec<Link>,
    pub music: MusicConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub image: String,
}

/// An external link on the profile card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub title: String,
    pub url: String,
    /// Icon class name, e.g. `fab fa-github`
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicConfig {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album_art: String,
    /// Fallback duration in seconds, used until the source reports metadata
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub audio_file: Option<String>,
    #[serde(default)]
    pub time_sync: Vec<TimeSyncEntry>,
}

/// A raw cue as written in the document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSyncEntry {
    /// Seconds from track start
    pub time: f64,
    pub text: String,
}

/// Treat empty strings and template placeholders as "not configured"
fn configured<'a>(value: &'a str, sentinel: &str) -> Option<&'a str> {
    let value = value.trim();
    (!value.is_empty() && value != sentinel).then_some(value)
}

impl MusicConfig {
    /// Audio file URL, `None` when playback is disabled
    #[must_use]
    pub fn audio_file(&self) -> Option<&str> {
        self.audio_file
            .as_deref()
            .and_then(|file| configured(file, AUDIO_FILE_SENTINEL))
    }

    /// Album art URL, falling back to a stock image
    #[must_use]
    pub fn album_art(&self) -> &str {
        configured(&self.album_art, ALBUM_ART_SENTINEL).unwrap_or(FALLBACK_ALBUM_ART)
    }

    /// Whether the album art is the stock fallback image
    #[must_use]
    pub fn uses_fallback_album_art(&self) -> bool {
        configured(&self.album_art, ALBUM_ART_SENTINEL).is_none()
    }

    /// Fallback duration from the document, `None` if absent or non-positive
    #[must_use]
    pub fn fallback_duration(&self) -> Option<Duration> {
        self.duration.and_then(positive_duration_from_secs_f64)
    }

    /// Build the cue track from `timeSync`
    #[must_use]
    pub fn cue_track(&self) -> CueTrack {
        CueTrack::from_entries(&self.time_sync)
    }
}

impl ProfileDocument {
    /// Parse a document from JSON text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid profile document.
    pub fn parse(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a document from disk
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let document = Self::parse(&content)?;
        info!(
            target: LOG_TARGET,
            "Loaded profile document from {} ({} links, {} cues)",
            path.display(),
            document.links.len(),
            document.music.time_sync.len()
        );
        Ok(document)
    }

    /// Load a document, substituting the built-in fallback on any error
    #[must_use]
    pub fn load_or_fallback(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            error!(
                target: LOG_TARGET,
                "Error loading profile document {}: {e}",
                path.display()
            );
            Self::fallback()
        })
    }

    /// Document shown when the real one cannot be loaded
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            profile: Profile {
                name: "Your Name".to_string(),
                bio: "Digital creator & content curator.".to_string(),
                image: "https://files.catbox.moe/3sqivl.png".to_string(),
            },
            links: Vec::new(),
            music: MusicConfig {
                title: "LoFi Dreams".to_string(),
                artist: "Chillhop".to_string(),
                album_art: String::new(),
                duration: Some(DEFAULT_DISPLAY_DURATION.as_secs_f64()),
                audio_file: None,
                time_sync: Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "profile": { "name": "Ada", "bio": "Writes code", "image": "https://example.com/ada.png" },
        "links": [
            { "title": "GitHub", "url": "https://github.com/ada", "icon": "fab fa-github" }
        ],
        "music": {
            "title": "Night Drive",
            "artist": "Synth Collective",
            "albumArt": "https://example.com/cover.jpg",
            "duration": 201.5,
            "audioFile": "https://example.com/song.mp3",
            "timeSync": [
                { "time": 0, "text": "Intro" },
                { "time": 12.5, "text": "First line\nsecond half" }
            ]
        }
    }"#;

    #[test]
    fn test_parse_sample() {
        let doc = ProfileDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.profile.name, "Ada");
        assert_eq!(doc.links.len(), 1);
        assert_eq!(doc.links[0].icon, "fab fa-github");
        assert_eq!(doc.music.audio_file(), Some("https://example.com/song.mp3"));
        assert_eq!(doc.music.album_art(), "https://example.com/cover.jpg");
        assert_eq!(
            doc.music.fallback_duration(),
            Some(Duration::from_millis(201_500))
        );

        let track = doc.music.cue_track();
        assert_eq!(track.len(), 2);
        assert_eq!(track.get(1).unwrap().text, "First line\nsecond half");
    }

    #[test]
    fn test_sentinels_disable_features() {
        let music: MusicConfig = serde_json::from_str(
            r#"{
                "title": "t", "artist": "a",
                "albumArt": "YOUR_ALBUM_ART_URL_HERE",
                "audioFile": "YOUR_AUDIO_FILE_URL.mp3"
            }"#,
        )
        .unwrap();

        assert!(music.audio_file().is_none());
        assert!(music.uses_fallback_album_art());
        assert_eq!(music.album_art(), FALLBACK_ALBUM_ART);
    }

    #[test]
    fn test_missing_optional_fields() {
        let music: MusicConfig = serde_json::from_str(r#"{ "title": "t", "artist": "a" }"#).unwrap();
        assert!(music.audio_file().is_none());
        assert!(music.fallback_duration().is_none());
        assert!(music.cue_track().is_empty());
    }

    #[test]
    fn test_empty_audio_file_is_disabled() {
        let music: MusicConfig =
            serde_json::from_str(r#"{ "title": "t", "artist": "a", "audioFile": "  " }"#).unwrap();
        assert!(music.audio_file().is_none());
    }

    #[test]
    fn test_non_positive_duration_is_unknown() {
        let music: MusicConfig =
            serde_json::from_str(r#"{ "title": "t", "artist": "a", "duration": 0 }"#).unwrap();
        assert!(music.fallback_duration().is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let doc = ProfileDocument::load(file.path()).unwrap();
        assert_eq!(doc.music.title, "Night Drive");
    }

    #[test]
    fn test_load_or_fallback_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let doc = ProfileDocument::load_or_fallback(&dir.path().join("missing.json"));
        assert_eq!(doc.profile.name, "Your Name");
        assert!(doc.links.is_empty());
        assert_eq!(doc.music.title, "LoFi Dreams");
        assert_eq!(doc.music.fallback_duration(), Some(DEFAULT_DISPLAY_DURATION));
        assert!(doc.music.audio_file().is_none());
    }

    #[test]
    fn test_load_or_fallback_on_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let doc = ProfileDocument::load_or_fallback(file.path());
        assert_eq!(doc.music.artist, "Chillhop");
    }
}
