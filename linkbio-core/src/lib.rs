pub mod audio;
pub mod clock;
pub mod config;
pub mod controller;
pub mod cue;
pub mod document;
pub mod error;
pub mod paths;
pub mod playback;
pub mod sync;
pub mod time;
pub mod visit;

pub use audio::{AudioEvent, AudioSource, PendingPlay};
pub use clock::{ClockAudioSource, UserActivation, DEFAULT_TICK_INTERVAL};
pub use config::{LinkbioConfig, LoggingConfig, PlayerConfig, WelcomeConfig};
pub use controller::{
    PlayAttempt, PlayOutcome, PlayTicket, PlaybackController, RenderState, SeekOutcome,
    TickUpdate, ToggleOutcome, TransportIcon,
};
pub use cue::{Cue, CueTrack};
pub use document::{Link, MusicConfig, Profile, ProfileDocument, TimeSyncEntry};
pub use error::{CoreError, Result};
pub use paths::{config_dir, last_visit_path, log_file_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME};
pub use playback::{PlaybackState, PlaybackStatus};
pub use sync::{CueUpdate, LyricSync};
pub use time::DurationExt;
pub use visit::VisitTracker;
