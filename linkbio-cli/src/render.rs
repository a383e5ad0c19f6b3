//! Plain-text rendering of the profile card and the player.

use linkbio_core::{Cue, DurationExt, MusicConfig, ProfileDocument, RenderState, TransportIcon};
use std::fmt::Write;

const PROGRESS_WIDTH: u32 = 24;

/// Profile header, links and footer
pub fn profile_card(document: &ProfileDocument, year: i32) -> String {
    let mut out = String::new();
    let profile = &document.profile;

    let _ = writeln!(out, "{}", profile.name);
    if !profile.bio.is_empty() {
        let _ = writeln!(out, "{}", profile.bio);
    }
    if !profile.image.is_empty() {
        let _ = writeln!(out, "[photo] {}", profile.image);
    }
    out.push('\n');

    for link in &document.links {
        if link.icon.is_empty() {
            let _ = writeln!(out, "  -> {}  {}", link.title, link.url);
        } else {
            let _ = writeln!(out, "  -> {} ({})  {}", link.title, link.icon, link.url);
        }
    }
    if !document.links.is_empty() {
        out.push('\n');
    }

    let _ = writeln!(out, "(c) {year} {}", profile.name);
    out
}

/// Song title, artist and album art
pub fn track_header(music: &MusicConfig) -> String {
    let mut out = format!("{} - {}\n[art] {}", music.title, music.artist, music.album_art());
    if music.uses_fallback_album_art() {
        out.push_str(" (placeholder)");
    }
    if music.audio_file().is_none() {
        out.push_str("\n(audio not configured)");
    }
    out
}

/// Progress bar filled to `ratio`
pub fn progress_bar(ratio: f64) -> String {
    let filled = ratio.clamp(0.0, 1.0) * f64::from(PROGRESS_WIDTH);
    (0..PROGRESS_WIDTH)
        .map(|i| if f64::from(i) + 0.5 < filled { '#' } else { '-' })
        .collect()
}

/// One-line transport status
pub fn status_line(state: &RenderState) -> String {
    let icon = match state.icon {
        TransportIcon::Play => "|>",
        TransportIcon::Pause => "||",
    };
    let mut out = format!(
        "{icon} {} [{}] {}",
        state.elapsed.format_clock(),
        progress_bar(state.progress_ratio),
        state.total.format_clock()
    );
    if !state.transport_enabled {
        out.push_str("  (disabled)");
    } else if state.album_art_spinning {
        out.push_str("  ~");
    }
    out
}

/// Cue text with each line indented
pub fn lyric_block(cue: &Cue) -> String {
    cue.display_lines()
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Notice shown on a first visit
pub fn welcome_notice(name: &str) -> String {
    format!(
        "Welcome to {name}'s page!\n\
        Press Enter to close this notice. Commands: p (play/pause), s <percent>, i, q"
    )
}
