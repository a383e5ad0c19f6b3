mod command;
mod render;

use crate::command::{route_line, Command, LineAction};
use chrono::{Datelike, Local, Utc};
use clap::Parser;
use linkbio_core::document::DEFAULT_DISPLAY_DURATION;
use linkbio_core::{
    last_visit_path, log_file_path, AudioEvent, AudioSource, ClockAudioSource, CoreError,
    LinkbioConfig, PlayAttempt, PlayOutcome, PlayTicket, PlaybackController, ProfileDocument,
    SeekOutcome, TickUpdate, ToggleOutcome, UserActivation, VisitTracker,
};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_TARGET: &str = "linkbio::cli";

/// Link-in-bio profile card with a synchronized lyrics player
#[derive(Debug, Parser)]
#[command(name = "linkbio", version, about)]
struct Args {
    /// Profile document to display
    #[arg(short, long, default_value = "data.json")]
    document: PathBuf,

    /// Never start playback on its own
    #[arg(long)]
    no_autoplay: bool,

    /// Refuse playback until the first command, like a browser autoplay policy
    #[arg(long)]
    require_activation: bool,
}

type PlayResult = (PlayTicket, linkbio_core::Result<()>);

fn main() {
    let args = Args::parse();

    // Settings are read before tracing starts so the file layer can be configured
    let config_result = LinkbioConfig::load_or_create();
    let file_logging_enabled = config_result
        .as_ref()
        .is_ok_and(|c| c.logging.enabled);
    init_tracing(file_logging_enabled);

    let config = match config_result {
        Ok(config) => config,
        Err(CoreError::ConfigNotFound { path }) => {
            info!(
                target: LOG_TARGET,
                "Created settings template at {}; using defaults",
                path.display()
            );
            LinkbioConfig::default()
        }
        Err(e) => {
            warn!(target: LOG_TARGET, "{e}; using default settings");
            LinkbioConfig::default()
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(target: LOG_TARGET, "Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(args, config)) {
        error!(target: LOG_TARGET, "{e}");
        std::process::exit(1);
    }
}

async fn run(args: Args, config: LinkbioConfig) -> linkbio_core::Result<()> {
    let document = ProfileDocument::load_or_fallback(&args.document);
    println!("{}", render::profile_card(&document, Local::now().year()));
    println!("{}\n", render::track_header(&document.music));

    let (source, activation) = build_source(&document, &config, &args);
    let mut controller = PlaybackController::new(&document.music, source);
    controller.set_volume(config.player.volume);
    print_player(&controller);

    let tracker = VisitTracker::new(last_visit_path(), config.welcome.revisit_after_secs);
    let mut welcome_open = tracker.check_and_record(Utc::now()).unwrap_or_else(|e| {
        warn!(target: LOG_TARGET, "Could not record visit: {e}");
        false
    });
    if welcome_open {
        println!("\n{}\n", render::welcome_notice(&document.profile.name));
    }
    let autoplay_enabled = config.player.autoplay && !args.no_autoplay;

    let cancel_token = install_ctrlc_handler();
    let mut events = controller.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut autoplay_at: Option<Instant> = None;
    let mut pending_play: Option<JoinHandle<PlayResult>> = None;

    loop {
        let autoplay_deadline = autoplay_at.unwrap_or_else(far_future);

        tokio::select! {
            () = cancel_token.cancelled() => break,

            event = next_event(&mut events) => match event {
                Ok(event) => on_audio_event(&mut controller, event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    info!(target: LOG_TARGET, "Missed {n} audio events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!(target: LOG_TARGET, "Audio event channel closed");
                    events = None;
                }
            },

            () = tokio::time::sleep_until(autoplay_deadline), if autoplay_at.is_some() => {
                autoplay_at = None;
                if let Some(attempt) = controller.autoplay_attempt() {
                    await_play(&mut pending_play, attempt);
                }
            }

            Some(result) = join_play(&mut pending_play) => {
                let (ticket, outcome) = result;
                if controller.resolve_play(ticket, outcome) != PlayOutcome::Superseded {
                    print_player(&controller);
                }
            }

            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!(target: LOG_TARGET, "Input closed");
                    break;
                };

                match route_line(&line, welcome_open) {
                    LineAction::Quit => break,
                    LineAction::CloseNotice => {
                        welcome_open = false;
                        println!("Notice closed.");
                        if autoplay_enabled {
                            autoplay_at = Some(Instant::now() + config.player.autoplay_delay());
                        }
                    }
                    LineAction::Run(command) => {
                        if let Some(activation) = &activation {
                            activation.grant();
                        }
                        apply_command(&mut controller, command);
                        if let Some(attempt) = controller.take_pending_play() {
                            await_play(&mut pending_play, attempt);
                        }
                    }
                    LineAction::Report(e) => println!("{e}"),
                }
            }
        }
    }

    if let Some(handle) = pending_play.take() {
        handle.abort();
    }
    controller.replace_source(None);
    info!(target: LOG_TARGET, "Goodbye");
    Ok(())
}

/// Create the clock source when the document configures audio
fn build_source(
    document: &ProfileDocument,
    config: &LinkbioConfig,
    args: &Args,
) -> (Option<Box<dyn AudioSource>>, Option<UserActivation>) {
    let Some(audio_file) = document.music.audio_file() else {
        info!(target: LOG_TARGET, "No audio file configured; player disabled");
        return (None, None);
    };

    let duration = document
        .music
        .fallback_duration()
        .unwrap_or(DEFAULT_DISPLAY_DURATION);
    let mut clock = ClockAudioSource::new(duration, config.player.tick_interval())
        .with_activation_required(config.player.require_activation || args.require_activation);
    clock.load();
    info!(
        target: LOG_TARGET,
        "Playing {audio_file} on a {:?} clock", duration
    );

    let activation = clock.user_activation();
    (Some(Box::new(clock)), Some(activation))
}

/// Shared cancellation token for Ctrl+C
fn install_ctrlc_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();
    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!(target: LOG_TARGET, "Received Ctrl+C, shutting down...");
        ctrlc_token.cancel();
    }) {
        error!(target: LOG_TARGET, "Failed to set Ctrl+C handler: {e}");
    }
    cancel_token
}

fn on_audio_event(controller: &mut PlaybackController, event: AudioEvent) {
    if let Some(update) = controller.handle_event(event) {
        print_tick(&update);
    }
    if event == AudioEvent::Ended {
        print_player(controller);
    }
}

fn apply_command(controller: &mut PlaybackController, command: Command) {
    match command {
        Command::Toggle => match controller.toggle() {
            ToggleOutcome::Unavailable => println!("Audio is not configured for this profile."),
            ToggleOutcome::Refused => println!("Playback was refused."),
            ToggleOutcome::Playing | ToggleOutcome::Paused => print_player(controller),
        },
        Command::Seek(ratio) => match controller.seek_to_ratio(ratio) {
            SeekOutcome::Seeked { .. } => {}
            SeekOutcome::Ignored => println!("Seeking is not available."),
        },
        Command::Status => print_player(controller),
        Command::Quit => {}
    }
}

fn print_player(controller: &PlaybackController) {
    let state = controller.render_state();
    println!("{}", render::status_line(&state));
    if let Some(cue) = &state.lyric {
        println!("{}", render::lyric_block(cue));
    }
}

fn print_tick(update: &TickUpdate) {
    if !update.cue.changed {
        return;
    }
    match &update.cue.cue {
        Some(cue) => println!("{}", render::lyric_block(cue)),
        None => println!("    ..."),
    }
}

async fn next_event(
    events: &mut Option<broadcast::Receiver<AudioEvent>>,
) -> Result<AudioEvent, broadcast::error::RecvError> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Wait for `attempt` in the background; an older request is dropped, its
/// ticket is stale by now
fn await_play(pending: &mut Option<JoinHandle<PlayResult>>, attempt: PlayAttempt) {
    if let Some(previous) = pending.replace(tokio::spawn(attempt.outcome())) {
        previous.abort();
    }
}

async fn join_play(pending: &mut Option<JoinHandle<PlayResult>>) -> Option<PlayResult> {
    let handle = pending.as_mut()?;
    let result = handle.await.ok();
    *pending = None;
    result
}

fn far_future() -> Instant {
    Instant::now() + std::time::Duration::from_secs(86_400 * 365)
}

/// Initialize tracing with stderr output and optional file logging
fn init_tracing(file_logging_enabled: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if file_logging_enabled {
        let log_path = log_file_path();

        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match File::create(&log_path) {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .with(file_layer)
                    .init();

                return;
            }
            Err(e) => {
                eprintln!("Failed to create log file at {}: {e}", log_path.display());
            }
        }
    }

    // Fallback: stderr only
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
