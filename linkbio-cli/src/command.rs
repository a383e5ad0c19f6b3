use thiserror::Error;

/// A line of user input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Play or pause
    Toggle,
    /// Jump to a fraction of the track; clamped by the controller
    Seek(f64),
    /// Reprint the player
    Status,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (try p, s <percent>, i, q)")]
    Unknown(String),

    #[error("Seek needs a percentage, got {0:?}")]
    InvalidSeek(String),
}

impl Command {
    /// Parse one input line. An empty line toggles playback.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown commands or an unreadable seek percentage.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            return Ok(Self::Toggle);
        };

        match verb.to_lowercase().as_str() {
            "p" | "play" | "pause" | "toggle" => Ok(Self::Toggle),
            "s" | "seek" => {
                let arg = parts.next().unwrap_or_default();
                let percent = arg
                    .trim_end_matches('%')
                    .parse::<f64>()
                    .map_err(|_| CommandError::InvalidSeek(arg.to_string()))?;
                if percent.is_nan() {
                    return Err(CommandError::InvalidSeek(arg.to_string()));
                }
                Ok(Self::Seek(percent / 100.0))
            }
            "i" | "info" | "status" => Ok(Self::Status),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// What the render loop does with one input line
#[derive(Debug, PartialEq)]
pub enum LineAction {
    Quit,
    /// Close the welcome notice and nothing else
    CloseNotice,
    Run(Command),
    Report(CommandError),
}

/// Route a line of input. Quitting works even while the welcome notice is
/// open; any other input then only closes the notice.
pub fn route_line(line: &str, welcome_open: bool) -> LineAction {
    match Command::parse(line) {
        Ok(Command::Quit) => LineAction::Quit,
        _ if welcome_open => LineAction::CloseNotice,
        Ok(command) => LineAction::Run(command),
        Err(e) => LineAction::Report(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_aliases() {
        for input in ["", "   ", "p", "play", "PAUSE", "toggle"] {
            assert_eq!(Command::parse(input), Ok(Command::Toggle), "{input:?}");
        }
    }

    #[test]
    fn test_seek_percent() {
        assert_eq!(Command::parse("s 50"), Ok(Command::Seek(0.5)));
        assert_eq!(Command::parse("seek 25%"), Ok(Command::Seek(0.25)));
        // Out of range values are passed through for the controller to clamp
        assert_eq!(Command::parse("s 150"), Ok(Command::Seek(1.5)));
    }

    #[test]
    fn test_seek_errors() {
        assert_eq!(
            Command::parse("s"),
            Err(CommandError::InvalidSeek(String::new()))
        );
        assert_eq!(
            Command::parse("s half"),
            Err(CommandError::InvalidSeek("half".to_string()))
        );
        assert_eq!(
            Command::parse("s NaN"),
            Err(CommandError::InvalidSeek("NaN".to_string()))
        );
    }

    #[test]
    fn test_other_commands() {
        assert_eq!(Command::parse("i"), Ok(Command::Status));
        assert_eq!(Command::parse("quit"), Ok(Command::Quit));
        assert_eq!(
            Command::parse("dance"),
            Err(CommandError::Unknown("dance".to_string()))
        );
    }

    #[test]
    fn test_quit_while_notice_open() {
        assert_eq!(route_line("q", true), LineAction::Quit);
        assert_eq!(route_line("exit", true), LineAction::Quit);
    }

    #[test]
    fn test_other_input_closes_notice() {
        assert_eq!(route_line("", true), LineAction::CloseNotice);
        assert_eq!(route_line("s 50", true), LineAction::CloseNotice);
        assert_eq!(route_line("dance", true), LineAction::CloseNotice);
    }

    #[test]
    fn test_routing_after_notice() {
        assert_eq!(route_line("p", false), LineAction::Run(Command::Toggle));
        assert_eq!(
            route_line("dance", false),
            LineAction::Report(CommandError::Unknown("dance".to_string()))
        );
    }
}
