use crate::error::{CoreError, Result};
use crate::paths::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use const_format::concatcp;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkbioConfig {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub welcome: WelcomeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Output volume in `[0, 1]`
    #[serde(default = "default_volume")]
    pub volume: f64,
    /// Time signal cadence while playing
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Try to start playback once the welcome notice is dismissed
    #[serde(default = "default_true")]
    pub autoplay: bool,
    /// Delay between dismissing the welcome notice and the autoplay attempt
    #[serde(default = "default_autoplay_delay")]
    pub autoplay_delay_ms: u64,
    /// Refuse playback until the first user command, like a browser autoplay policy
    #[serde(default)]
    pub require_activation: bool,
}

const fn default_volume() -> f64 {
    0.3
}

const DEFAULT_TICK_INTERVAL_MS: u64 = 250;

const fn default_tick_interval() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

const fn default_true() -> bool {
    true
}

const DEFAULT_AUTOPLAY_DELAY_MS: u64 = 300;

const fn default_autoplay_delay() -> u64 {
    DEFAULT_AUTOPLAY_DELAY_MS
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            tick_interval_ms: default_tick_interval(),
            autoplay: true,
            autoplay_delay_ms: default_autoplay_delay(),
            require_activation: false,
        }
    }
}

impl PlayerConfig {
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    #[must_use]
    pub const fn autoplay_delay(&self) -> Duration {
        Duration::from_millis(self.autoplay_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeConfig {
    /// Show the welcome notice again after this many seconds away
    #[serde(default = "default_revisit_after")]
    pub revisit_after_secs: u64,
}

const DEFAULT_REVISIT_AFTER_SECS: u64 = 3600;

const fn default_revisit_after() -> u64 {
    DEFAULT_REVISIT_AFTER_SECS
}

impl Default for WelcomeConfig {
    fn default() -> Self {
        Self {
            revisit_after_secs: default_revisit_after(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to a file in the cache directory
    #[serde(default)]
    pub enabled: bool,
}

impl LinkbioConfig {
    /// Get the settings file path (~/.config/linkbio/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load settings from the default path or create a template on first run
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] after writing the template, or an
    /// error if the file cannot be read, parsed or validated.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path())
    }

    /// Load settings from `config_path` or create a template there
    ///
    /// # Errors
    ///
    /// Same as [`Self::load_or_create`].
    pub fn load_or_create_at(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(config_path, CONFIG_TEMPLATE)?;

            return Err(CoreError::ConfigNotFound {
                path: config_path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(config_path)?;
        Self::parse(&content)
    }

    /// Parse and validate settings from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or a value is out of range.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigInvalid`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.player.volume) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "player.volume must be between 0 and 1, got {}",
                    self.player.volume
                ),
            });
        }
        if self.player.tick_interval_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "player.tick_interval_ms must be greater than 0".into(),
            });
        }
        Ok(())
    }
}

/// Template written on first run
pub const CONFIG_TEMPLATE: &str = concatcp!(
    "# Linkbio Configuration\n# ~/.config/",
    CONFIG_DIR_NAME,
    "/",
    CONFIG_FILE_NAME,
    r#"

[player]
# Output volume between 0 and 1
volume = 0.3
# How often the playback clock reports progress
tick_interval_ms = "#,
    DEFAULT_TICK_INTERVAL_MS,
    r#"
# Start playing when the welcome notice is dismissed
autoplay = true
autoplay_delay_ms = "#,
    DEFAULT_AUTOPLAY_DELAY_MS,
    r#"
# Refuse playback until the first command, like a browser autoplay policy
require_activation = false

[welcome]
# Show the welcome notice again after this many seconds away
revisit_after_secs = "#,
    DEFAULT_REVISIT_AFTER_SECS,
    r#"

[logging]
# Also write logs to a file
enabled = false
"#
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_to_defaults() {
        let config = LinkbioConfig::parse(CONFIG_TEMPLATE).unwrap();
        assert!((config.player.volume - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.player.tick_interval(), Duration::from_millis(250));
        assert!(config.player.autoplay);
        assert_eq!(config.player.autoplay_delay(), Duration::from_millis(300));
        assert!(!config.player.require_activation);
        assert_eq!(config.welcome.revisit_after_secs, 3600);
        assert!(!config.logging.enabled);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = LinkbioConfig::parse("").unwrap();
        assert_eq!(config.player.tick_interval_ms, 250);
        assert_eq!(config.welcome.revisit_after_secs, 3600);
    }

    #[test]
    fn test_partial_section() {
        let config = LinkbioConfig::parse("[player]\nautoplay = false\n").unwrap();
        assert!(!config.player.autoplay);
        assert!((config.player.volume - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_volume() {
        let result = LinkbioConfig::parse("[player]\nvolume = 1.5\n");
        assert!(matches!(result, Err(CoreError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_zero_tick_interval() {
        let result = LinkbioConfig::parse("[player]\ntick_interval_ms = 0\n");
        assert!(matches!(result, Err(CoreError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_syntax_error() {
        let result = LinkbioConfig::parse("[player\n");
        assert!(matches!(result, Err(CoreError::ConfigParseError(_))));
    }

    #[test]
    fn test_load_or_create_writes_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let first = LinkbioConfig::load_or_create_at(&path);
        assert!(matches!(first, Err(CoreError::ConfigNotFound { .. })));
        assert!(path.exists());

        let second = LinkbioConfig::load_or_create_at(&path).unwrap();
        assert!(second.player.autoplay);
    }
}
