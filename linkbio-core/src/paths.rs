//! Path constants for settings, visit and log files.

use std::path::PathBuf;

/// The name of the configuration directory under ~/.config/
pub const CONFIG_DIR_NAME: &str = "linkbio";

/// The name of the settings file
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// The name of the last-visit file (prefixed with . for hidden)
pub const LAST_VISIT_FILE_NAME: &str = ".last_visit.json";

/// The name of the log file
pub const LOG_FILE_NAME: &str = "linkbio.log";

/// Get the configuration directory path (~/.config/linkbio/)
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(CONFIG_DIR_NAME)
}

/// Get the settings file path (~/.config/linkbio/config.toml)
#[must_use]
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Get the last-visit file path (`~/.config/linkbio/.last_visit.json`)
#[must_use]
pub fn last_visit_path() -> PathBuf {
    config_dir().join(LAST_VISIT_FILE_NAME)
}

/// Get the log file path (`<cache dir>/linkbio/linkbio.log`)
#[must_use]
pub fn log_file_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(config_dir)
        .join(CONFIG_DIR_NAME)
        .join(LOG_FILE_NAME)
}
