//! Path constants for configuration and log files.

use std::path::PathBuf;

/// The name of the configuration directory under ~/.config/
pub const CONFIG_DIR_NAME: &str = "lyricmux";

/// The name of the main configuration file
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// The name of the log file written when file logging is enabled
pub const LOG_FILE_NAME: &str = "lyricmux.log";

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "LYRICMUX_CONFIG";

/// Get the configuration directory path (~/.config/lyricmux/)
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(CONFIG_DIR_NAME)
}

/// Get the config file path (`$LYRICMUX_CONFIG`, else ~/.config/lyricmux/config.toml)
#[must_use]
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .filter(|path| !path.is_empty())
        .map_or_else(|| config_dir().join(CONFIG_FILE_NAME), PathBuf::from)
}

/// Get the log file path (~/.config/lyricmux/lyricmux.log)
#[must_use]
pub fn log_file_path() -> PathBuf {
    config_dir().join(LOG_FILE_NAME)
}
