use crate::backend::BackendId;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LyricmuxConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backends: BackendsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    10492
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Address string suitable for binding a listener
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendsConfig {
    /// Backends to query; order is the ranking tie-break order
    #[serde(default = "default_enabled_backends")]
    pub enabled: Vec<BackendId>,
    /// Search hits per backend that go on to lyric retrieval
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Upper bound on concurrent lyric fetches per request (default: one per candidate)
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

fn default_enabled_backends() -> Vec<BackendId> {
    BackendId::ALL.to_vec()
}

const fn default_candidate_limit() -> usize {
    3
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_connect_timeout_secs() -> u64 {
    5
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled_backends(),
            candidate_limit: default_candidate_limit(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_concurrency: None,
        }
    }
}

impl BackendsConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to ~/.config/lyricmux/lyricmux.log
    #[serde(default)]
    pub enabled: bool,
}

impl LyricmuxConfig {
    /// Get the config file path
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from the default location, writing a template on first run.
    ///
    /// A missing file is not an error: the template is written and defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read, parsed, or holds invalid values.
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path();
        match Self::load(&config_path) {
            Err(CoreError::ConfigNotFound { path }) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, CONFIG_TEMPLATE)?;
                info!("Wrote config template to {}", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Load config from a specific file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] if the file does not exist, or an error
    /// if it cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or holds invalid values.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigInvalid`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| -> Result<()> {
            Err(CoreError::ConfigInvalid {
                message: message.to_string(),
            })
        };

        if self.server.port == 0 {
            return invalid("server.port must be non-zero");
        }
        if self.backends.enabled.is_empty() {
            return invalid("backends.enabled must list at least one backend");
        }
        if self.backends.candidate_limit == 0 {
            return invalid("backends.candidate_limit must be at least 1");
        }
        if self.backends.timeout_secs == 0 {
            return invalid("backends.timeout_secs must be at least 1");
        }
        if self.backends.max_concurrency == Some(0) {
            return invalid("backends.max_concurrency must be at least 1");
        }
        Ok(())
    }
}

const CONFIG_TEMPLATE: &str = r#"# Lyricmux Configuration
# ~/.config/lyricmux/config.toml (override with LYRICMUX_CONFIG)

[server]
host = "0.0.0.0"
port = 10492

[backends]
# Catalogs to search: "netease", "qqmusic", "kugou"
# Equally relevant results are ranked in this order
enabled = ["netease", "qqmusic", "kugou"]
# Search hits per backend that go on to lyric retrieval
candidate_limit = 3
# Per-request timeouts in seconds
timeout_secs = 10
connect_timeout_secs = 5
# Optional cap on concurrent lyric fetches (default: one per candidate)
# max_concurrency = 9

[logging]
# Also write logs to ~/.config/lyricmux/lyricmux.log
enabled = false
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_to_defaults() {
        let config = LyricmuxConfig::parse(CONFIG_TEMPLATE).expect("template is valid");
        assert_eq!(config.server.port, 10492);
        assert_eq!(config.server.bind_address(), "0.0.0.0:10492");
        assert_eq!(config.backends.enabled, BackendId::ALL.to_vec());
        assert_eq!(config.backends.candidate_limit, 3);
        assert_eq!(config.backends.timeout(), Duration::from_secs(10));
        assert_eq!(config.backends.max_concurrency, None);
        assert!(!config.logging.enabled);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LyricmuxConfig::parse("").expect("empty config is valid");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.backends.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_custom_backend_order() {
        let config = LyricmuxConfig::parse(
            r#"
[backends]
enabled = ["kugou", "netease"]
"#,
        )
        .expect("valid config");
        assert_eq!(
            config.backends.enabled,
            vec![BackendId::Kugou, BackendId::Netease]
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        for content in [
            "[server]\nport = 0",
            "[backends]\nenabled = []",
            "[backends]\ncandidate_limit = 0",
            "[backends]\ntimeout_secs = 0",
            "[backends]\nmax_concurrency = 0",
        ] {
            let result = LyricmuxConfig::parse(content);
            assert!(
                matches!(result, Err(CoreError::ConfigInvalid { .. })),
                "expected ConfigInvalid for {content:?}"
            );
        }
    }

    #[test]
    fn test_unknown_backend_is_parse_error() {
        let result = LyricmuxConfig::parse("[backends]\nenabled = [\"spotify\"]");
        assert!(matches!(result, Err(CoreError::ConfigParseError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = LyricmuxConfig::load(Path::new("/nonexistent/lyricmux/config.toml"));
        assert!(matches!(result, Err(CoreError::ConfigNotFound { .. })));
    }
}
