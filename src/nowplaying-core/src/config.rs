use crate::paths::AppDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

const CURRENT_CONFIG_VERSION: u32 = 1;

pub const DEFAULT_BASE_URL: &str = "https://ws.audioscrobbler.com/2.0/";
pub const DEFAULT_USERNAME: &str = "LASTFM_USERNAME";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_config_version")]
    pub config_version: u32,
    /// Keyring profile the API key is stored under.
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub lastfm: LastFmSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            profile: None,
            lastfm: LastFmSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastFmSettings {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for LastFmSettings {
    fn default() -> Self {
        Self {
            username: default_username(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,
    /// Mirror log output to stderr.
    #[serde(default = "default_console_enabled")]
    pub console: bool,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_log_files: default_max_log_files(),
            console: default_console_enabled(),
            file_name: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("config validation failed: {0}")]
    Validation(ValidationError),
    #[error("failed to prepare configuration directories: {0}")]
    Directories(#[from] crate::paths::DirsError),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("unsupported config_version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("lastfm.base_url '{value}' is not a valid URL: {reason}")]
    InvalidBaseUrl { value: String, reason: String },
    #[error("lastfm.base_url '{value}' must use http or https")]
    UnsupportedScheme { value: String },
}

impl Config {
    pub fn load_or_default(dirs: &AppDirs) -> Result<Self, ConfigError> {
        dirs.ensure_exists()?;
        let path = Self::config_path(dirs);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    pub fn config_path(dirs: &AppDirs) -> PathBuf {
        dirs.config_dir().join("config.toml")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.config_version != CURRENT_CONFIG_VERSION {
            return Err(ValidationError::UnsupportedVersion {
                found: self.config_version,
                expected: CURRENT_CONFIG_VERSION,
            });
        }
        self.lastfm.parsed_base_url()?;
        Ok(())
    }
}

impl LastFmSettings {
    pub fn parsed_base_url(&self) -> Result<Url, ValidationError> {
        let url = Url::parse(&self.base_url).map_err(|e| ValidationError::InvalidBaseUrl {
            value: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ValidationError::UnsupportedScheme {
                value: self.base_url.clone(),
            });
        }
        Ok(url)
    }
}

fn default_config_version() -> u32 {
    CURRENT_CONFIG_VERSION
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_max_log_files() -> usize {
    7
}

fn default_console_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.logging.max_log_files, 7);
        assert!(config.logging.console);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(config.lastfm.username, DEFAULT_USERNAME);
        assert_eq!(config.lastfm.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn invalid_version_rejected() {
        let mut config = Config::default();
        config.config_version = CURRENT_CONFIG_VERSION + 1;
        let result = config.validate();
        assert!(matches!(
            result,
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn malformed_base_url_rejected() {
        let mut config = Config::default();
        config.lastfm.base_url = "not a url".into();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidBaseUrl { .. })
        ));

        config.lastfm.base_url = "ftp://ws.audioscrobbler.com/2.0/".into();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "[lastfm]\nusername = \"alice\"\n\n[logging]\nlevel = \"debug\""
        )
        .expect("write config");

        let config = Config::load_from(file.path()).expect("config should load");
        assert_eq!(config.lastfm.username, "alice");
        assert_eq!(config.lastfm.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(config.profile.is_none());
    }

    #[test]
    fn unparseable_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "lastfm = [").expect("write config");

        let err = Config::load_from(file.path()).expect_err("should fail to parse");
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
