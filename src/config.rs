/// Relay configuration
///
/// Settings come from three layers, later ones winning:
///   1. built-in defaults (the Bangladesh bulletin, the public FTP host)
///   2. an optional TOML file (`SYNOP_RELAY_CONFIG`, else `./synop_relay.toml`)
///   3. environment variables, after `.env` has been loaded by the binary
///
/// FTP credentials are expected from the environment and are never given
/// defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ingest::ogimet::{DEFAULT_SOURCE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::logging::LogLevel;
use crate::model::RelayError;

pub const DEFAULT_CONFIG_FILE: &str = "synop_relay.toml";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Bulletin URLs; each is parsed independently and the groups merged.
    pub urls: Vec<String>,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Read the bulletin from this file instead of fetching it.
    pub file: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            urls: vec![DEFAULT_SOURCE_URL.to_string()],
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FtpConfig {
    /// Set to false to skip remote delivery (e.g. local-only runs).
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub directory: String,
    pub connect_timeout_secs: u64,
    pub passive: bool,
}

impl Default for FtpConfig {
    fn default() -> Self {
        FtpConfig {
            enabled: true,
            host: "ftpupload.net".to_string(),
            port: 21,
            username: None,
            password: None,
            directory: "htdocs/data".to_string(),
            connect_timeout_secs: 30,
            passive: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Also write each artifact here before uploading.
    pub local_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: Option<String>,
    pub level: LogLevel,
    pub console_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            file: Some("/tmp/weather_upload.log".to_string()),
            level: LogLevel::Info,
            console_timestamps: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub source: SourceConfig,
    pub ftp: FtpConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

impl RelayConfig {
    /// Parses a TOML document. Missing sections and keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, RelayError> {
        toml::from_str(text).map_err(|e| RelayError::Config(format!("Invalid config: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self, RelayError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| RelayError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Full startup load: file layer, then environment, then validation.
    pub fn load() -> Result<Self, RelayError> {
        let lookup = |key: &str| std::env::var(key).ok();

        let mut config = match lookup("SYNOP_RELAY_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides through `lookup`, so tests can supply
    /// a map instead of touching the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("FTP_HOST") {
            self.ftp.host = host;
        }
        if let Some(port) = lookup("FTP_PORT") {
            self.ftp.port = port
                .trim()
                .parse()
                .map_err(|_| RelayError::Config(format!("FTP_PORT is not a port number: {}", port)))?;
        }
        if let Some(username) = lookup("FTP_USERNAME") {
            self.ftp.username = Some(username);
        }
        if let Some(password) = lookup("FTP_PASSWORD") {
            self.ftp.password = Some(password);
        }
        if let Some(directory) = lookup("FTP_DIRECTORY") {
            self.ftp.directory = directory;
        }
        if let Some(url) = lookup("SYNOP_SOURCE_URL") {
            self.source.urls = vec![url];
        }
        if let Some(file) = lookup("SYNOP_SOURCE_FILE") {
            self.source.file = Some(PathBuf::from(file));
        }
        if let Some(dir) = lookup("SYNOP_OUTPUT_DIR") {
            self.output.local_dir = Some(PathBuf::from(dir));
        }
        if let Some(file) = lookup("SYNOP_LOG_FILE") {
            self.logging.file = Some(file);
        }
        if let Some(level) = lookup("SYNOP_LOG_LEVEL") {
            self.logging.level = level.parse()?;
        }
        Ok(())
    }

    /// Checks that a run with this config can succeed in principle.
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.source.file.is_none() && self.source.urls.is_empty() {
            return Err(RelayError::Config("no bulletin source configured".to_string()));
        }
        if self.ftp.enabled {
            if self.ftp.port == 0 {
                return Err(RelayError::Config("FTP port must be non-zero".to_string()));
            }
            if self.ftp.username.is_none() {
                return Err(RelayError::Config("FTP_USERNAME is not set".to_string()));
            }
            if self.ftp.password.is_none() {
                return Err(RelayError::Config("FTP_PASSWORD is not set".to_string()));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
