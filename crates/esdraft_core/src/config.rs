//! Runtime configuration for hosts embedding the drafts core.
//!
//! Precedence per field: explicit override, then environment variable, then
//! built-in default. Blank values are treated as unset.

use crate::logging::{default_log_level, normalize_level};
use crate::repo::draft_store::DEFAULT_STORAGE_KEY;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "ESDRAFT_DB_PATH";
pub const ENV_LOG_DIR: &str = "ESDRAFT_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "ESDRAFT_LOG_LEVEL";
pub const ENV_STORAGE_KEY: &str = "ESDRAFT_STORAGE_KEY";

const DEFAULT_DB_FILE_NAME: &str = "esdraft.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "esdraft-logs";

#[derive(Debug)]
pub enum ConfigError {
    /// Level name outside trace|debug|info|warn|error.
    InvalidLogLevel(String),
    /// Needed to absolutize a relative log directory.
    CurrentDir(std::io::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::CurrentDir(err) => write!(f, "cannot resolve current directory: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidLogLevel(_) => None,
            Self::CurrentDir(err) => Some(err),
        }
    }
}

/// Values supplied explicitly by the host (e.g. command-line flags).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub db_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub storage_key: Option<String>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    /// Always absolute.
    pub log_dir: PathBuf,
    /// Canonical level name.
    pub log_level: &'static str,
    pub storage_key: String,
}

impl AppConfig {
    /// Resolves against the process environment.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::resolve_with(overrides, |name| std::env::var(name).ok())
    }

    /// Resolves with an injected environment lookup.
    pub fn resolve_with(
        overrides: ConfigOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let lookup = |name: &str| env(name).and_then(non_blank);

        let db_path = overrides
            .db_path
            .filter(|path| !path.as_os_str().is_empty())
            .or_else(|| lookup(ENV_DB_PATH).map(PathBuf::from))
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        let log_dir = overrides
            .log_dir
            .filter(|path| !path.as_os_str().is_empty())
            .or_else(|| lookup(ENV_LOG_DIR).map(PathBuf::from))
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME));
        let log_dir = absolutize(&log_dir)?;

        let log_level = match overrides
            .log_level
            .and_then(non_blank)
            .or_else(|| lookup(ENV_LOG_LEVEL))
        {
            Some(level) => {
                normalize_level(&level).map_err(|_| ConfigError::InvalidLogLevel(level.clone()))?
            }
            None => default_log_level(),
        };

        let storage_key = overrides
            .storage_key
            .and_then(non_blank)
            .or_else(|| lookup(ENV_STORAGE_KEY))
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());

        Ok(Self {
            db_path,
            log_dir,
            log_level,
            storage_key,
        })
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn absolutize(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
    Ok(cwd.join(path))
}
