//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. `OSHI_ROOT_FOLDER` environment variable
//! 3. `root_folder` key in the TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable config file is never fatal: compiled defaults are
//! used instead.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "OSHI_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "oshi_quotes.db";

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Two weeks, matching the usual browser-session lifetime for this kind of site
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 336;

/// Longest accepted session lifetime (ten years); larger values are clamped
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub session_ttl_hours: Option<i64>,
}

impl TomlConfig {
    /// Parse a config file at an explicit path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load the platform config file (or `explicit`) if one exists
    ///
    /// A file that cannot be read or parsed yields the defaults together with
    /// the error, so the caller can report it once logging is set up.
    pub fn load_or_default(explicit: Option<&Path>) -> (Self, Option<Error>) {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };

        let Some(path) = path else {
            return (Self::default(), None);
        };

        match Self::load(&path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }
}

/// First existing config file for the platform, if any
///
/// Linux checks `~/.config/oshi-quotes/config.toml` then
/// `/etc/oshi-quotes/config.toml`; other platforms only the user config dir.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("oshi-quotes").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/oshi-quotes/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Resolves the root folder holding the database
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    config_value: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(cli_arg: Option<PathBuf>, config: &TomlConfig) -> Self {
        Self {
            cli_arg,
            config_value: config.root_folder.clone(),
        }
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.config_value {
            return path.clone();
        }

        default_root_folder()
    }
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/oshi-quotes (or /var/lib/oshi-quotes for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("oshi-quotes"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/oshi-quotes"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("oshi-quotes"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/oshi-quotes"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("oshi-quotes"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\oshi-quotes"))
    } else {
        PathBuf::from("./oshi_quotes_data")
    }
}

/// Prepares the resolved root folder on disk
pub struct RootFolderInitializer {
    root: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(DATABASE_FILE)
    }
}

/// Effective HTTP server settings after merging file config and defaults
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub bind: String,
    pub port: u16,
    pub log_level: String,
    pub session_ttl: chrono::Duration,
}

impl ServerSettings {
    pub fn from_config(config: &TomlConfig) -> Self {
        let ttl_hours = match config.session_ttl_hours {
            Some(hours) if hours > MAX_SESSION_TTL_HOURS => {
                warn!(
                    "session_ttl_hours = {} exceeds the maximum, using {}",
                    hours, MAX_SESSION_TTL_HOURS
                );
                MAX_SESSION_TTL_HOURS
            }
            Some(hours) if hours > 0 => hours,
            Some(hours) => {
                warn!(
                    "session_ttl_hours = {} is not positive, using {}",
                    hours, DEFAULT_SESSION_TTL_HOURS
                );
                DEFAULT_SESSION_TTL_HOURS
            }
            None => DEFAULT_SESSION_TTL_HOURS,
        };

        Self {
            bind: config.bind.clone().unwrap_or_else(|| DEFAULT_BIND.to_string()),
            port: config.port.unwrap_or(DEFAULT_PORT),
            log_level: config
                .log_level
                .clone()
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            session_ttl: chrono::Duration::hours(ttl_hours),
        }
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self::from_config(&TomlConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = ServerSettings::default();
        assert_eq!(settings.bind, "127.0.0.1");
        assert_eq!(settings.port, 5780);
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.session_ttl, chrono::Duration::hours(336));
        assert_eq!(settings.listen_address(), "127.0.0.1:5780");
    }

    #[test]
    fn test_settings_from_config() {
        let config: TomlConfig = toml::from_str(
            r#"
            bind = "0.0.0.0"
            port = 8080
            log_level = "debug"
            session_ttl_hours = 1
            "#,
        )
        .unwrap();

        let settings = ServerSettings::from_config(&config);
        assert_eq!(settings.listen_address(), "0.0.0.0:8080");
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.session_ttl, chrono::Duration::hours(1));
    }

    #[test]
    fn test_non_positive_ttl_falls_back() {
        let config = TomlConfig {
            session_ttl_hours: Some(0),
            ..Default::default()
        };
        let settings = ServerSettings::from_config(&config);
        assert_eq!(settings.session_ttl, chrono::Duration::hours(336));
    }

    #[test]
    fn test_huge_ttl_is_clamped() {
        let config = TomlConfig {
            session_ttl_hours: Some(i64::MAX),
            ..Default::default()
        };
        let settings = ServerSettings::from_config(&config);
        assert_eq!(
            settings.session_ttl,
            chrono::Duration::hours(MAX_SESSION_TTL_HOURS)
        );
    }

    #[test]
    fn test_database_path() {
        let init = RootFolderInitializer::new(PathBuf::from("/srv/quotes"));
        assert_eq!(init.database_path(), PathBuf::from("/srv/quotes/oshi_quotes.db"));
    }
}
