use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::models::{AuthType, ServerProfile};

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub wordpress: WordpressConfig,
    pub logging: LoggingConfig,
    /// User file merged over the defaults, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth_type: AuthType,
    pub private_key_path: String,
    pub host_fingerprint: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WordpressConfig {
    pub wp_binary: String,
    pub path: Option<String>,
    pub allow_root: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
}

/// Values taken from the command line or environment. They win over both
/// config layers.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub private_key_path: Option<PathBuf>,
    pub password_supplied: bool,
    pub wp_path: Option<String>,
}

impl AppConfig {
    /// Load configuration with layering: embedded defaults → user file.
    ///
    /// An explicit `path` must exist. Without one, the platform config
    /// directory is checked and silently skipped when it has no file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut merged: toml::Table =
            toml::from_str(DEFAULT_CONFIG).map_err(ConfigError::Defaults)?;

        let user_path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path().filter(|candidate| candidate.exists()),
        };

        if let Some(user_path) = &user_path {
            let text = fs::read_to_string(user_path).map_err(|source| ConfigError::Read {
                path: user_path.clone(),
                source,
            })?;
            let user: toml::Table = toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: user_path.clone(),
                source,
            })?;
            merge_tables(&mut merged, user);
        }

        let mut config: Self = toml::Value::Table(merged)
            .try_into()
            .map_err(ConfigError::Invalid)?;
        config.source = user_path;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(username) = overrides.username {
            self.server.username = username;
        }
        if let Some(key_path) = overrides.private_key_path {
            self.server.private_key_path = key_path.to_string_lossy().to_string();
            self.server.auth_type = AuthType::Key;
        } else if overrides.password_supplied {
            self.server.auth_type = AuthType::Password;
        }
        if let Some(wp_path) = overrides.wp_path {
            self.wordpress.path = Some(wp_path);
        }
    }

    pub fn server_profile(&self) -> Result<ServerProfile, ConfigError> {
        let host = self.server.host.trim();
        let username = self.server.username.trim();
        if host.is_empty() {
            return Err(ConfigError::Missing("Server host"));
        }
        if username.is_empty() {
            return Err(ConfigError::Missing("Server username"));
        }
        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        let fingerprint = self.server.host_fingerprint.trim();
        Ok(ServerProfile {
            host: host.to_string(),
            port: self.server.port,
            username: username.to_string(),
            auth_type: self.server.auth_type,
            host_fingerprint: (!fingerprint.is_empty()).then(|| fingerprint.to_string()),
        })
    }

    pub fn private_key_path(&self) -> Result<Option<PathBuf>, ConfigError> {
        let raw = self.server.private_key_path.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        expand_home(raw).map(Some)
    }

    pub fn log_dir(&self) -> Result<Option<PathBuf>, ConfigError> {
        let raw = self.logging.log_dir.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        expand_home(raw).map(Some)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "gf-siren-installer")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

fn expand_home(raw: &str) -> Result<PathBuf, ConfigError> {
    if let Some(rest) = raw.strip_prefix('~') {
        let home = directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .ok_or(ConfigError::NoHome)?;
        let rest = rest.trim_start_matches(['/', '\\']);
        return Ok(if rest.is_empty() { home } else { home.join(rest) });
    }
    Ok(PathBuf::from(raw))
}
