use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SshError {
    #[error("Failed to resolve server host `{address}`: {source}")]
    Resolve { address: String, source: io::Error },

    #[error("No resolved socket address for `{0}`")]
    NoAddress(String),

    #[error("Failed to establish TCP connection to `{address}`: {source}")]
    Connect { address: String, source: io::Error },

    #[error("Failed to configure TCP timeouts: {0}")]
    SocketOptions(io::Error),

    #[error("{context}: {source}")]
    Session {
        context: &'static str,
        source: ssh2::Error,
    },

    #[error("SSH session did not provide host key bytes")]
    MissingHostKey,

    #[error("Host key mismatch for `{address}`: expected {expected}, got {actual}")]
    HostKeyMismatch {
        address: String,
        expected: String,
        actual: String,
    },

    #[error("SSH authentication failed: {0}")]
    Auth(String),

    #[error("SSH session is not connected")]
    NotConnected,

    #[error("Remote channel I/O failed: {context}: {source}")]
    Channel {
        context: &'static str,
        source: io::Error,
    },

    #[error("Failed to launch system ssh: {0}")]
    SystemSsh(io::Error),
}

impl SshError {
    pub(crate) fn session(context: &'static str) -> impl FnOnce(ssh2::Error) -> Self {
        move |source| Self::Session { context, source }
    }

    pub(crate) fn channel(context: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::Channel { context, source }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file `{path}`: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse config file `{path}`: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Embedded default config is invalid: {0}")]
    Defaults(toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(toml::de::Error),

    #[error("{0} cannot be empty")]
    Missing(&'static str),

    #[error("Server port must be greater than 0")]
    InvalidPort,

    #[error("Password authentication requires --password, GF_SIREN_SSH_PASSWORD or a saved keyring credential")]
    MissingPassword,

    #[error("Key authentication requires a private key path")]
    MissingKeyPath,

    #[error("Private key file does not exist: {0}")]
    KeyNotFound(PathBuf),

    #[error("Keyring access failed: {0}")]
    Keyring(String),

    #[error("Cannot determine home directory")]
    NoHome,
}

#[derive(Debug, Error)]
pub enum InstallerError {
    #[error(transparent)]
    Ssh(#[from] SshError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to write report: {0}")]
    Output(#[from] io::Error),
}
