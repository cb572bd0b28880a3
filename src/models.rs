use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    Password,
    #[default]
    Key,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerProfile {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth_type: AuthType,
    pub host_fingerprint: Option<String>,
}

impl ServerProfile {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Keyring account name for this server's saved password.
    pub fn account(&self) -> String {
        format!("{}@{}", self.username, self.host)
    }
}

/// Credentials as supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct RuntimeAuth {
    pub password: Option<String>,
    pub private_key_path: Option<PathBuf>,
    pub private_key_passphrase: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedRuntimeAuth {
    pub password: Option<String>,
    pub private_key_path: Option<PathBuf>,
    pub private_key_passphrase: Option<String>,
}

impl ResolvedRuntimeAuth {
    pub fn to_secret_list(&self) -> Vec<String> {
        let mut values = Vec::new();
        if let Some(value) = &self.password {
            values.push(value.clone());
        }
        if let Some(value) = &self.private_key_passphrase {
            values.push(value.clone());
        }
        values
    }
}
