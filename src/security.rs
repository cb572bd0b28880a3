use std::sync::OnceLock;

use keyring::Entry;
use regex::Regex;

use crate::error::ConfigError;

const KEYRING_SERVICE: &str = "gf-siren-installer";

pub fn set_server_password(account: &str, password: &str) -> Result<(), ConfigError> {
    let entry = Entry::new(KEYRING_SERVICE, account)
        .map_err(|error| ConfigError::Keyring(format!("Failed to create keyring entry: {error}")))?;
    entry.set_password(password).map_err(|error| {
        ConfigError::Keyring(format!("Failed to store password in keyring: {error}"))
    })
}

pub fn get_server_password(account: &str) -> Result<Option<String>, ConfigError> {
    let entry = Entry::new(KEYRING_SERVICE, account)
        .map_err(|error| ConfigError::Keyring(format!("Failed to create keyring entry: {error}")))?;
    match entry.get_password() {
        Ok(password) => Ok(Some(password)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(error) => Err(ConfigError::Keyring(format!(
            "Failed to read password from keyring: {error}"
        ))),
    }
}

/// Scrubs log text on the way out of the SSH layer.
///
/// Starts with the connection credentials and learns more as commands reveal
/// them. Longer secrets are replaced first so a secret that contains another
/// one is never half-masked.
#[derive(Debug, Clone, Default)]
pub struct LogRedactor {
    secrets: Vec<String>,
}

impl LogRedactor {
    pub fn new<I>(secrets: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut redactor = Self::default();
        for secret in secrets {
            redactor.remember(&secret);
        }
        redactor
    }

    pub fn remember(&mut self, secret: &str) {
        let secret = secret.trim();
        if secret.is_empty() || self.secrets.iter().any(|known| known == secret) {
            return;
        }
        let at = self
            .secrets
            .iter()
            .position(|known| known.len() < secret.len())
            .unwrap_or(self.secrets.len());
        self.secrets.insert(at, secret.to_string());
    }

    pub fn redact(&self, input: &str) -> String {
        let mut output = self
            .secrets
            .iter()
            .fold(input.to_string(), |text, secret| text.replace(secret.as_str(), "***"));

        for pattern in secret_patterns() {
            output = pattern.replace_all(&output, "${keep}***").into_owned();
        }
        output
    }
}

// Each pattern keeps the `keep` group and masks what follows it.
const SECRET_PATTERNS: &[&str] = &[
    // define( 'GF_SIREN_API_KEY', '...' ) and the DB_PASSWORD / AUTH_KEY family.
    r#"(?i)(?P<keep>define\(\s*['"][A-Z0-9_]*(?:KEY|PASSWORD|SALT|SECRET)['"]\s*,\s*['"])[^'"]+"#,
    r#"(?i)(?P<keep>(?:api[_-]?key|password|passphrase|token)['"]?\s*[:=]\s*['"]?)[^\s"',)]+"#,
    r#"(?i)(?P<keep>authorization\s*[:=]\s*bearer\s+)[^\s"']+"#,
    r"(?s)(?P<keep>)-----BEGIN [A-Z ]*PRIVATE KEY-----.*?-----END [A-Z ]*PRIVATE KEY-----",
];

fn secret_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        SECRET_PATTERNS
            .iter()
            .map(|pattern| Regex::new(pattern).expect("secret pattern must compile"))
            .collect()
    })
}
