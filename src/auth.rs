use std::path::Path;

use crate::error::ConfigError;
use crate::models::{AuthType, ResolvedRuntimeAuth, RuntimeAuth, ServerProfile};
use crate::security::{get_server_password, set_server_password};

/// Stores the supplied password in the OS keyring so later runs can omit it.
pub fn remember_password(server: &ServerProfile, runtime_auth: &RuntimeAuth) -> Result<(), ConfigError> {
    let Some(password) = runtime_auth.password.as_deref() else {
        return Err(ConfigError::MissingPassword);
    };
    if password.trim().is_empty() {
        return Err(ConfigError::MissingPassword);
    }
    set_server_password(&server.account(), password)?;
    tracing::info!(account = %server.account(), "saved SSH password to keyring");
    Ok(())
}

pub fn resolve_runtime_auth(
    server: &ServerProfile,
    runtime_auth: &RuntimeAuth,
) -> Result<ResolvedRuntimeAuth, ConfigError> {
    resolve_with_keyring(server, runtime_auth, get_server_password)
}

fn resolve_with_keyring<F>(
    server: &ServerProfile,
    runtime_auth: &RuntimeAuth,
    saved_password: F,
) -> Result<ResolvedRuntimeAuth, ConfigError>
where
    F: FnOnce(&str) -> Result<Option<String>, ConfigError>,
{
    let private_key_passphrase = runtime_auth
        .private_key_passphrase
        .clone()
        .filter(|value| !value.trim().is_empty());

    match server.auth_type {
        AuthType::Password => {
            let supplied = runtime_auth
                .password
                .clone()
                .filter(|value| !value.trim().is_empty());
            let password = match supplied {
                Some(value) => Some(value),
                None => saved_password(&server.account())?.filter(|value| !value.trim().is_empty()),
            };
            if password.is_none() {
                return Err(ConfigError::MissingPassword);
            }

            Ok(ResolvedRuntimeAuth {
                password,
                private_key_path: None,
                private_key_passphrase: None,
            })
        }
        AuthType::Key => {
            let key_path = runtime_auth
                .private_key_path
                .clone()
                .ok_or(ConfigError::MissingKeyPath)?;
            if !Path::new(&key_path).exists() {
                return Err(ConfigError::KeyNotFound(key_path));
            }

            Ok(ResolvedRuntimeAuth {
                password: None,
                private_key_path: Some(key_path),
                private_key_passphrase,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::resolve_with_keyring;
    use crate::error::ConfigError;
    use crate::models::{AuthType, RuntimeAuth, ServerProfile};

    fn server(auth_type: AuthType) -> ServerProfile {
        ServerProfile {
            host: "wp.example.org".to_string(),
            port: 22,
            username: "deploy".to_string(),
            auth_type,
            host_fingerprint: None,
        }
    }

    #[test]
    fn supplied_password_wins_over_keyring() {
        let auth = RuntimeAuth {
            password: Some("secret".to_string()),
            ..RuntimeAuth::default()
        };
        let resolved = resolve_with_keyring(&server(AuthType::Password), &auth, |_| {
            panic!("keyring must not be consulted")
        })
        .expect("password resolves");
        assert_eq!(resolved.password.as_deref(), Some("secret"));
    }

    #[test]
    fn keyring_password_is_used_when_none_supplied() {
        let resolved = resolve_with_keyring(
            &server(AuthType::Password),
            &RuntimeAuth::default(),
            |account| {
                assert_eq!(account, "deploy@wp.example.org");
                Ok(Some("saved".to_string()))
            },
        )
        .expect("password resolves");
        assert_eq!(resolved.password.as_deref(), Some("saved"));
        assert_eq!(resolved.to_secret_list(), vec!["saved".to_string()]);
    }

    #[test]
    fn password_auth_without_any_password_fails() {
        let error = resolve_with_keyring(
            &server(AuthType::Password),
            &RuntimeAuth::default(),
            |_| Ok(None),
        )
        .expect_err("must fail");
        assert!(matches!(error, ConfigError::MissingPassword));
    }

    #[test]
    fn key_auth_requires_existing_file() {
        let auth = RuntimeAuth {
            private_key_path: Some(PathBuf::from("/nonexistent/id_ed25519")),
            ..RuntimeAuth::default()
        };
        let error = resolve_with_keyring(&server(AuthType::Key), &auth, |_| Ok(None))
            .expect_err("must fail");
        assert!(matches!(error, ConfigError::KeyNotFound(_)));

        let key = tempfile::NamedTempFile::new().expect("temp key");
        let auth = RuntimeAuth {
            private_key_path: Some(key.path().to_path_buf()),
            private_key_passphrase: Some(String::new()),
            ..RuntimeAuth::default()
        };
        let resolved = resolve_with_keyring(&server(AuthType::Key), &auth, |_| Ok(None))
            .expect("key resolves");
        assert_eq!(resolved.private_key_path.as_deref(), Some(key.path()));
        assert_eq!(resolved.private_key_passphrase, None);
    }
}
