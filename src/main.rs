use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use gf_siren_installer::auth::{remember_password, resolve_runtime_auth};
use gf_siren_installer::config::{AppConfig, ConfigOverrides};
use gf_siren_installer::installer::{InstallOptions, Installer};
use gf_siren_installer::models::RuntimeAuth;
use gf_siren_installer::ssh_client::SshExecutor;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to config.toml in the platform config directory)
    #[arg(short, long, env = "GF_SIREN_CONFIG")]
    config: Option<PathBuf>,

    /// SSH host
    #[arg(long, env = "GF_SIREN_SSH_HOST")]
    host: Option<String>,

    /// SSH port
    #[arg(short, long, env = "GF_SIREN_SSH_PORT")]
    port: Option<u16>,

    /// SSH user
    #[arg(short, long, env = "GF_SIREN_SSH_USER")]
    user: Option<String>,

    /// Private key file; selects key authentication
    #[arg(short, long, env = "GF_SIREN_SSH_KEY")]
    identity: Option<PathBuf>,

    /// Passphrase for the private key
    #[arg(long, env = "GF_SIREN_SSH_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,

    /// SSH password; selects password authentication unless --identity is given
    #[arg(long, env = "GF_SIREN_SSH_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Save --password in the OS keyring for later runs
    #[arg(long)]
    remember_password: bool,

    /// WordPress root on the server, passed to WP-CLI as --path
    #[arg(long, env = "GF_SIREN_WP_PATH")]
    wp_path: Option<String>,

    /// Print the settings payload instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Read the settings back after writing and compare
    #[arg(long)]
    verify: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            username: self.user.clone(),
            private_key_path: self.identity.clone(),
            password_supplied: self.password.is_some(),
            wp_path: self.wp_path.clone(),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("Unexpected error: failed to start runtime: {error}");
            return ExitCode::from(1);
        }
    };

    let code = runtime.block_on(async {
        match run(args).await {
            Ok(code) => code,
            Err(error) => {
                tracing::error!(error = %format!("{error:#}"), "run failed");
                println!("\n\nUnexpected error: {error:#}");
                1
            }
        }
    });

    // An interrupted SSH command may still be blocking a worker thread.
    runtime.shutdown_background();
    ExitCode::from(code)
}

async fn run(args: Args) -> Result<u8> {
    until_interrupted(move || install(args), tokio::signal::ctrl_c()).await
}

/// Runs `work` on a blocking thread and returns `1` if `interrupt` fires
/// first. Everything from config loading onwards belongs inside `work`.
async fn until_interrupted<W, I>(work: W, interrupt: I) -> Result<u8>
where
    W: FnOnce() -> Result<u8> + Send + 'static,
    I: Future<Output = io::Result<()>>,
{
    let task = tokio::task::spawn_blocking(work);

    tokio::select! {
        joined = task => joined.context("installer thread panicked")?,
        signal = interrupt => {
            signal.context("Failed to listen for Ctrl-C")?;
            tracing::warn!("interrupted by user");
            println!("\n\nInstallation interrupted by user");
            Ok(1)
        }
    }
}

fn install(args: Args) -> Result<u8> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    config.apply_overrides(args.overrides());

    let _log_guard = init_logging(args.verbose, config.log_dir()?.as_deref())?;
    tracing::info!(config = ?config.source, "gf-siren-install starting");

    let server = config.server_profile()?;
    let runtime_auth = RuntimeAuth {
        password: args.password.clone(),
        private_key_path: config.private_key_path()?,
        private_key_passphrase: args.passphrase.clone(),
    };
    if args.remember_password {
        remember_password(&server, &runtime_auth)?;
    }
    let auth = resolve_runtime_auth(&server, &runtime_auth)?;

    let executor = SshExecutor::new(server, auth, config.wordpress.clone());
    let options = InstallOptions {
        dry_run: args.dry_run,
        verify: args.verify,
    };

    let code = Installer::new(executor, options).run(&mut io::stdout());
    Ok(u8::try_from(code).unwrap_or(1))
}

fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gf_siren_installer={level},gf_siren_install={level}")));

    // Logs go to stderr (and optionally a file); stdout carries the report.
    let stderr_layer = fmt::layer().with_writer(io::stderr).with_target(false);

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory `{}`", dir.display()))?;
            let file_appender = tracing_appender::rolling::daily(dir, "gf-siren-install.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future;
    use std::time::Duration;

    use super::until_interrupted;

    #[tokio::test]
    async fn interrupt_before_work_finishes_exits_with_one() {
        let code = until_interrupted(
            || {
                std::thread::sleep(Duration::from_millis(200));
                Ok(0)
            },
            future::ready(Ok(())),
        )
        .await
        .expect("interrupt is not an error");
        assert_eq!(code, 1);
    }

    #[tokio::test]
    async fn finished_work_keeps_its_exit_code() {
        let code = until_interrupted(|| Ok(0), future::pending())
            .await
            .expect("work succeeds");
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn setup_errors_propagate() {
        let error = until_interrupted(|| Err(anyhow::anyhow!("bad config")), future::pending())
            .await
            .expect_err("setup error surfaces");
        assert_eq!(error.to_string(), "bad config");
    }
}
