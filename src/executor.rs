//! The contract between the installer and whatever runs WP-CLI remotely.

use crate::error::SshError;
use crate::wp_cli::WpCommand;

/// Outcome of a single remote WP-CLI invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteCommandResult {
    pub success: bool,
    pub output: String,
    pub error: String,
}

impl RemoteCommandResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: String::new(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: error.into(),
        }
    }

    /// Builds a result from raw process streams. Trailing whitespace is
    /// dropped from both streams so callers can compare output directly.
    pub fn from_streams(stdout: &str, stderr: &str, exit_status: i32) -> Self {
        let output = stdout.trim_end().to_string();
        let stderr = stderr.trim();
        let error = if !stderr.is_empty() {
            stderr.to_string()
        } else if exit_status != 0 {
            format!("exit status {exit_status}")
        } else {
            String::new()
        };

        Self {
            success: exit_status == 0,
            output,
            error,
        }
    }
}

/// A synchronous request/response channel to the remote host.
///
/// `connect` is called once before any command. Transport failures during
/// `execute` are reported as a failed [`RemoteCommandResult`] rather than an
/// error, so a broken command never aborts the run.
pub trait RemoteExecutor {
    fn connect(&mut self) -> Result<(), SshError>;

    fn execute(&mut self, command: &WpCommand) -> RemoteCommandResult;
}

impl<T: RemoteExecutor + ?Sized> RemoteExecutor for &mut T {
    fn connect(&mut self) -> Result<(), SshError> {
        (**self).connect()
    }

    fn execute(&mut self, command: &WpCommand) -> RemoteCommandResult {
        (**self).execute(command)
    }
}

#[cfg(test)]
mod tests {
    use super::RemoteCommandResult;

    #[test]
    fn from_streams_trims_output_and_prefers_stderr() {
        let result = RemoteCommandResult::from_streams("value\n", "Error: nope\n", 1);
        assert!(!result.success);
        assert_eq!(result.output, "value");
        assert_eq!(result.error, "Error: nope");
    }

    #[test]
    fn from_streams_reports_silent_failures_by_exit_status() {
        let result = RemoteCommandResult::from_streams("", "", 1);
        assert!(!result.success);
        assert_eq!(result.error, "exit status 1");

        let result = RemoteCommandResult::from_streams("ok\n", "", 0);
        assert!(result.success);
        assert!(result.error.is_empty());
    }
}
