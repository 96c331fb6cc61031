//! Execution of the elevated ufw process
//!
//! The runner spawns ufw through [`crate::elevation`], optionally answers a
//! single confirmation prompt, and waits for the process to exit. stdout and
//! stderr are captured into separate buffers so the classifier can tell
//! prompt text from real output. Exit codes are reported, not interpreted.
//!
//! There is no timeout: a ufw process that blocks (for example on a second,
//! unexpected prompt) holds the calling task until it exits.

use crate::command::UfwCommand;
use crate::core::error::{Error, Result};
use crate::elevation::{self, ElevationMethod};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Default name of the firewall executable
pub const DEFAULT_UFW_PROGRAM: &str = "ufw";

/// Captured result of one ufw invocation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    pub fn from_output(output: &std::process::Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Spawns the firewall tool with a fixed program name and elevation method
#[derive(Debug, Clone)]
pub struct Runner {
    program: String,
    elevation: ElevationMethod,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(DEFAULT_UFW_PROGRAM, ElevationMethod::Auto)
    }
}

impl Runner {
    pub fn new(program: impl Into<String>, elevation: ElevationMethod) -> Self {
        Self {
            program: program.into(),
            elevation,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn elevation(&self) -> ElevationMethod {
        self.elevation
    }

    /// Fails fast with [`Error::ToolUnavailable`] if the tool cannot be found.
    pub fn ensure_available(&self) -> Result<()> {
        if elevation::binary_exists(&self.program) {
            Ok(())
        } else {
            warn!("Firewall tool '{}' not found", self.program);
            Err(Error::ToolUnavailable(format!(
                "{} command not found or not executable",
                self.program
            )))
        }
    }

    /// The executable path the presence check found (including the sbin
    /// fallback), or the configured name if lookup fails.
    pub fn resolved_program(&self) -> String {
        elevation::find_binary(&self.program)
            .map_or_else(|| self.program.clone(), |path| path.to_string_lossy().into_owned())
    }

    /// Runs `command`, supplying its confirmation line if it has one.
    pub async fn run(&self, command: &UfwCommand) -> Result<ExecutionResult> {
        self.run_args(&command.args(), command.confirmation()).await
    }

    /// Runs the tool with raw arguments and optional stdin payload.
    ///
    /// # Errors
    ///
    /// Returns `Err` only if the process could not be started or waited on.
    /// A non-zero exit is reported through [`ExecutionResult::success`].
    pub async fn run_args(
        &self,
        args: &[String],
        stdin_payload: Option<&str>,
    ) -> Result<ExecutionResult> {
        let program = self.resolved_program();
        info!("Executing: {} {}", program, args.join(" "));

        let mut cmd = elevation::create_elevated_command(&program, args, self.elevation)?;
        cmd.stdin(if stdin_payload.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ToolUnavailable(format!("failed to start {}: {e}", self.program))
            } else {
                Error::Internal(format!("Failed to spawn {}: {e}", self.program))
            }
        })?;

        if let (Some(payload), Some(mut stdin)) = (stdin_payload, child.stdin.take()) {
            // ufw skips the prompt when there is nothing to confirm and may
            // exit before reading; a closed pipe is expected then.
            match stdin.write_all(payload.as_bytes()).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    debug!("{} exited before reading confirmation", self.program);
                }
                Err(e) => {
                    return Err(Error::Internal(format!(
                        "Failed to write to {} stdin: {e}",
                        self.program
                    )));
                }
            }
            // Dropping stdin closes the pipe so ufw sees EOF after one line
        }

        let output = child.wait_with_output().await?;
        let result = ExecutionResult::from_output(&output);

        if result.success {
            debug!("{} exited successfully", self.program);
        } else {
            warn!(
                "{} exited with {:?}: {}",
                self.program,
                result.exit_code,
                result.stderr.trim()
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_helpers::MockUfw;

    #[tokio::test]
    async fn test_captures_streams_separately() {
        let mock = MockUfw::new(r#"echo "to stdout"; echo "to stderr" >&2; exit 0"#);
        let result = mock.runner().run(&UfwCommand::Status).await.unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout, "to stdout\n");
        assert_eq!(result.stderr, "to stderr\n");
    }

    #[tokio::test]
    async fn test_reports_failure_exit_code() {
        let mock = MockUfw::new(r#"echo "ERROR: Bad port" >&2; exit 1"#);
        let result = mock.runner().run(&UfwCommand::Disable).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(1));
        assert!(result.stderr.contains("Bad port"));
    }

    #[tokio::test]
    async fn test_passes_arguments_verbatim() {
        let mock = MockUfw::new(r#"printf '%s\n' "$@""#);
        let args = vec!["allow".to_string(), "a b".to_string(), "$HOME".to_string()];
        let result = mock.runner().run_args(&args, None).await.unwrap();

        assert_eq!(result.stdout, "allow\na b\n$HOME\n");
    }

    #[tokio::test]
    async fn test_supplies_confirmation_line() {
        let mock = MockUfw::new(
            r#"printf 'Proceed with operation (y|n)? '; read answer; echo "answer=$answer""#,
        );
        let result = mock.runner().run(&UfwCommand::Enable).await.unwrap();

        assert!(result.success);
        assert!(result.stdout.contains("answer=y"));
    }

    #[tokio::test]
    async fn test_no_stdin_without_confirmation() {
        // read hits EOF immediately on /dev/null
        let mock = MockUfw::new(r#"if read line; then echo "got input"; else echo "no input"; fi"#);
        let result = mock.runner().run(&UfwCommand::Disable).await.unwrap();

        assert_eq!(result.stdout, "no input\n");
    }

    #[tokio::test]
    async fn test_confirmation_ignored_when_not_read() {
        let mock = MockUfw::new(r#"echo "ERROR: Could not find rule '9'" >&2; exit 1"#);
        let index = crate::core::firewall::RuleIndex::new("9").unwrap();
        let result = mock.runner().run(&UfwCommand::Delete(index)).await.unwrap();

        assert!(!result.success);
        assert!(result.stderr.contains("Could not find rule"));
    }

    #[tokio::test]
    async fn test_missing_program_is_tool_unavailable() {
        let runner = Runner::new("/nonexistent/ufw", ElevationMethod::None);

        assert!(matches!(runner.ensure_available(), Err(Error::ToolUnavailable(_))));
        let result = runner.run(&UfwCommand::Status).await;
        assert!(matches!(result, Err(Error::ToolUnavailable(_))));
    }

    #[test]
    fn test_resolved_program_is_absolute() {
        let runner = Runner::new("sh", ElevationMethod::None);
        let program = runner.resolved_program();
        assert!(program.starts_with('/'), "{program}");
        assert!(program.ends_with("/sh"));
    }

    #[test]
    fn test_resolved_program_keeps_unknown_name() {
        let runner = Runner::new("ufwd_nonexistent_binary_xyz", ElevationMethod::None);
        assert_eq!(runner.resolved_program(), "ufwd_nonexistent_binary_xyz");
    }

    #[tokio::test]
    async fn test_runs_resolved_path() {
        let mock = MockUfw::new(r#"echo "$0""#);
        let runner = mock.runner();
        let result = runner.run(&UfwCommand::Status).await.unwrap();
        assert_eq!(result.stdout.trim_end(), runner.resolved_program());
    }

    #[test]
    fn test_ensure_available_for_existing_program() {
        let mock = MockUfw::new("exit 0");
        assert!(mock.runner().ensure_available().is_ok());
    }
}
