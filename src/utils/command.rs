//! Command execution primitives with consistent error handling.

use std::fmt;
use std::io;
use std::path::Path;
use std::process::{Command, Output};

/// A collaborator tool exited non-zero (or could not be started).
///
/// Carries the tool name and its captured output so the failure can be
/// attached verbatim to the pipeline error.
#[derive(Debug)]
pub struct CommandFailure {
    pub program: String,
    pub detail: String,
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.program, self.detail)
    }
}

/// Captured outcome of a finished child process.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    fn from_output(output: Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Error text for reporting: stderr, falling back to stdout.
    pub fn error_text(&self) -> String {
        if !self.stderr.trim().is_empty() {
            self.stderr.trim().to_string()
        } else {
            self.stdout.trim().to_string()
        }
    }
}

/// Run a command and capture its output without judging the exit status.
pub fn capture(program: &str, args: &[&str]) -> io::Result<CommandOutput> {
    let output = Command::new(program).args(args).output()?;
    Ok(CommandOutput::from_output(output))
}

/// Run a command with an explicit working directory and extra environment
/// variables passed to the child only. The parent process environment is
/// never mutated.
pub fn capture_in(
    dir: &Path,
    envs: &[(String, String)],
    program: &str,
    args: &[&str],
) -> io::Result<CommandOutput> {
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .envs(envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .output()?;
    Ok(CommandOutput::from_output(output))
}

/// Run a command and return stdout on success.
///
/// Returns a `CommandFailure` carrying the captured output if the command
/// could not be started or exited non-zero.
pub fn run(program: &str, args: &[&str]) -> Result<String, CommandFailure> {
    let output = capture(program, args).map_err(|e| CommandFailure {
        program: program.to_string(),
        detail: e.to_string(),
    })?;

    if !output.success {
        return Err(CommandFailure {
            program: program.to_string(),
            detail: format!("exit {}: {}", output.exit_code, output.error_text()),
        });
    }

    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_succeeds_with_valid_command() {
        let result = run("echo", &["hello"]);
        assert_eq!(result.unwrap(), "hello\n");
    }

    #[test]
    fn run_fails_with_invalid_command() {
        let result = run("nonexistent_command_xyz", &[]);
        assert!(result.is_err());
    }

    #[test]
    fn run_attaches_output_on_nonzero_exit() {
        let err = run("sh", &["-c", "echo boom >&2; exit 3"]).unwrap_err();
        assert!(err.detail.contains("exit 3"));
        assert!(err.detail.contains("boom"));
    }

    #[test]
    fn capture_in_passes_explicit_environment() {
        let dir = tempfile::tempdir().unwrap();
        let envs = vec![("SIDELOADER_TEST_VAR".to_string(), "42".to_string())];
        let output = capture_in(
            dir.path(),
            &envs,
            "sh",
            &["-c", "printf '%s' \"$SIDELOADER_TEST_VAR\""],
        )
        .unwrap();
        assert!(output.success);
        assert_eq!(output.stdout, "42");
        assert!(std::env::var("SIDELOADER_TEST_VAR").is_err());
    }

    #[test]
    fn error_text_prefers_stderr() {
        let output = CommandOutput {
            success: false,
            exit_code: 1,
            stdout: "stdout content".to_string(),
            stderr: "stderr content".to_string(),
        };
        assert_eq!(output.error_text(), "stderr content");
    }

    #[test]
    fn error_text_falls_back_to_stdout() {
        let output = CommandOutput {
            success: false,
            exit_code: 1,
            stdout: "stdout content".to_string(),
            stderr: String::new(),
        };
        assert_eq!(output.error_text(), "stdout content");
    }
}
