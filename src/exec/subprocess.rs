//! Subprocess execution and executable lookup

use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::error::UfetchError;

/// Result of a subprocess execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,

    /// Process exit code, `None` when terminated by a signal
    pub exit_code: Option<i32>,

    /// Execution duration
    pub duration: Duration,
}

impl CommandResult {
    /// Create a CommandResult from an exit status
    pub fn from_status(status: ExitStatus, duration: Duration) -> Self {
        Self {
            success: status.success(),
            exit_code: status.code(),
            duration,
        }
    }
}

/// Finds executables by name
pub trait ToolLocator {
    /// Full path of `program` if it can be executed
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

/// Looks executables up on `PATH`
#[derive(Debug, Default, Clone, Copy)]
pub struct PathLocator;

impl ToolLocator for PathLocator {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}

/// Runs external programs
pub trait ProcessRunner {
    /// Run `program` with `args` to completion
    fn run(&mut self, program: &str, args: &[String]) -> Result<CommandResult, UfetchError>;
}

/// Runs programs with inherited stdin/stdout/stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct InheritedRunner;

impl ProcessRunner for InheritedRunner {
    fn run(&mut self, program: &str, args: &[String]) -> Result<CommandResult, UfetchError> {
        run_command(program, args)
    }
}

/// Run a command synchronously, forwarding its output to the console
pub fn run_command(program: &str, args: &[String]) -> Result<CommandResult, UfetchError> {
    let start = Instant::now();

    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| UfetchError::io(program, "Failed to execute", e))?;

    Ok(CommandResult::from_status(status, start.elapsed()))
}

/// Render a command line for display
pub fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program.to_string())
        .chain(args.iter().map(|arg| {
            if arg.contains(' ') {
                format!("\"{}\"", arg)
            } else {
                arg.clone()
            }
        }))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_command() {
        let args = vec!["main.c".to_string(), "-o".to_string(), "my app".to_string()];
        assert_eq!(display_command("clang", &args), "clang main.c -o \"my app\"");
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let err = run_command("ufetch-definitely-not-a-real-program", &[]).unwrap_err();
        assert!(matches!(err, UfetchError::Io { .. }));
    }

    #[test]
    fn test_path_locator_misses_unknown_program() {
        assert!(PathLocator.locate("ufetch-definitely-not-a-real-program").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_is_relayed() {
        let result = run_command("sh", &["-c".to_string(), "exit 3".to_string()]).unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
    }
}
