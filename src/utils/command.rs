//! Child process execution with explicit environment and stdout handling.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde::Serialize;

use crate::error::{Error, Result};

/// What to do with a child's standard output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StdoutMode {
    /// Stream to our own stdout (log lines).
    Inherit,
    /// Buffer everything in memory for the caller.
    Capture,
}

/// A fully-resolved child process invocation.
///
/// `env` is applied on top of the inherited environment; nothing is written
/// to this process's own environment.
#[derive(Debug, Clone, Serialize)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    #[serde(skip)]
    pub env: Vec<(String, String)>,
    pub stdout: StdoutMode,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            stdout: StdoutMode::Inherit,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn envs(mut self, vars: &[(String, String)]) -> Self {
        self.env.extend(vars.iter().cloned());
        self
    }

    pub fn capture_stdout(mut self) -> Self {
        self.stdout = StdoutMode::Capture;
        self
    }

    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Command line for logs: `program arg1 arg2`.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Result of a finished child process.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub success: bool,
    /// Empty unless stdout was captured.
    pub stdout: Vec<u8>,
}

impl ProcessOutput {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }
}

/// Seam between the pipeline and the operating system.
pub trait ProcessRunner {
    /// Run to completion. Spawn failures are errors; non-zero exits are not.
    fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput>;
}

/// Runs commands with `std::process`. Stderr is always inherited.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stderr(Stdio::inherit());

        let context = format!("run {}", spec.program.display());

        match spec.stdout {
            StdoutMode::Inherit => {
                let status = cmd
                    .stdout(Stdio::inherit())
                    .status()
                    .map_err(|e| Error::internal_io(e.to_string(), Some(context)))?;
                Ok(ProcessOutput {
                    exit_code: status.code(),
                    success: status.success(),
                    stdout: Vec::new(),
                })
            }
            StdoutMode::Capture => {
                let output = cmd
                    .stdout(Stdio::piped())
                    .output()
                    .map_err(|e| Error::internal_io(e.to_string(), Some(context)))?;
                Ok(ProcessOutput {
                    exit_code: output.status.code(),
                    success: output.status.success(),
                    stdout: output.stdout,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_builder_collects_args_and_env() {
        let spec = CommandSpec::new("python")
            .arg("main.py")
            .args(["-v", "1.0.0"])
            .envs(&[("A".to_string(), "1".to_string())])
            .envs(&[("A".to_string(), "2".to_string())])
            .capture_stdout();

        assert_eq!(spec.args, vec!["main.py", "-v", "1.0.0"]);
        assert_eq!(spec.env_value("A"), Some("2"));
        assert_eq!(spec.stdout, StdoutMode::Capture);
        assert_eq!(spec.display(), "python main.py -v 1.0.0");
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_captures_stdout() {
        let spec = CommandSpec::new("echo").arg("hello").capture_stdout();
        let output = SystemRunner.run(&spec).unwrap();

        assert!(output.success);
        assert_eq!(output.exit_code, Some(0));
        assert_eq!(output.stdout_text(), "hello\n");
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_passes_env_to_child_only() {
        let spec = CommandSpec::new("sh")
            .args(["-c", "printf %s \"$RELEASER_TEST_VALUE\""])
            .envs(&[("RELEASER_TEST_VALUE".to_string(), "abc".to_string())])
            .capture_stdout();
        let output = SystemRunner.run(&spec).unwrap();

        assert_eq!(output.stdout_text(), "abc");
        assert!(std::env::var("RELEASER_TEST_VALUE").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_reports_non_zero_exit() {
        let output = SystemRunner.run(&CommandSpec::new("false")).unwrap();
        assert!(!output.success);
        assert_eq!(output.exit_code, Some(1));
    }

    #[test]
    fn system_runner_fails_for_missing_program() {
        let result = SystemRunner.run(&CommandSpec::new("nonexistent_command_xyz"));
        assert!(result.is_err());
    }
}
