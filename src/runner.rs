use crate::console;
use crate::error::{ContributeError, Result};
use std::ffi::OsString;
use std::fmt;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Stdio};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<OsString>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn git() -> Self {
        Self::new("git")
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    Abort,
    // Return the output even when the process exits non-zero.
    ForceSucceed,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }

    pub fn run(&self, command: &CommandLine, dir: &Path) -> Result<String> {
        self.run_with(command, dir, OnFailure::Abort)
    }

    pub fn run_forced(&self, command: &CommandLine, dir: &Path) -> Result<String> {
        self.run_with(command, dir, OnFailure::ForceSucceed)
    }

    pub fn run_with(&self, command: &CommandLine, dir: &Path, on_failure: OnFailure) -> Result<String> {
        if !dir.is_dir() {
            return Err(ContributeError::DirectoryNotFound(dir.to_path_buf()));
        }

        console::trace(&command.program().to_uppercase(), dir, &command.to_string());

        // stdout and stderr share one pipe so the output keeps the order it was written in
        let (mut reader, writer) = io::pipe()?;
        let mut child = {
            let mut process = Command::new(&command.program);
            process
                .args(&command.args)
                .current_dir(dir)
                .stdin(Stdio::null())
                .stdout(writer.try_clone()?)
                .stderr(writer);
            process.spawn()?
        };

        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;
        let status = child.wait()?;
        let captured = String::from_utf8_lossy(&raw).into_owned();

        tracing::debug!(
            command = %command,
            dir = %dir.display(),
            status = ?status.code(),
            "command finished"
        );

        if !status.success() && on_failure == OnFailure::Abort {
            console::error(&captured);
            return Err(ContributeError::CommandFailed {
                command: command.to_string(),
                output: captured,
                code: status.code().unwrap_or(1),
            });
        }

        Ok(captured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_arguments() {
        let cmd = CommandLine::git().args(["remote", "add", "origin"]).arg("git@github.com:me/flow.git");
        assert_eq!(cmd.to_string(), "git remote add origin git@github.com:me/flow.git");
    }

    #[test]
    fn test_captures_output_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();
        let runner = CommandRunner::new();

        let out = runner.run(&CommandLine::git().arg("--version"), dir.path()).unwrap();
        assert!(out.starts_with("git version"));

        runner.run(&CommandLine::git().arg("init"), dir.path()).unwrap();
        let status = runner
            .run(&CommandLine::git().args(["status", "--porcelain"]), dir.path())
            .unwrap();
        assert!(status.contains("marker.txt"));
    }

    #[test]
    fn test_stdout_and_stderr_are_interleaved() {
        let dir = tempfile::tempdir().unwrap();
        let out = CommandRunner::new()
            .run(
                &CommandLine::new("sh").args(["-c", "echo one; echo two >&2; echo three"]),
                dir.path(),
            )
            .unwrap();
        assert_eq!(out, "one\ntwo\nthree\n");
    }

    #[test]
    fn test_non_zero_exit_fails_with_code_and_output() {
        let dir = tempfile::tempdir().unwrap();
        let err = CommandRunner::new()
            .run(&CommandLine::git().args(["rev-parse", "HEAD"]), dir.path())
            .unwrap_err();
        match err {
            ContributeError::CommandFailed { code, output, .. } => {
                assert_ne!(code, 0);
                assert!(output.contains("not a git repository"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_forced_run_returns_output_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let out = CommandRunner::new()
            .run_forced(&CommandLine::git().args(["remote", "rm", "origin"]), dir.path())
            .unwrap();
        assert!(!out.is_empty());
    }

    #[test]
    fn test_missing_directory_fails_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let err = CommandRunner::new()
            .run(&CommandLine::new("definitely-not-a-program"), &missing)
            .unwrap_err();
        assert!(matches!(err, ContributeError::DirectoryNotFound(p) if p == missing));
    }

    #[test]
    fn test_working_directory_is_not_changed() {
        let before = std::env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let _ = CommandRunner::new().run_forced(&CommandLine::git().arg("status"), dir.path());
        assert_eq!(std::env::current_dir().unwrap(), before);
    }
}
