//! External process invocation for version-control queries.
//!
//! Uses spawn() + wait_timeout() so an unresponsive tool can never hang the
//! release. Output pipes are drained on helper threads while waiting.

use super::operations::VersionControlQuery;
use crate::error::QueryError;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Default timeout for a single query
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs an external program and captures its standard output
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: String,
    work_dir: PathBuf,
    timeout: Duration,
}

impl ProcessRunner {
    /// Create a runner for `program` executed in `work_dir`
    pub fn new(program: impl Into<String>, work_dir: impl AsRef<Path>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            work_dir: work_dir.as_ref().to_path_buf(),
            timeout,
        }
    }

    /// Runner for the `git` executable with the default timeout
    pub fn git(work_dir: impl AsRef<Path>) -> Self {
        Self::new("git", work_dir, DEFAULT_QUERY_TIMEOUT)
    }

    /// Program name
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Per-query timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the program and return trimmed, UTF-8 decoded stdout
    pub fn run(&self, args: &[&str]) -> Result<String, QueryError> {
        let command = format!("{} {}", self.program, args.join(" "));

        let executable = which::which(&self.program).map_err(|_| QueryError::Unavailable {
            program: self.program.clone(),
        })?;

        log::debug!("Running '{}' in {}", command, self.work_dir.display());

        let mut child = Command::new(executable)
            .args(args)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| QueryError::Spawn {
                command: command.clone(),
                source,
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                // Kill and reap so no zombie is left behind
                let _ = child.kill();
                let _ = child.wait();
                return Err(QueryError::TimedOut {
                    command,
                    timeout: self.timeout,
                });
            }
            Err(source) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(QueryError::Spawn { command, source });
            }
        };

        let stdout = collect(stdout);
        if !status.success() {
            return Err(QueryError::NonZeroExit {
                command,
                code: status.code(),
                stderr: collect(stderr).trim().to_string(),
            });
        }

        let trimmed = stdout.trim();
        if trimmed.is_empty() {
            return Err(QueryError::EmptyOutput { command });
        }

        Ok(trimmed.to_string())
    }
}

impl VersionControlQuery for ProcessRunner {
    fn query(&self, args: &[&str]) -> Result<String, QueryError> {
        self.run(args)
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = pipe.read_to_end(&mut buffer);
            buffer
        })
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|handle| handle.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_executable_is_unavailable() {
        let runner = ProcessRunner::new(
            "definitely-not-a-real-vcs-binary",
            ".",
            Duration::from_secs(1),
        );
        let result = runner.run(&["status"]);
        assert!(matches!(result, Err(QueryError::Unavailable { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_stdout_is_trimmed() {
        let runner = ProcessRunner::new("echo", ".", Duration::from_secs(5));
        assert_eq!(runner.run(&["  v1.2.0  "]).ok().as_deref(), Some("v1.2.0"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit() {
        let runner = ProcessRunner::new("false", ".", Duration::from_secs(5));
        assert!(matches!(
            runner.run(&[]),
            Err(QueryError::NonZeroExit { code: Some(1), .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_process() {
        let runner = ProcessRunner::new("sleep", ".", Duration::from_millis(100));
        let started = std::time::Instant::now();
        let result = runner.run(&["5"]);
        assert!(matches!(result, Err(QueryError::TimedOut { .. })));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_empty_output_is_an_error() {
        let runner = ProcessRunner::new("true", ".", Duration::from_secs(5));
        assert!(matches!(runner.run(&[]), Err(QueryError::EmptyOutput { .. })));
    }
}
