//! Version-control query capability.
//!
//! This module defines the [`VersionControlQuery`] trait used by
//! [`GitInspector`](super::GitInspector). The production implementation is
//! [`ProcessRunner`](super::ProcessRunner); [`ScriptedQuery`] is an in-memory
//! double that can answer with output, a failing exit status, a timeout or a
//! missing executable.

use crate::error::QueryError;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Read-only queries against the version-control tool
pub trait VersionControlQuery: Send + Sync {
    /// Run the tool with `args` and return its trimmed standard output
    fn query(&self, args: &[&str]) -> Result<String, QueryError>;
}

/// Arguments for "short id of the current revision"
pub const SHORT_REVISION_ARGS: &[&str] = &["rev-parse", "--short", "HEAD"];

/// Arguments for "most recent reachable tag"
pub const LATEST_TAG_ARGS: &[&str] = &["describe", "--tags", "--abbrev=0"];

/// Arguments for "most recent tag excluding `excluded`"
pub fn previous_tag_args(excluded: &str) -> Vec<String> {
    vec![
        "describe".to_string(),
        "--tags".to_string(),
        "--abbrev=0".to_string(),
        "--exclude".to_string(),
        excluded.to_string(),
    ]
}

/// Canned answer for a [`ScriptedQuery`]
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// Successful run with the given stdout (trimmed before it is returned)
    Output(String),
    /// Run that exited with the given status code
    Exit(i32),
    /// Run that exceeded its timeout
    Timeout,
    /// Executable not installed
    Missing,
}

/// Scripted [`VersionControlQuery`] keyed by the space-joined argument list
///
/// Unscripted queries answer [`ScriptedResponse::Missing`]. Every query is
/// recorded so callers can assert on ordering.
#[derive(Debug, Default)]
pub struct ScriptedQuery {
    responses: HashMap<String, ScriptedResponse>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedQuery {
    /// Create a double with no scripted responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the response for an argument list
    pub fn on(mut self, args: &[&str], response: ScriptedResponse) -> Self {
        self.responses.insert(args.join(" "), response);
        self
    }

    /// Script a successful response
    pub fn output(self, args: &[&str], stdout: &str) -> Self {
        self.on(args, ScriptedResponse::Output(stdout.to_string()))
    }

    /// Queries received so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl VersionControlQuery for ScriptedQuery {
    fn query(&self, args: &[&str]) -> Result<String, QueryError> {
        let command = args.join(" ");
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command.clone());

        match self.responses.get(&command) {
            Some(ScriptedResponse::Output(stdout)) => {
                let trimmed = stdout.trim();
                if trimmed.is_empty() {
                    Err(QueryError::EmptyOutput { command })
                } else {
                    Ok(trimmed.to_string())
                }
            }
            Some(ScriptedResponse::Exit(code)) => Err(QueryError::NonZeroExit {
                command,
                code: Some(*code),
                stderr: "scripted failure".to_string(),
            }),
            Some(ScriptedResponse::Timeout) => Err(QueryError::TimedOut {
                command,
                timeout: Duration::from_secs(0),
            }),
            Some(ScriptedResponse::Missing) | None => Err(QueryError::Unavailable {
                program: "git".to_string(),
            }),
        }
    }
}
