//! GitHub Actions context and run status.

use anyhow::{bail, Result};
use std::fmt;
use tracing::error;

/// A repository slug, `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    /// Parse an `owner/name` slug as found in `GITHUB_REPOSITORY`.
    pub fn parse(slug: &str) -> Result<Self> {
        let Some((owner, name)) = slug.split_once('/') else {
            bail!("Repository must be in the form owner/name, got '{}'", slug);
        };

        if owner.is_empty() || name.is_empty() || name.contains('/') {
            bail!("Repository must be in the form owner/name, got '{}'", slug);
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The workflow run this step executes in.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub event_name: String,
    pub repository: Option<Repository>,
    pub sha: String,
    pub pr_number: Option<u64>,
}

impl ActionContext {
    /// Push events only record statistics; no comparison is posted.
    pub fn is_push(&self) -> bool {
        self.event_name == "push"
    }
}

/// The single "has failed" flag of a run.
///
/// Failures are reported but do not stop the remaining steps; the flag
/// decides the exit code at the end.
#[derive(Debug, Default)]
pub struct FailureState {
    failed: bool,
}

impl FailureState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the run as failed and emit an `::error::` workflow command.
    pub fn set_failed(&mut self, message: impl fmt::Display) {
        let message = message.to_string();
        error!("{}", message);
        println!("{}", error_command(&message));
        self.failed = true;
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }

    pub fn exit_code(&self) -> i32 {
        if self.has_failed() {
            1
        } else {
            0
        }
    }
}

/// Format a workflow `::error::` command, escaping as the runner expects.
pub fn error_command(message: &str) -> String {
    let escaped = message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::error::{}", escaped)
}
