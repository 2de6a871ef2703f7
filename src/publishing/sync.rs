//! Version-control sync of the generated site

use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Error types for site sync
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} timed out after {secs} seconds")]
    Timeout { command: String, secs: u64 },

    #[error("{command} exited with code {code}: {stderr}")]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },
}

/// What happened to the sync step of a publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    Skipped,
    Synced { pushed: bool },
    Failed { error: String },
}

impl SyncOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, SyncOutcome::Failed { .. })
    }
}

/// Trait for pushing published output somewhere durable
#[async_trait]
pub trait SiteSync: Send + Sync {
    /// Record the current output with the given message. Returns whether
    /// the change was pushed upstream.
    async fn sync(&self, message: &str) -> Result<bool, SyncError>;
}

/// Commits the output directory with git and optionally pushes
#[derive(Debug, Clone)]
pub struct GitSync {
    repo_root: PathBuf,
    output_dir: PathBuf,
    push: bool,
    timeout_secs: u64,
}

impl GitSync {
    pub fn new(repo_root: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            output_dir: output_dir.into(),
            push: false,
            timeout_secs: 60,
        }
    }

    pub fn with_push(mut self, push: bool) -> Self {
        self.push = push;
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    async fn git(&self, args: &[&str]) -> Result<(), SyncError> {
        let command = format!("git {}", args.first().copied().unwrap_or_default());
        debug!("Running git {:?} in {}", args, self.repo_root.display());

        let output = timeout(
            Duration::from_secs(self.timeout_secs),
            Command::new("git")
                .args(args)
                .current_dir(&self.repo_root)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| SyncError::Timeout {
            command: command.clone(),
            secs: self.timeout_secs,
        })?
        .map_err(|source| SyncError::Spawn {
            command: command.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(SyncError::Failed {
                command,
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SiteSync for GitSync {
    async fn sync(&self, message: &str) -> Result<bool, SyncError> {
        let output_dir = self.output_dir.to_string_lossy();
        self.git(&["add", &*output_dir]).await?;
        self.git(&["commit", "-m", message]).await?;
        info!("Git commit created: {}", message);

        if self.push {
            if let Err(e) = self.git(&["push"]).await {
                warn!("Git push failed: {}", e);
                return Err(e);
            }
            info!("Git push successful");
        }
        Ok(self.push)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sync_outside_a_repo_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sync = GitSync::new(dir.path(), "src").with_timeout(10);

        let result = sync.sync("Publish recipe: Test").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_outcome_json() {
        let json = serde_json::to_value(SyncOutcome::Synced { pushed: true }).unwrap();
        assert_eq!(json["outcome"], "synced");
        assert_eq!(json["pushed"], true);
        assert!(SyncOutcome::Failed { error: "x".to_string() }.is_failed());
    }
}
