use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use log::debug;
use std::ffi::OsStr;
use std::path::Path;

use crate::process::run_checked;

/// The commit a checkout currently points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Seven character abbreviated commit id.
    pub short_id: String,
    /// Committer timestamp in the committer's own offset.
    pub committed_at: DateTime<FixedOffset>,
}

impl CommitInfo {
    /// Package version for this commit: `0.0.0.dev0+<YYYYMMDD.HHMMSS>.<short id>`.
    pub fn version_string(&self) -> String {
        format!(
            "0.0.0.dev0+{}.{}",
            self.committed_at.format("%Y%m%d.%H%M%S"),
            self.short_id
        )
    }
}

/// The version-control operations the create and update flows rely on.
#[cfg_attr(test, mockall::automock)]
pub trait Git {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;
    fn checkout(&self, repo: &Path, branch: &str) -> Result<()>;
    fn pull(&self, repo: &Path) -> Result<()>;
    fn head_commit(&self, repo: &Path) -> Result<CommitInfo>;
}

/// [`Git`] backed by the `git` command line client.
pub struct GitCli {
    program: String,
}

impl GitCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn git_in(&self, repo: &Path, args: &[&str]) -> Result<String> {
        let mut full = vec![OsStr::new("-C"), repo.as_os_str()];
        full.extend(args.iter().map(OsStr::new));
        run_checked(&self.program, full, None)
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl Git for GitCli {
    #[tracing::instrument(level = "debug", skip(self))]
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        run_checked(
            &self.program,
            [
                OsStr::new("clone"),
                OsStr::new("--"),
                OsStr::new(url),
                dest.as_os_str(),
            ],
            None,
        )
        .with_context(|| format!("Failed to clone {}", url))?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn checkout(&self, repo: &Path, branch: &str) -> Result<()> {
        self.git_in(repo, &["checkout", branch])
            .with_context(|| format!("Failed to check out branch {}", branch))?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn pull(&self, repo: &Path) -> Result<()> {
        self.git_in(repo, &["pull", "origin"])
            .with_context(|| format!("Failed to pull {}", repo.display()))?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn head_commit(&self, repo: &Path) -> Result<CommitInfo> {
        let short_id = self
            .git_in(repo, &["rev-parse", "--short=7", "HEAD"])?
            .trim()
            .to_string();
        let date = self.git_in(repo, &["show", "-s", "--format=%cI", "HEAD"])?;
        let committed_at = DateTime::parse_from_rfc3339(date.trim())
            .with_context(|| format!("Unexpected commit date {:?}", date.trim()))?;
        debug!("HEAD of {} is {} from {}", repo.display(), short_id, committed_at);
        Ok(CommitInfo {
            short_id,
            committed_at,
        })
    }
}
