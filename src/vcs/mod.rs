//! Version control: repository URLs and the git client.

mod git;
mod repo_url;

pub use git::{CommitInfo, Git, GitCli};
pub use repo_url::GitUrl;

#[cfg(test)]
pub use git::MockGit;
