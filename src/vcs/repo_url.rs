//! Repository URL parsing.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::UsageError;

const SCHEMES: &[&str] = &["https", "http", "ssh", "git", "file"];

/// A git repository URL, optionally carrying a branch as `@branch` suffix.
///
/// Accepted shapes: `https://host/owner/repo(.git)`, `ssh://`, `git://`,
/// `file://`, any of those prefixed with `git+`, and scp-style
/// `user@host:owner/repo(.git)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitUrl {
    raw: String,
    name: String,
    branch: Option<String>,
}

impl GitUrl {
    /// Repository name: the last path segment without `.git` or branch.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// The URL to hand to `git clone`, with the branch suffix removed.
    pub fn clone_url(&self) -> &str {
        match &self.branch {
            Some(branch) => &self.raw[..self.raw.len() - branch.len() - 1],
            None => &self.raw,
        }
    }
}

impl fmt::Display for GitUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Path part of an scp-style `user@host:path` address.
fn scp_path(s: &str) -> Option<&str> {
    let (authority, path) = s.split_once(':')?;
    let (user, host) = authority.split_once('@')?;
    let valid = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    };
    if !valid(user) || !valid(host) || path.is_empty() || path.starts_with("//") {
        return None;
    }
    Some(path)
}

fn url_path(s: &str) -> Option<String> {
    let stripped = s.strip_prefix("git+").unwrap_or(s);
    let url = Url::parse(stripped).ok()?;
    if !SCHEMES.contains(&url.scheme()) {
        return None;
    }
    if url.scheme() != "file" && url.host_str().is_none_or(str::is_empty) {
        return None;
    }
    Some(url.path().to_string())
}

impl FromStr for GitUrl {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || UsageError::InvalidRepoUrl(s.to_string());

        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        let path = if s.contains("://") {
            url_path(s).ok_or_else(invalid)?
        } else {
            scp_path(s).ok_or_else(invalid)?.to_string()
        };

        let last = path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();

        let (name, branch) = match last.rsplit_once('@') {
            Some((_, "")) => return Err(invalid()),
            Some((name, branch)) => (name, Some(branch.to_string())),
            None => (last, None),
        };
        // The branch suffix must be the tail of the raw input.
        if let Some(branch) = &branch {
            if !s.ends_with(&format!("@{branch}")) {
                return Err(invalid());
            }
        }

        let name = name.strip_suffix(".git").unwrap_or(name);
        if name.is_empty() {
            return Err(invalid());
        }

        Ok(GitUrl {
            raw: s.to_string(),
            name: name.to_string(),
            branch,
        })
    }
}
