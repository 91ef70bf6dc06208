//! Script specification parsing for the create command.

use std::fmt;
use std::str::FromStr;

use crate::error::UsageError;

/// A script to expose, optionally under a different command name.
/// Format: "path/to/script.py" or "path/to/script.py:command"
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ScriptSpec {
    pub target: String,
    pub link_name: String,
}

impl fmt::Display for ScriptSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.target == self.link_name {
            write!(f, "{}", self.target)
        } else {
            write!(f, "{}:{}", self.target, self.link_name)
        }
    }
}

impl FromStr for ScriptSpec {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| UsageError::InvalidScriptSpec {
            spec: s.to_string(),
            reason,
        };

        let (target, link_name) = match s.split_once(':') {
            Some((_, rest)) if rest.contains(':') => {
                return Err(invalid("too many ':' in the specification"));
            }
            Some((target, link_name)) => (target, link_name),
            None => (s, s),
        };
        if target.is_empty() || link_name.is_empty() {
            return Err(invalid("target or link name cannot be empty"));
        }

        Ok(ScriptSpec {
            target: target.to_string(),
            link_name: link_name.to_string(),
        })
    }
}
