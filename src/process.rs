//! Thin wrapper around `std::process::Command` for external tools.

use anyhow::{Context, Result, bail};
use log::debug;
use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

/// Exit status and combined output of a tool that is allowed to fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub output: String,
}

fn command<I, S>(program: &str, args: I, cwd: Option<&Path>) -> Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    cmd
}

/// Run a tool and return its stdout, failing when it exits non-zero.
pub fn run_checked<I, S>(program: &str, args: I, cwd: Option<&Path>) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = command(program, args, cwd);
    debug!("Running {:?}", cmd);
    let output = cmd
        .output()
        .with_context(|| format!("Failed to run {}", program))?;
    if !output.status.success() {
        bail!(
            "{} exited with {}: {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run a tool and capture stdout followed by stderr, whatever the exit status.
pub fn run_captured<I, S>(program: &str, args: I, cwd: Option<&Path>) -> Result<ToolOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = command(program, args, cwd);
    debug!("Running {:?}", cmd);
    let output = cmd
        .output()
        .with_context(|| format!("Failed to run {}", program))?;
    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok(ToolOutput {
        code: output.status.code(),
        output: combined,
    })
}
