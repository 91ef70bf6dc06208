use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::path::Path;

use crate::process::{ToolOutput, run_captured};

/// Installs a built wheel for the current user.
#[cfg_attr(test, mockall::automock)]
pub trait PackageInstaller {
    /// Human readable command for installing (or upgrading) `wheel`.
    fn command_line(&self, wheel: &Path, upgrade: bool) -> String;

    /// Install `wheel`, replacing an existing installation when `upgrade` is set.
    ///
    /// A non-zero exit of the installer is reported in the output, not as an error.
    fn install(&self, wheel: &Path, upgrade: bool) -> Result<ToolOutput>;
}

/// [`PackageInstaller`] backed by pipx.
pub struct Pipx {
    program: String,
}

impl Pipx {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(upgrade: bool) -> &'static [&'static str] {
        if upgrade {
            &["install", "--force"]
        } else {
            &["install"]
        }
    }
}

impl Default for Pipx {
    fn default() -> Self {
        Self::new("pipx")
    }
}

impl PackageInstaller for Pipx {
    fn command_line(&self, wheel: &Path, upgrade: bool) -> String {
        format!(
            "{} {} {}",
            self.program,
            Self::args(upgrade).join(" "),
            wheel.display()
        )
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn install(&self, wheel: &Path, upgrade: bool) -> Result<ToolOutput> {
        let args = Self::args(upgrade)
            .iter()
            .map(OsStr::new)
            .chain(std::iter::once(wheel.as_os_str()));
        run_captured(&self.program, args, None)
            .with_context(|| format!("Failed to run {}", self.command_line(wheel, upgrade)))
    }
}
