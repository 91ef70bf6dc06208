use anyhow::{Context, Result, anyhow};
use log::debug;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::process::run_checked;

/// Directory below the project that receives built artifacts.
pub const DIST_DIR: &str = "dist";

/// Produces an installable artifact from a generated package layout.
#[cfg_attr(test, mockall::automock)]
pub trait WheelBuilder {
    /// Build `project_dir` and return the path of the resulting wheel.
    fn build_wheel(&self, project_dir: &Path) -> Result<PathBuf>;
}

/// [`WheelBuilder`] running `python -m build --wheel`.
pub struct PythonBuild {
    python: String,
}

impl PythonBuild {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }
}

impl Default for PythonBuild {
    fn default() -> Self {
        Self::new("python3")
    }
}

/// Most recently modified `*.whl` in `dist_dir`.
fn newest_wheel(dist_dir: &Path) -> Result<PathBuf> {
    let pattern = dist_dir.join("*.whl");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| anyhow!("Non UTF-8 path {}", dist_dir.display()))?;

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for wheel in glob::glob(pattern)? {
        let wheel = wheel?;
        let modified = wheel.metadata()?.modified()?;
        if newest.as_ref().is_none_or(|(time, _)| modified >= *time) {
            newest = Some((modified, wheel));
        }
    }
    newest
        .map(|(_, wheel)| wheel)
        .ok_or_else(|| anyhow!("No wheel found in {}", dist_dir.display()))
}

impl WheelBuilder for PythonBuild {
    #[tracing::instrument(level = "debug", skip(self))]
    fn build_wheel(&self, project_dir: &Path) -> Result<PathBuf> {
        let dist_dir = project_dir.join(DIST_DIR);
        run_checked(
            &self.python,
            [
                OsStr::new("-m"),
                OsStr::new("build"),
                OsStr::new("--wheel"),
                OsStr::new("--outdir"),
                dist_dir.as_os_str(),
                project_dir.as_os_str(),
            ],
            None,
        )
        .with_context(|| format!("Failed to build wheel for {}", project_dir.display()))?;

        let wheel = newest_wheel(&dist_dir)?;
        debug!("Built {}", wheel.display());
        Ok(wheel)
    }
}
