//! Files that make up a wrapped package
//!
//! - `manifest` - `pyproject.toml` with entry points for every exposed script
//! - `requirements` - `requirements.txt` merged across create/update runs
//! - `launcher` - per-script Python module that runs the original script

mod launcher;
mod manifest;
mod requirements;

use anyhow::Result;
use log::debug;
use std::path::Path;

use crate::runtime::Runtime;

pub use launcher::Launcher;
pub use manifest::Manifest;
pub use requirements::Requirements;

/// A generated file that can be persisted into the package layout.
pub trait PackageFile {
    /// File content as it will be written.
    fn render(&self) -> Result<String>;

    /// Create or overwrite `path` with the rendered content.
    fn write<R: Runtime>(&self, runtime: &R, path: &Path) -> Result<()> {
        runtime.write(path, self.render()?.as_bytes())?;
        debug!("Created {}", path.display());
        Ok(())
    }
}
