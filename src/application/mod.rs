//! Application layer - Use cases that coordinate the package, vcs and toolchain modules.
//!
//! Both use cases end in the same place: a freshly laid out package
//! directory (see [`wrap`]) built into a wheel, optionally installed.

mod create;
mod discovery;
mod script_spec;
mod update;
pub mod wrap;

pub use create::{CreateOptions, CreateOutcome, create};
pub use discovery::{discover_scripts, is_python_file, list_python_files};
pub use script_spec::ScriptSpec;
pub use update::{UpdateOptions, UpdateOutcome, update};

use anyhow::Result;
use log::{info, warn};
use std::path::Path;

use crate::toolchain::PackageInstaller;

/// Install `wheel` when asked to, otherwise tell the user how to do it.
fn report_install<I: PackageInstaller>(
    installer: &I,
    wheel: &Path,
    upgrade: bool,
    install: bool,
) -> Result<()> {
    if !install {
        info!(
            "Run \"{}\" to install package",
            installer.command_line(wheel, upgrade)
        );
        return Ok(());
    }

    info!("Running {}", installer.command_line(wheel, upgrade));
    let result = installer.install(wheel, upgrade)?;
    for line in result.output.lines() {
        info!("  {}", line);
    }
    match result.code {
        Some(0) => info!("Installed {}", wheel.display()),
        Some(code) => warn!("Installer exited with code {}", code),
        None => warn!("Installer was terminated by a signal"),
    }
    Ok(())
}
