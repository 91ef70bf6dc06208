//! Materializing the package layout around a checked-out repository.
//!
//! ```text
//! <dest>/pyproject.toml
//! <dest>/requirements.txt
//! <dest>/custom_requirements.txt     (only with extra dependencies)
//! <dest>/.wapp
//! <dest>/src/wrapped_<name>/wrapped_<script>.py
//! <dest>/src/wrapped_<name>/<name>/  (the repository)
//! ```

use anyhow::Result;
use indexmap::IndexMap;
use std::collections::HashMap;
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::error::UsageError;
use crate::naming::{WRAPPED_PREFIX, launcher_file_name};
use crate::package::{Launcher, Manifest, PackageFile, Requirements};
use crate::runtime::Runtime;

pub const MANIFEST_FILE: &str = "pyproject.toml";
pub const REQUIREMENTS_FILE: &str = "requirements.txt";
pub const CUSTOM_REQUIREMENTS_FILE: &str = "custom_requirements.txt";
pub const MARKER_FILE: &str = ".wapp";
pub const SOURCE_DIR: &str = "src";

/// `<dest>/src/wrapped_<name>`: the Python package holding the launchers.
pub fn package_dir(dest_dir: &Path, package_name: &str) -> PathBuf {
    dest_dir
        .join(SOURCE_DIR)
        .join(format!("{WRAPPED_PREFIX}{package_name}"))
}

/// `<dest>/src/wrapped_<name>/<name>`: the wrapped repository checkout.
pub fn checkout_dir(dest_dir: &Path, package_name: &str) -> PathBuf {
    package_dir(dest_dir, package_name).join(package_name)
}

/// Everything needed to (re)generate a wrapped package.
#[derive(Debug, Clone)]
pub struct WrapPlan<'a> {
    pub dest_dir: &'a Path,
    pub repo_dir: &'a Path,
    /// Dependencies requested on top of the repository's own requirements.
    pub extra_deps: &'a [String],
    pub package_name: &'a str,
    pub version: &'a str,
    /// Script path inside the repository -> command name.
    pub scripts: &'a IndexMap<String, String>,
}

/// Launcher file name per script, refusing targets that normalize alike.
fn launcher_names(scripts: &IndexMap<String, String>) -> Result<Vec<String>, UsageError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    scripts
        .keys()
        .map(|target| {
            let file_name = launcher_file_name(target);
            if let Some(first) = seen.insert(file_name.clone(), target.as_str()) {
                return Err(UsageError::LauncherConflict {
                    first: first.to_string(),
                    second: target.clone(),
                    launcher: file_name,
                });
            }
            Ok(file_name)
        })
        .collect()
}

fn log_requirements(title: &str, entries: &IndexMap<String, String>) {
    debug!("  {}:", title);
    for line in entries.values() {
        debug!("    {}", line);
    }
}

/// Write launchers, manifest, requirements and marker for `plan`.
///
/// Safe to run repeatedly on the same destination.
#[tracing::instrument(level = "debug", skip(runtime))]
pub fn wrap_project<R: Runtime>(runtime: &R, plan: &WrapPlan) -> Result<()> {
    let file_names = launcher_names(plan.scripts)?;
    let launcher_dir = package_dir(plan.dest_dir, plan.package_name);
    runtime.create_dir_all(&launcher_dir)?;

    let mut manifest = Manifest::new();
    manifest.set_name(plan.package_name);
    manifest.set_version(plan.version);

    info!("Exposed scripts:");
    for ((script_target, link_name), file_name) in plan.scripts.iter().zip(file_names) {
        info!("  {} -> {}", link_name, file_name);

        Launcher::new(plan.package_name, script_target)
            .write(runtime, &launcher_dir.join(&file_name))?;

        let normalized = file_name.strip_prefix(WRAPPED_PREFIX).unwrap_or(&file_name);
        manifest.add_script(normalized, link_name);
        manifest.record_source(link_name, script_target);
    }
    manifest.write(runtime, &plan.dest_dir.join(MANIFEST_FILE))?;

    let existing_path = plan.repo_dir.join(REQUIREMENTS_FILE);
    let mut requirements = if runtime.is_file(&existing_path) {
        Requirements::load(runtime, &existing_path)?
    } else {
        Requirements::new()
    };
    for dependency in plan.extra_deps {
        requirements.add_dependency(dependency);
    }
    debug!("Merging requirements:");
    log_requirements("Old requirements", requirements.existing());
    log_requirements("New requirements", requirements.pending());
    let merged = requirements.write_merged(runtime, &plan.dest_dir.join(REQUIREMENTS_FILE))?;
    log_requirements("Merged requirements", &merged);

    if !plan.extra_deps.is_empty() {
        let mut custom = Requirements::new();
        for dependency in plan.extra_deps {
            custom.add_dependency(dependency);
        }
        custom.write(runtime, &plan.dest_dir.join(CUSTOM_REQUIREMENTS_FILE))?;
    }

    runtime.touch(&plan.dest_dir.join(MARKER_FILE))?;
    Ok(())
}
