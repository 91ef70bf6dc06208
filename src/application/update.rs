//! Update use case - pulls the wrapped repository and rebuilds the package.

use anyhow::Result;
use log::info;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::UsageError;
use crate::naming::is_valid_package_name;
use crate::package::{Manifest, Requirements};
use crate::runtime::Runtime;
use crate::toolchain::{PackageInstaller, WheelBuilder};
use crate::vcs::Git;

use super::report_install;
use super::wrap::{
    CUSTOM_REQUIREMENTS_FILE, MANIFEST_FILE, MARKER_FILE, WrapPlan, checkout_dir, wrap_project,
};

/// Options for the update use case
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Directory produced by a previous create
    pub wrapped_dir: PathBuf,
    /// Reinstall the rebuilt wheel with the package installer
    pub install: bool,
}

/// Result of an update run.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// Upstream has no new commits; nothing was written.
    AlreadyLatest { version: String },
    Updated {
        from: String,
        to: String,
        wheel: PathBuf,
    },
}

#[tracing::instrument(level = "debug", skip(config))]
pub fn update<R, G, B, I>(config: &Config<R, G, B, I>, options: UpdateOptions) -> Result<UpdateOutcome>
where
    R: Runtime,
    G: Git,
    B: WheelBuilder,
    I: PackageInstaller,
{
    let runtime = &config.runtime;
    let dest_dir = options.wrapped_dir;

    if !runtime.exists(&dest_dir.join(MARKER_FILE)) {
        return Err(UsageError::NotWrapped(dest_dir).into());
    }
    let manifest_path = dest_dir.join(MANIFEST_FILE);
    if !runtime.is_file(&manifest_path) {
        return Err(UsageError::MissingManifest(dest_dir).into());
    }

    let custom_path = dest_dir.join(CUSTOM_REQUIREMENTS_FILE);
    let extra_deps: Vec<String> = if runtime.is_file(&custom_path) {
        Requirements::load(runtime, &custom_path)?
            .existing()
            .values()
            .cloned()
            .collect()
    } else {
        Vec::new()
    };

    let manifest = Manifest::load(runtime, &manifest_path)?;
    let package_name = manifest.name().to_string();
    if package_name.is_empty() || !is_valid_package_name(&package_name) {
        return Err(UsageError::InvalidPackageName(package_name).into());
    }

    let repo_dir = checkout_dir(&dest_dir, &package_name);
    if !runtime.exists(&repo_dir.join(".git")) {
        return Err(UsageError::MissingSource(dest_dir, repo_dir).into());
    }

    info!("Pulling latest changes into {}", repo_dir.display());
    config.git.pull(&repo_dir)?;
    let version = config.git.head_commit(&repo_dir)?.version_string();

    let previous = manifest.version().to_string();
    if version == previous {
        info!("Already latest revision {}", version);
        return Ok(UpdateOutcome::AlreadyLatest { version });
    }

    let scripts = manifest.script_map();
    wrap_project(
        runtime,
        &WrapPlan {
            dest_dir: &dest_dir,
            repo_dir: &repo_dir,
            extra_deps: &extra_deps,
            package_name: &package_name,
            version: &version,
            scripts: &scripts,
        },
    )?;
    let wheel = config.builder.build_wheel(&dest_dir)?;

    info!("Successfully updated wrapped package {}", package_name);
    info!("Package revision: {} -> {}", previous, version);
    report_install(&config.installer, &wheel, true, options.install)?;

    Ok(UpdateOutcome::Updated {
        from: previous,
        to: version,
        wheel,
    })
}
