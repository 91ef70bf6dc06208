use anyhow::Result;
use std::path::PathBuf;

use crate::application::{UpdateOptions, update};
use crate::config::Config;
use crate::runtime::Runtime;
use crate::toolchain::{PackageInstaller, WheelBuilder};
use crate::vcs::Git;

use super::Run;

/// Pull the wrapped repository and rebuild the package when it changed.
#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Directory of a package created by "wapp create"
    #[arg(value_name = "WRAPPED_DIR")]
    pub wrapped_dir: PathBuf,

    /// Reinstall the rebuilt package with pipx
    #[arg(long)]
    pub pipx: bool,
}

impl Run for UpdateArgs {
    fn run<R, G, B, I>(self, config: &Config<R, G, B, I>) -> Result<()>
    where
        R: Runtime,
        G: Git,
        B: WheelBuilder,
        I: PackageInstaller,
    {
        update(
            config,
            UpdateOptions {
                wrapped_dir: self.wrapped_dir,
                install: self.pipx,
            },
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UsageError;
    use crate::runtime::MockRuntime;
    use crate::test_utils::test_config;
    use crate::toolchain::{MockPackageInstaller, MockWheelBuilder};
    use crate::vcs::MockGit;

    #[test]
    fn test_run_reports_unwrapped_directory() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);
        let config = test_config(
            runtime,
            MockGit::new(),
            MockWheelBuilder::new(),
            MockPackageInstaller::new(),
        );

        let err = UpdateArgs {
            wrapped_dir: PathBuf::from("/nowhere"),
            pipx: false,
        }
        .run(&config)
        .unwrap_err();
        assert!(err.downcast_ref::<UsageError>().is_some());
    }
}
