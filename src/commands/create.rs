use anyhow::Result;
use std::path::PathBuf;

use crate::application::{CreateOptions, create};
use crate::config::Config;
use crate::runtime::Runtime;
use crate::toolchain::{PackageInstaller, WheelBuilder};
use crate::vcs::Git;

use super::Run;

/// Wrap a git repository of Python scripts into an installable package.
#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Git URL of the repository, optionally suffixed with "@branch"
    #[arg(value_name = "REPO_URL")]
    pub repo_url: String,

    /// Name of the package (defaults to the normalized repository name)
    #[arg(long = "package_name", visible_alias = "package-name", value_name = "NAME")]
    pub package_name: Option<String>,

    /// Output directory (defaults to ./<package_name>)
    #[arg(long = "dest_dir", visible_alias = "dest-dir", value_name = "DIR")]
    pub dest_dir: Option<PathBuf>,

    /// Scripts to expose, as "path/in/repo.py" or "path/in/repo.py:command".
    /// All Python scripts in the repository root when omitted
    #[arg(long, num_args = 0.., value_name = "SPEC")]
    pub scripts: Vec<String>,

    /// Extra dependencies, merged over the repository's requirements.txt
    #[arg(long, num_args = 1.., value_name = "DEP")]
    pub requires: Vec<String>,

    /// Install the built package with pipx
    #[arg(long)]
    pub pipx: bool,
}

impl From<CreateArgs> for CreateOptions {
    fn from(args: CreateArgs) -> Self {
        CreateOptions {
            repo_url: args.repo_url,
            package_name: args.package_name,
            dest_dir: args.dest_dir,
            scripts: args.scripts,
            requires: args.requires,
            install: args.pipx,
        }
    }
}

impl Run for CreateArgs {
    fn run<R, G, B, I>(self, config: &Config<R, G, B, I>) -> Result<()>
    where
        R: Runtime,
        G: Git,
        B: WheelBuilder,
        I: PackageInstaller,
    {
        create(config, self.into())?;
        Ok(())
    }
}
