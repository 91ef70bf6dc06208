//! Subcommand arguments and their dispatch onto the application layer.

mod create;
mod update;

pub use create::CreateArgs;
pub use update::UpdateArgs;

use anyhow::Result;

use crate::config::Config;
use crate::runtime::Runtime;
use crate::toolchain::{PackageInstaller, WheelBuilder};
use crate::vcs::Git;

/// A parsed subcommand that can be executed against a [`Config`].
pub trait Run {
    fn run<R, G, B, I>(self, config: &Config<R, G, B, I>) -> Result<()>
    where
        R: Runtime,
        G: Git,
        B: WheelBuilder,
        I: PackageInstaller;
}
