//! External Python tooling: wheel building and pipx installation.

mod build;
mod pipx;

pub use build::{PythonBuild, WheelBuilder};
pub use pipx::{PackageInstaller, Pipx};

#[cfg(test)]
pub use build::MockWheelBuilder;
#[cfg(test)]
pub use pipx::MockPackageInstaller;
