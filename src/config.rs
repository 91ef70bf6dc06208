use log::debug;

use crate::{
    runtime::Runtime,
    toolchain::{PackageInstaller, Pipx, PythonBuild, WheelBuilder},
    vcs::{Git, GitCli},
};

/// Overrides the git executable.
pub const GIT_ENV: &str = "WAPP_GIT";
/// Overrides the Python interpreter used to build wheels.
pub const PYTHON_ENV: &str = "WAPP_PYTHON";
/// Overrides the pipx executable.
pub const PIPX_ENV: &str = "WAPP_PIPX";

/// Collaborators shared by all commands.
pub struct Config<R: Runtime, G: Git, B: WheelBuilder, I: PackageInstaller> {
    pub runtime: R,
    pub git: G,
    pub builder: B,
    pub installer: I,
}

impl<R: Runtime> Config<R, GitCli, PythonBuild, Pipx> {
    pub fn new(runtime: R) -> Self {
        let tool = |key: &str, default: &str| {
            let program = runtime
                .env_var(key)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string());
            debug!("Using {} for {}", program, key);
            program
        };

        let git = GitCli::new(tool(GIT_ENV, "git"));
        let builder = PythonBuild::new(tool(PYTHON_ENV, "python3"));
        let installer = Pipx::new(tool(PIPX_ENV, "pipx"));

        Self {
            runtime,
            git,
            builder,
            installer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::path::Path;

    #[test]
    fn test_config_defaults() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .returning(|_| Err(std::env::VarError::NotPresent));

        let config = Config::new(runtime);
        assert_eq!(
            config.installer.command_line(Path::new("x.whl"), false),
            "pipx install x.whl"
        );
    }

    #[test]
    fn test_config_env_overrides() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .with(eq(PIPX_ENV))
            .returning(|_| Ok("/opt/bin/pipx".to_string()));
        runtime
            .expect_env_var()
            .with(eq(GIT_ENV))
            .returning(|_| Ok("  ".to_string()));
        runtime
            .expect_env_var()
            .returning(|_| Err(std::env::VarError::NotPresent));

        let config = Config::new(runtime);
        assert_eq!(
            config.installer.command_line(Path::new("x.whl"), true),
            "/opt/bin/pipx install --force x.whl"
        );
    }
}
