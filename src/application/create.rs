//! Create use case - wraps a repository into a fresh package.

use anyhow::Result;
use indexmap::IndexMap;
use log::{info, warn};
use std::path::PathBuf;

use crate::config::Config;
use crate::error::UsageError;
use crate::naming::{is_valid_package_name, normalize_package_name};
use crate::runtime::Runtime;
use crate::toolchain::{PackageInstaller, WheelBuilder};
use crate::vcs::{Git, GitUrl};

use super::discovery::{discover_scripts, list_python_files};
use super::script_spec::ScriptSpec;
use super::wrap::{WrapPlan, checkout_dir, wrap_project};
use super::report_install;

/// Options for the create use case
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Git URL of the repository, optionally suffixed with `@branch`
    pub repo_url: String,
    /// Package name; derived from the repository name when absent
    pub package_name: Option<String>,
    /// Output directory; `<cwd>/<package_name>` when absent
    pub dest_dir: Option<PathBuf>,
    /// Raw `target[:link]` specifications; all root scripts when empty
    pub scripts: Vec<String>,
    /// Extra dependencies added to the repository's requirements
    pub requires: Vec<String>,
    /// Install the built wheel with the package installer
    pub install: bool,
}

/// What a successful create produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOutcome {
    pub package_name: String,
    pub version: String,
    pub dest_dir: PathBuf,
    pub wheel: PathBuf,
}

fn parse_scripts(specs: &[String]) -> Result<IndexMap<String, String>, UsageError> {
    specs
        .iter()
        .map(|raw| {
            let spec = raw.parse::<ScriptSpec>()?;
            Ok((spec.target, spec.link_name))
        })
        .collect()
}

fn resolve_package_name(given: Option<&str>, url: &GitUrl) -> Result<String, UsageError> {
    match given {
        Some(name) if !name.is_empty() && is_valid_package_name(name) => Ok(name.to_string()),
        Some(name) => Err(UsageError::InvalidPackageName(name.to_string())),
        None => {
            let name = normalize_package_name(url.name());
            if name.is_empty() {
                return Err(UsageError::InvalidPackageName(url.name().to_string()));
            }
            Ok(name)
        }
    }
}

#[tracing::instrument(level = "debug", skip(config))]
pub fn create<R, G, B, I>(config: &Config<R, G, B, I>, options: CreateOptions) -> Result<CreateOutcome>
where
    R: Runtime,
    G: Git,
    B: WheelBuilder,
    I: PackageInstaller,
{
    let runtime = &config.runtime;

    let mut scripts = parse_scripts(&options.scripts)?;
    let url = options.repo_url.parse::<GitUrl>()?;
    let package_name = resolve_package_name(options.package_name.as_deref(), &url)?;

    let dest_dir = match options.dest_dir {
        Some(dir) => dir,
        None => runtime.current_dir()?.join(&package_name),
    };
    if !runtime.exists(&dest_dir) {
        runtime.create_dir_all(&dest_dir)?;
        info!("Created {}", dest_dir.display());
    }
    if !runtime.read_dir(&dest_dir)?.is_empty() {
        return Err(UsageError::DestinationNotEmpty(dest_dir).into());
    }

    let repo_dir = checkout_dir(&dest_dir, &package_name);
    runtime.create_dir_all(&repo_dir)?;

    info!("Cloning {} into {}", url.clone_url(), repo_dir.display());
    config.git.clone_repo(url.clone_url(), &repo_dir)?;
    if let Some(branch) = url.branch() {
        info!("Switching branch to {}", branch);
        config.git.checkout(&repo_dir, branch)?;
    }
    let version = config.git.head_commit(&repo_dir)?.version_string();

    info!("Enumerating exposed scripts:");
    if scripts.is_empty() {
        scripts = discover_scripts(runtime, &repo_dir)?
            .into_iter()
            .map(|name| (name.clone(), name))
            .collect();
        if scripts.is_empty() {
            warn!("No Python scripts found in the root of {}", url);
        }
    } else {
        let available = list_python_files(runtime, &repo_dir)?;
        if let Some(missing) = scripts.keys().find(|target| !available.contains(*target)) {
            return Err(UsageError::ScriptNotFound(missing.clone()).into());
        }
    }

    wrap_project(
        runtime,
        &WrapPlan {
            dest_dir: &dest_dir,
            repo_dir: &repo_dir,
            extra_deps: &options.requires,
            package_name: &package_name,
            version: &version,
            scripts: &scripts,
        },
    )?;
    let wheel = config.builder.build_wheel(&dest_dir)?;

    info!("Successfully created wrapped package {}", package_name);
    info!("Package revision: {}", version);
    report_install(&config.installer, &wheel, false, options.install)?;

    Ok(CreateOutcome {
        package_name,
        version,
        dest_dir,
        wheel,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Manifest;
    use crate::runtime::{MockRuntime, RealRuntime};
    use crate::test_utils::{commit_info, test_config};
    use crate::toolchain::{MockPackageInstaller, MockWheelBuilder};
    use crate::vcs::MockGit;
    use super::super::wrap::{MANIFEST_FILE, MARKER_FILE, package_dir};
    use mockall::predicate::eq;
    use std::fs;
    use tempfile::tempdir;

    /// Git mock whose clone writes `files` into the destination.
    fn cloning_git(files: &'static [(&'static str, &'static str)]) -> MockGit {
        let mut git = MockGit::new();
        git.expect_clone_repo().times(1).returning(move |_, dest| {
            for (name, content) in files {
                let path = dest.join(name);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, content).unwrap();
            }
            Ok(())
        });
        git.expect_head_commit()
            .returning(|_| Ok(commit_info("abc1234", "2024-01-02T03:04:05+00:00")));
        git
    }

    fn wheel_builder() -> MockWheelBuilder {
        let mut builder = MockWheelBuilder::new();
        builder
            .expect_build_wheel()
            .times(1)
            .returning(|dir| Ok(dir.join("dist/pkg-0.0.0-py3-none-any.whl")));
        builder
    }

    fn quiet_installer() -> MockPackageInstaller {
        let mut installer = MockPackageInstaller::new();
        installer
            .expect_command_line()
            .returning(|wheel, _| format!("pipx install {}", wheel.display()));
        installer
    }

    #[test_log::test]
    fn test_create_discovers_root_scripts() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out");
        let config = test_config(
            RealRuntime,
            cloning_git(&[("main.py", "print('hi')\n"), ("lib/util.py", "\n")]),
            wheel_builder(),
            quiet_installer(),
        );

        let outcome = create(
            &config,
            CreateOptions {
                repo_url: "https://github.com/owner/my-tools.git".to_string(),
                dest_dir: Some(dest.clone()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(outcome.package_name, "my_tools");
        assert_eq!(outcome.version, "0.0.0.dev0+20240102.030405.abc1234");
        assert!(dest.join(MARKER_FILE).is_file());

        let manifest = Manifest::load(&RealRuntime, &dest.join(MANIFEST_FILE)).unwrap();
        assert_eq!(manifest.scripts().len(), 1);
        assert_eq!(manifest.scripts()["main.py"], "main.py");

        let launcher =
            fs::read_to_string(package_dir(&dest, "my_tools").join("wrapped_main.py")).unwrap();
        assert!(launcher.contains(r#""my_tools")"#));
        assert!(launcher.contains(r#"script_target = "main.py""#));
        assert!(package_dir(&dest, "my_tools").join("my_tools/main.py").is_file());
    }

    #[test]
    fn test_create_with_branch_and_explicit_scripts() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out");
        let mut git = cloning_git(&[("bin/tool.py", "\n"), ("main.py", "\n")]);
        git.expect_checkout()
            .withf(|_, branch| branch == "dev")
            .times(1)
            .returning(|_, _| Ok(()));
        let mut installer = MockPackageInstaller::new();
        installer
            .expect_command_line()
            .returning(|_, _| "pipx install".to_string());
        installer.expect_install().times(1).returning(|_, upgrade| {
            assert!(!upgrade);
            Ok(crate::process::ToolOutput {
                code: Some(0),
                output: "installed package tool\n".to_string(),
            })
        });
        let config = test_config(RealRuntime, git, wheel_builder(), installer);

        create(
            &config,
            CreateOptions {
                repo_url: "git@github.com:owner/repo.git@dev".to_string(),
                package_name: Some("custom".to_string()),
                dest_dir: Some(dest.clone()),
                scripts: vec!["bin/tool.py:tool".to_string()],
                requires: vec!["click".to_string()],
                install: true,
            },
        )
        .unwrap();

        let manifest = Manifest::load(&RealRuntime, &dest.join(MANIFEST_FILE)).unwrap();
        assert_eq!(manifest.name(), "custom");
        assert_eq!(manifest.scripts()["tool"], "bin_tool.py");
        assert_eq!(manifest.sources()["tool"], "bin/tool.py");
        assert_eq!(
            fs::read_to_string(dest.join("custom_requirements.txt")).unwrap(),
            "click\n"
        );
    }

    #[test]
    fn test_create_rejects_missing_script() {
        let dir = tempdir().unwrap();
        let config = test_config(
            RealRuntime,
            cloning_git(&[("main.py", "\n")]),
            MockWheelBuilder::new(),
            MockPackageInstaller::new(),
        );

        let err = create(
            &config,
            CreateOptions {
                repo_url: "https://github.com/owner/repo".to_string(),
                dest_dir: Some(dir.path().join("out")),
                scripts: vec!["nope.py".to_string()],
                ..Default::default()
            },
        )
        .unwrap_err();

        assert_eq!(
            err.downcast_ref::<UsageError>(),
            Some(&UsageError::ScriptNotFound("nope.py".to_string()))
        );
    }

    #[test]
    fn test_create_rejects_non_empty_destination() {
        let mut runtime = MockRuntime::new();
        let dest = PathBuf::from("/work/out");
        runtime
            .expect_exists()
            .with(eq(dest.clone()))
            .returning(|_| true);
        runtime
            .expect_read_dir()
            .with(eq(dest.clone()))
            .returning(|p| Ok(vec![p.join("leftover.txt")]));
        let config = test_config(
            runtime,
            MockGit::new(),
            MockWheelBuilder::new(),
            MockPackageInstaller::new(),
        );

        let err = create(
            &config,
            CreateOptions {
                repo_url: "https://github.com/owner/repo".to_string(),
                dest_dir: Some(dest.clone()),
                ..Default::default()
            },
        )
        .unwrap_err();

        assert_eq!(
            err.downcast_ref::<UsageError>(),
            Some(&UsageError::DestinationNotEmpty(dest))
        );
    }

    #[test]
    fn test_create_validates_before_touching_disk() {
        // No runtime expectations: any file system access would panic.
        let config = test_config(
            MockRuntime::new(),
            MockGit::new(),
            MockWheelBuilder::new(),
            MockPackageInstaller::new(),
        );

        let cases = [
            (
                CreateOptions {
                    repo_url: "https://github.com/owner/repo".to_string(),
                    scripts: vec!["a.py:b:c".to_string()],
                    ..Default::default()
                },
                "Invalid script specification",
            ),
            (
                CreateOptions {
                    repo_url: "not-a-repo".to_string(),
                    ..Default::default()
                },
                "invalid, specify another repo",
            ),
            (
                CreateOptions {
                    repo_url: "https://github.com/owner/repo".to_string(),
                    package_name: Some("bad-name".to_string()),
                    ..Default::default()
                },
                "invalid package name",
            ),
        ];

        for (options, message) in cases {
            let err = create(&config, options).unwrap_err();
            assert!(err.downcast_ref::<UsageError>().is_some());
            assert!(err.to_string().contains(message), "{err}");
        }
    }

    #[test]
    fn test_default_destination_is_named_after_package() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_current_dir()
            .returning(|| Ok(PathBuf::from("/work")));
        runtime
            .expect_exists()
            .with(eq(PathBuf::from("/work/repo")))
            .returning(|_| true);
        runtime
            .expect_read_dir()
            .with(eq(PathBuf::from("/work/repo")))
            .returning(|p| Ok(vec![p.join("x")]));
        let config = test_config(
            runtime,
            MockGit::new(),
            MockWheelBuilder::new(),
            MockPackageInstaller::new(),
        );

        let err = create(
            &config,
            CreateOptions {
                repo_url: "https://github.com/owner/repo.git".to_string(),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("/work/repo"));
    }
}
