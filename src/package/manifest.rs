use anyhow::{Context, Result};
use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::naming::WRAPPED_PREFIX;
use crate::runtime::Runtime;

use super::PackageFile;

const DEFAULT_NAME: &str = "package";
const DEFAULT_VERSION: &str = "0.0.0";
const ENTRY_FUNCTION: &str = ":main";

/// On-disk layout of `pyproject.toml`.
///
/// Every section except `[project]` falls back to the template, so a
/// manifest that lost its build configuration still loads.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
struct PyProject {
    #[serde(default)]
    build_system: BuildSystem,
    project: Project,
    #[serde(default)]
    tool: Tool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
struct BuildSystem {
    requires: Vec<String>,
    build_backend: String,
}

impl Default for BuildSystem {
    fn default() -> Self {
        Self {
            requires: vec!["setuptools".to_string(), "wheel".to_string()],
            build_backend: "setuptools.build_meta".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct Project {
    #[serde(default)]
    dynamic: Vec<String>,
    name: String,
    version: String,
    #[serde(default)]
    scripts: IndexMap<String, String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
struct Tool {
    #[serde(default)]
    setuptools: Setuptools,
    #[serde(default, skip_serializing_if = "WappTable::is_empty")]
    wapp: WappTable,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
struct Setuptools {
    include_package_data: bool,
    py_modules: Vec<String>,
    package_data: IndexMap<String, Vec<String>>,
    dynamic: SetuptoolsDynamic,
    packages: Packages,
}

impl Default for Setuptools {
    fn default() -> Self {
        Self {
            include_package_data: true,
            py_modules: Vec::new(),
            package_data: IndexMap::from([(
                "*".to_string(),
                vec!["*".to_string(), "*/**".to_string()],
            )]),
            dynamic: SetuptoolsDynamic {
                dependencies: FileRef {
                    file: vec!["requirements.txt".to_string()],
                },
            },
            packages: Packages {
                find: Find {
                    r#where: vec!["src".to_string()],
                },
            },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct SetuptoolsDynamic {
    dependencies: FileRef,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct FileRef {
    file: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct Packages {
    find: Find,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct Find {
    r#where: Vec<String>,
}

/// `[tool.wapp]`: link name -> script path inside the wrapped repository.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
struct WappTable {
    #[serde(default)]
    sources: IndexMap<String, String>,
}

impl WappTable {
    fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Package manifest of a wrapped project.
///
/// `scripts` maps each exposed command (link name) to the normalized
/// launcher target, e.g. `run -> sub_dir_script.py`. `sources` remembers the
/// original script path per command so launchers can be regenerated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Manifest {
    name: String,
    version: String,
    scripts: IndexMap<String, String>,
    sources: IndexMap<String, String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    #[tracing::instrument(level = "debug", skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime.read_to_string(path)?;
        let manifest = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!("Loaded {}", path.display());
        Ok(manifest)
    }

    fn parse(content: &str) -> Result<Self> {
        let doc: PyProject = toml::from_str(content)?;
        let Project {
            name,
            version,
            scripts: entry_points,
            ..
        } = doc.project;

        let package_prefix = format!("{WRAPPED_PREFIX}{name}.");
        let scripts = entry_points
            .into_iter()
            .map(|(link_name, entry)| {
                let module = entry.strip_prefix(&package_prefix).unwrap_or(&entry);
                let module = module.strip_prefix(WRAPPED_PREFIX).unwrap_or(module);
                let module = module.split(':').next().unwrap_or_default();
                (link_name, format!("{module}.py"))
            })
            .collect();

        Ok(Self {
            name,
            version,
            scripts,
            sources: doc.tool.wapp.sources,
        })
    }

    /// Expose `script_target` as the command `link_name`, replacing any
    /// previous target of that command.
    pub fn add_script(&mut self, script_target: &str, link_name: &str) {
        self.scripts
            .insert(link_name.to_string(), script_target.to_string());
    }

    /// Remember where the command's script lives inside the wrapped repository.
    pub fn record_source(&mut self, link_name: &str, original_path: &str) {
        self.sources
            .insert(link_name.to_string(), original_path.to_string());
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn set_version(&mut self, version: &str) {
        self.version = version.to_string();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn scripts(&self) -> &IndexMap<String, String> {
        &self.scripts
    }

    pub fn sources(&self) -> &IndexMap<String, String> {
        &self.sources
    }

    /// Original script path for every command, keyed by script path.
    ///
    /// Commands without a recorded source fall back to their normalized target.
    pub fn script_map(&self) -> IndexMap<String, String> {
        self.scripts
            .iter()
            .map(|(link_name, target)| {
                let original = self.sources.get(link_name).unwrap_or(target);
                (original.clone(), link_name.clone())
            })
            .collect()
    }

    fn document(&self) -> PyProject {
        let name = if self.name.is_empty() {
            warn!("No package name set, defaulting to name \"{DEFAULT_NAME}\"");
            DEFAULT_NAME
        } else {
            self.name.as_str()
        };
        let version = if self.version.is_empty() {
            warn!("No package version set, defaulting to \"{DEFAULT_VERSION}\"");
            DEFAULT_VERSION
        } else {
            self.version.as_str()
        };

        let mut modules = IndexSet::new();
        let mut entry_points = IndexMap::new();
        for (link_name, target) in &self.scripts {
            let module = target.strip_suffix(".py").unwrap_or(target);
            modules.insert(format!("{WRAPPED_PREFIX}{module}"));
            entry_points.insert(
                link_name.clone(),
                format!("{WRAPPED_PREFIX}{name}.{WRAPPED_PREFIX}{module}{ENTRY_FUNCTION}"),
            );
        }

        PyProject {
            build_system: BuildSystem::default(),
            project: Project {
                dynamic: vec!["dependencies".to_string()],
                name: name.to_string(),
                version: version.to_string(),
                scripts: entry_points,
            },
            tool: Tool {
                setuptools: Setuptools {
                    py_modules: modules.into_iter().collect(),
                    ..Setuptools::default()
                },
                wapp: WappTable {
                    sources: self.sources.clone(),
                },
            },
        }
    }
}

impl PackageFile for Manifest {
    fn render(&self) -> Result<String> {
        Ok(toml::to_string(&self.document())?)
    }
}
