use anyhow::Result;
use indexmap::IndexMap;
use log::debug;
use std::path::Path;

use crate::naming::requirement_key;
use crate::runtime::Runtime;
use crate::vcs::GitUrl;

use super::PackageFile;

/// A `requirements.txt` with merge-on-write semantics.
///
/// Entries are keyed by the package name inferred from each line. Lines added
/// through [`Requirements::add_dependency`] override loaded lines with the same
/// key in place; new keys are appended.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Requirements {
    existing: IndexMap<String, String>,
    pending: IndexMap<String, String>,
}

impl Requirements {
    pub fn new() -> Self {
        Self::default()
    }

    #[tracing::instrument(level = "debug", skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime.read_to_string(path)?;
        let requirements = Self::parse(&content);
        debug!("Loaded {}", path.display());
        Ok(requirements)
    }

    fn parse(content: &str) -> Self {
        let existing = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| (requirement_key(line).to_string(), line.to_string()))
            .collect();
        Self {
            existing,
            pending: IndexMap::new(),
        }
    }

    /// Queue a requirement. A bare VCS URL is rewritten to `<name> @ <url>`.
    pub fn add_dependency(&mut self, spec: &str) {
        let line = match spec.parse::<GitUrl>() {
            Ok(url) => format!("{} @ {}", url.name(), spec),
            Err(_) => spec.to_string(),
        };
        self.pending
            .insert(requirement_key(&line).to_string(), line);
    }

    /// Requirements loaded from disk.
    pub fn existing(&self) -> &IndexMap<String, String> {
        &self.existing
    }

    /// Requirements queued since loading.
    pub fn pending(&self) -> &IndexMap<String, String> {
        &self.pending
    }

    /// Loaded requirements overlaid with the queued ones.
    pub fn merged(&self) -> IndexMap<String, String> {
        let mut merged = self.existing.clone();
        for (key, line) in &self.pending {
            // IndexMap::insert keeps the position of an existing key
            merged.insert(key.clone(), line.clone());
        }
        merged
    }

    /// Write the merged requirements and hand them back for inspection.
    pub fn write_merged<R: Runtime>(
        &self,
        runtime: &R,
        path: &Path,
    ) -> Result<IndexMap<String, String>> {
        let merged = self.merged();
        runtime.write(path, render_lines(merged.values()).as_bytes())?;
        debug!("Created {}", path.display());
        Ok(merged)
    }
}

fn render_lines<'a>(lines: impl Iterator<Item = &'a String>) -> String {
    lines.fold(String::new(), |mut out, line| {
        out.push_str(line);
        out.push('\n');
        out
    })
}

impl PackageFile for Requirements {
    fn render(&self) -> Result<String> {
        Ok(render_lines(self.merged().values()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn pairs(map: &IndexMap<String, String>) -> Vec<(&str, &str)> {
        map.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    #[test]
    fn test_parse_keys_by_package_name() {
        let reqs = Requirements::parse("requests>=2.0\n\n  numpy==1.26  \n# pinned\nrich\n");
        assert_eq!(
            pairs(reqs.existing()),
            vec![
                ("requests", "requests>=2.0"),
                ("numpy", "numpy==1.26"),
                ("rich", "rich"),
            ]
        );
        assert!(reqs.pending().is_empty());
    }

    #[test]
    fn test_merge_updates_in_place_and_appends() {
        let mut reqs = Requirements::parse("foo==1.0\nbaz\n");
        reqs.add_dependency("foo==2.0");
        reqs.add_dependency("bar==3.0");

        assert_eq!(
            pairs(&reqs.merged()),
            vec![("foo", "foo==2.0"), ("baz", "baz"), ("bar", "bar==3.0")]
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let new_deps = ["foo==2.0", "bar==3.0"];

        let mut first = Requirements::parse("foo==1.0\nqux<4\n");
        new_deps.iter().for_each(|d| first.add_dependency(d));
        let once = first.render().unwrap();

        let mut second = Requirements::parse(&once);
        new_deps.iter().for_each(|d| second.add_dependency(d));
        let twice = second.render().unwrap();

        assert_eq!(once, twice);
        assert_eq!(once, "foo==2.0\nqux<4\nbar==3.0\n");
    }

    #[test]
    fn test_pending_overwrites_within_same_run() {
        let mut reqs = Requirements::new();
        reqs.add_dependency("foo==1.0");
        reqs.add_dependency("foo>=2");
        assert_eq!(pairs(reqs.pending()), vec![("foo", "foo>=2")]);
    }

    #[test]
    fn test_vcs_dependency_is_rewritten() {
        let mut reqs = Requirements::new();
        reqs.add_dependency("git+https://github.com/owner/helper_lib.git");
        assert_eq!(
            pairs(reqs.pending()),
            vec![(
                "helper_lib",
                "helper_lib @ git+https://github.com/owner/helper_lib.git"
            )]
        );
    }

    #[test]
    fn test_rewritten_vcs_line_is_not_rewritten_again() {
        let mut reqs = Requirements::new();
        reqs.add_dependency("helper_lib @ git+https://github.com/owner/helper_lib.git");
        assert_eq!(
            reqs.pending()["helper_lib"],
            "helper_lib @ git+https://github.com/owner/helper_lib.git"
        );
    }

    #[test]
    fn test_write_merged_returns_what_was_written() {
        let mut runtime = MockRuntime::new();
        let path = PathBuf::from("/out/requirements.txt");
        let expected = path.clone();
        runtime
            .expect_write()
            .withf(move |p, contents| p == expected.as_path() && contents == b"foo==2.0\nbar\n")
            .times(1)
            .returning(|_, _| Ok(()));

        let mut reqs = Requirements::parse("foo==1.0\n");
        reqs.add_dependency("foo==2.0");
        reqs.add_dependency("bar");
        let merged = reqs.write_merged(&runtime, &path).unwrap();
        assert_eq!(pairs(&merged), vec![("foo", "foo==2.0"), ("bar", "bar")]);
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("requirements.txt");
        std::fs::write(&path, "click\nrequests==2.31.0\n").unwrap();

        let reqs = Requirements::load(&RealRuntime, &path).unwrap();
        assert_eq!(
            pairs(reqs.existing()),
            vec![("click", "click"), ("requests", "requests==2.31.0")]
        );
    }
}
