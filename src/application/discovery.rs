//! Finding the Python scripts of a checked-out repository.

use anyhow::{Result, anyhow};
use std::io::{BufRead, BufReader, Read};
use std::path::{Component, Path};

use crate::runtime::Runtime;

/// Longest first line inspected for a shebang.
const SHEBANG_PROBE: u64 = 512;

/// Whether `path` is a file with a `.py` suffix or a `#!...python` shebang.
pub fn is_python_file<R: Runtime>(runtime: &R, path: &Path) -> bool {
    if !runtime.is_file(path) {
        return false;
    }
    if path.extension().is_some_and(|ext| ext == "py") {
        return true;
    }
    has_python_shebang(runtime, path)
}

fn has_python_shebang<R: Runtime>(runtime: &R, path: &Path) -> bool {
    let Ok(file) = runtime.open(path) else {
        return false;
    };
    let mut first_line = String::new();
    // invalid UTF-8 means a binary file
    if BufReader::new(file.take(SHEBANG_PROBE))
        .read_line(&mut first_line)
        .is_err()
    {
        return false;
    }
    first_line.starts_with("#!") && first_line.contains("python")
}

/// `path` relative to `root`, with `/` separators.
fn relative_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| anyhow!("{} is outside of {}", path.display(), root.display()))?;
    let parts = relative
        .components()
        .map(|c| match c {
            Component::Normal(part) => part
                .to_str()
                .ok_or_else(|| anyhow!("Non UTF-8 path {}", path.display())),
            _ => Err(anyhow!("Unexpected path component in {}", path.display())),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join("/"))
}

/// Python scripts directly inside `repo_dir`, as file names.
#[tracing::instrument(level = "debug", skip(runtime))]
pub fn discover_scripts<R: Runtime>(runtime: &R, repo_dir: &Path) -> Result<Vec<String>> {
    runtime
        .read_dir(repo_dir)?
        .into_iter()
        .filter(|path| is_python_file(runtime, path))
        .map(|path| relative_name(repo_dir, &path))
        .collect()
}

/// Python scripts anywhere below `repo_dir` (hidden directories skipped),
/// as relative paths.
#[tracing::instrument(level = "debug", skip(runtime))]
pub fn list_python_files<R: Runtime>(runtime: &R, repo_dir: &Path) -> Result<Vec<String>> {
    let root = repo_dir
        .to_str()
        .ok_or_else(|| anyhow!("Non UTF-8 path {}", repo_dir.display()))?;
    let pattern = format!("{}/**/*", glob::Pattern::escape(root));
    let mut files = Vec::new();
    for path in runtime.glob(&pattern)? {
        let name = relative_name(repo_dir, &path)?;
        if name.split('/').any(|part| part.starts_with('.')) {
            continue;
        }
        if is_python_file(runtime, &path) {
            files.push(name);
        }
    }
    Ok(files)
}
