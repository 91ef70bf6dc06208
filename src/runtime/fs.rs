//! File system operations (read, write, directory, glob).

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(level = "debug", skip(self, contents))]
    pub(crate) fn write_impl(&self, path: &Path, contents: &[u8]) -> Result<()> {
        fs::write(path, contents)
            .with_context(|| format!("Failed to write to file {}", path.display()))?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub(crate) fn read_to_string_impl(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read file {}", path.display()))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub(crate) fn create_dir_all_impl(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub(crate) fn exists_impl(&self, path: &Path) -> bool {
        path.exists()
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub(crate) fn is_dir_impl(&self, path: &Path) -> bool {
        path.is_dir()
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub(crate) fn is_file_impl(&self, path: &Path) -> bool {
        path.is_file()
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub(crate) fn read_dir_impl(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(path)
            .with_context(|| format!("Failed to read directory {}", path.display()))?
            .map(|entry| Ok(entry?.path()))
            .collect::<Result<Vec<_>>>()?;
        // read_dir order is platform dependent
        entries.sort();
        Ok(entries)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub(crate) fn open_impl(&self, path: &Path) -> Result<Box<dyn std::io::Read>> {
        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open file {}", path.display()))?;
        Ok(Box::new(file))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub(crate) fn touch_impl(&self, path: &Path) -> Result<()> {
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to touch file {}", path.display()))?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub(crate) fn glob_impl(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let options = glob::MatchOptions {
            require_literal_leading_dot: true,
            ..Default::default()
        };
        let mut paths = glob::glob_with(pattern, options)
            .with_context(|| format!("Invalid glob pattern {}", pattern))?
            .collect::<Result<Vec<_>, _>>()?;
        paths.sort();
        Ok(paths)
    }
}
