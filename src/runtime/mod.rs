//! Runtime abstraction for system operations.
//!
//! This module provides a trait-based abstraction over the file system and
//! environment, enabling dependency injection and testability.
//!
//! # Structure
//!
//! - `env` - Environment variables and process information
//! - `fs` - File system operations (read, write, directory, glob)

mod env;
mod fs;

use anyhow::Result;
use std::env as std_env;
use std::path::{Path, PathBuf};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;
    fn current_dir(&self) -> Result<PathBuf>;

    // File System
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
    fn open(&self, path: &Path) -> Result<Box<dyn std::io::Read>>;

    /// Create an empty file if it does not exist yet. Existing files are left untouched.
    fn touch(&self, path: &Path) -> Result<()>;

    /// Expand a glob pattern. Hidden entries are only matched by patterns
    /// that name the leading dot explicitly.
    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn current_dir(&self) -> Result<PathBuf> {
        self.current_dir_impl()
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.write_impl(path, contents)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.is_file_impl(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.read_dir_impl(path)
    }

    fn open(&self, path: &Path) -> Result<Box<dyn std::io::Read>> {
        self.open_impl(path)
    }

    fn touch(&self, path: &Path) -> Result<()> {
        self.touch_impl(path)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        self.glob_impl(pattern)
    }
}
