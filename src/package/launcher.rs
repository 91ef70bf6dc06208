use anyhow::Result;

use super::PackageFile;

const LAUNCHER_TEMPLATE: &str = r#"import os
import runpy
import sys


def main():
    wrapped_repo = os.path.join(os.path.dirname(os.path.abspath(__file__)), "__WRAPPED_REPO__")
    script_target = "__SCRIPT_TARGET__"
    script_path = os.path.join(wrapped_repo, script_target)

    sys.path.insert(0, wrapped_repo)

    script_dir = os.path.dirname(script_target)
    if script_dir:
        sys.path.insert(0, os.path.join(wrapped_repo, script_dir))

    sys.argv[0] = script_path
    runpy.run_path(script_path, run_name="__main__")


if __name__ == "__main__":
    main()
"#;

/// Python module that runs one script of the wrapped repository as `__main__`.
///
/// The wrapped repository is expected next to the launcher, in a directory
/// named after the package.
#[derive(Debug, Clone, PartialEq)]
pub struct Launcher<'a> {
    package_name: &'a str,
    script_target: &'a str,
}

impl<'a> Launcher<'a> {
    pub fn new(package_name: &'a str, script_target: &'a str) -> Self {
        Self {
            package_name,
            script_target,
        }
    }
}

/// Escape `value` for use inside a double-quoted Python string literal.
fn python_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

impl PackageFile for Launcher<'_> {
    fn render(&self) -> Result<String> {
        Ok(LAUNCHER_TEMPLATE
            .replace("__WRAPPED_REPO__", &python_str(self.package_name))
            .replace("__SCRIPT_TARGET__", &python_str(self.script_target)))
    }
}
