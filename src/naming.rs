//! Name normalization for launcher files, package names and requirement keys.
//!
//! All rules operate on ASCII character classes; any other character counts
//! as a separator.

/// Prefix shared by launcher modules and the package that contains them.
pub const WRAPPED_PREFIX: &str = "wrapped_";

/// Collapse every run of characters rejected by `keep` into a single `_`.
fn collapse_runs(input: &str, keep: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_run = false;
    for ch in input.chars() {
        if keep(ch) {
            out.push(ch);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

/// Normalize a script target path into a launcher file stem.
///
/// `sub/dir script.py` becomes `sub_dir_script.py`. Dots are kept so the
/// `.py` extension survives.
pub fn normalize_script_target(target: &str) -> String {
    collapse_runs(target, |c| c.is_ascii_alphanumeric() || c == '.')
}

/// Launcher file name inside `src/wrapped_<package>/`.
///
/// Targets without a `.py` suffix get one appended so the launcher can be
/// imported as a module.
pub fn launcher_file_name(target: &str) -> String {
    let normalized = normalize_script_target(target);
    if normalized.ends_with(".py") {
        format!("{WRAPPED_PREFIX}{normalized}")
    } else {
        format!("{WRAPPED_PREFIX}{normalized}.py")
    }
}

/// Derive a package name from a repository name.
///
/// Non-alphanumeric runs become `_`, so `my--repo` becomes `my_repo` and
/// `_private` stays as is. A name made only of separators yields `""`.
pub fn normalize_package_name(repo_name: &str) -> String {
    let name = collapse_runs(repo_name, |c| c.is_ascii_alphanumeric());
    if name.chars().all(|c| c == '_') {
        String::new()
    } else {
        name
    }
}

/// Whether `name` only consists of ASCII alphanumerics and underscores.
pub fn is_valid_package_name(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Key under which a requirement line is stored: its leading run of
/// alphanumerics and underscores, possibly empty.
pub fn requirement_key(line: &str) -> &str {
    let end = line
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(line.len());
    &line[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_script_target() {
        assert_eq!(normalize_script_target("main.py"), "main.py");
        assert_eq!(normalize_script_target("sub/dir script.py"), "sub_dir_script.py");
        assert_eq!(normalize_script_target("a//--b.py"), "a_b.py");
        assert_eq!(normalize_script_target("/lead.py"), "_lead.py");
        assert_eq!(normalize_script_target("trail/"), "trail_");
        assert_eq!(normalize_script_target(""), "");
        assert_eq!(normalize_script_target("über.py"), "_ber.py");
    }

    #[test]
    fn test_launcher_file_name() {
        assert_eq!(launcher_file_name("sub/dir script.py"), "wrapped_sub_dir_script.py");
        assert_eq!(launcher_file_name("bin/tool"), "wrapped_bin_tool.py");
    }

    #[test]
    fn test_normalize_package_name() {
        assert_eq!(normalize_package_name("my-repo"), "my_repo");
        assert_eq!(normalize_package_name("-my--repo."), "_my_repo_");
        assert_eq!(normalize_package_name("__init__"), "_init_");
        assert_eq!(normalize_package_name("_private"), "_private");
        assert_eq!(normalize_package_name("plain"), "plain");
        assert_eq!(normalize_package_name("---"), "");
        assert_eq!(normalize_package_name(""), "");
    }

    #[test]
    fn test_is_valid_package_name() {
        assert!(is_valid_package_name("my_pkg2"));
        assert!(is_valid_package_name(""));
        assert!(!is_valid_package_name("my-pkg"));
        assert!(!is_valid_package_name("pkg.name"));
    }

    #[test]
    fn test_requirement_key() {
        assert_eq!(requirement_key("requests>=2.0"), "requests");
        assert_eq!(requirement_key("foo_bar==1"), "foo_bar");
        assert_eq!(requirement_key("my-pkg @ git+https://x/y"), "my");
        assert_eq!(requirement_key("-e ."), "");
        assert_eq!(requirement_key(""), "");
    }
}
