use std::path::PathBuf;

/// Failures caused by user input rather than by the system.
///
/// These are reported as a single line and exit with status 1. Everything
/// else travels as a plain `anyhow::Error` and is treated as unexpected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("Invalid script specification \"{spec}\": {reason}")]
    InvalidScriptSpec { spec: String, reason: &'static str },

    #[error("Git repo \"{0}\" invalid, specify another repo")]
    InvalidRepoUrl(String),

    #[error(
        "Specified invalid package name \"{0}\", only alphanumeric values and underscores are allowed"
    )]
    InvalidPackageName(String),

    #[error("Destination \"{}\" not empty, change directory or specify another destination", .0.display())]
    DestinationNotEmpty(PathBuf),

    #[error("Target script \"{0}\" not found")]
    ScriptNotFound(String),

    #[error("Scripts \"{first}\" and \"{second}\" would share the launcher \"{launcher}\", expose only one of them")]
    LauncherConflict {
        first: String,
        second: String,
        launcher: String,
    },

    #[error("\"{}\" seems to be not a wapp-wrapped project, are you sure?", .0.display())]
    NotWrapped(PathBuf),

    #[error("\"{}\" seems to be not a wapp-wrapped project, missing pyproject.toml", .0.display())]
    MissingManifest(PathBuf),

    #[error("\"{}\" seems to be not a wapp-wrapped project, \"{}\" is not a git repo", .0.display(), .1.display())]
    MissingSource(PathBuf, PathBuf),
}

/// Process exit status for a finished command.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<UsageError>().is_some() {
        1
    } else {
        255
    }
}
