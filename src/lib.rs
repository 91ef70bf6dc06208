pub mod application;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod naming;
pub mod package;
pub mod process;
pub mod runtime;
pub mod toolchain;
pub mod vcs;
