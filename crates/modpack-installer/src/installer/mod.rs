//! Install engine
//!
//! This module contains the whole install pipeline: core types and errors,
//! configuration, filename resolution, the streaming fetcher, the target
//! directory swap, and the session orchestrator.

pub mod config;
pub mod core;
pub mod fetch;
pub mod resolve;
pub mod session;
pub mod swap;

// Re-export main types for convenience
pub use config::InstallConfig;
pub use core::{
    ConsoleProgressReporter, FileOperation, InstallError, InstallResult, InstallStatus,
    InstallSummary, IntoProgressCallback, MODPACK_FILE_SUFFIX, ModEntry, ModpackConfig,
    NullProgressReporter, ProgressCallback, ProgressEvent, ProgressReporter, Result,
    suggest_mod_name,
};
pub use fetch::Fetcher;
pub use resolve::UrlResolver;
pub use session::{CancelToken, InstallOptions, Installer};
pub use swap::MARKER_FILE;
