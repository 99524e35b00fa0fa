//! Modpack Installer Library
//!
//! This library installs modpacks — ordered lists of (name, download URL,
//! optional version) records — into a target directory, replacing any prior
//! contents while preserving a recoverable backup. It resolves each download
//! URL to the concrete filename the server intends to deliver (redirect
//! `Location` and `Content-Disposition` aware), streams the bytes to disk,
//! and skips entries whose files are already present.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use modpack_installer::{
//!     InstallConfig, Installer, InstallSummary, ModEntry, ModpackConfig, ProgressCallback,
//!     ProgressEvent,
//! };
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> modpack_installer::Result<()> {
//! let modpack = ModpackConfig::new(vec![
//!     ModEntry::new("Sodium", "https://example.com/files/sodium-0.5.8.jar"),
//!     ModEntry::new("Lithium", "https://example.com/files/lithium-0.12.1.jar")
//!         .with_version("0.12.1"),
//! ]);
//!
//! let installer = Installer::new(InstallConfig::default())?;
//!
//! let progress: ProgressCallback = Arc::new(|event: ProgressEvent| {
//!     if let ProgressEvent::EntryStarted { index, total, name } = event {
//!         println!("[{}/{}] {}", index + 1, total, name);
//!     }
//! });
//!
//! let results = installer
//!     .install(&modpack, Path::new("/path/to/minecraft/mods"), Some(progress))
//!     .await?;
//! println!("{}", InstallSummary::of(&results));
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Filename resolution**: one redirect layer probed without following the
//!   chain, `Content-Disposition` override, query stripping, percent decoding
//! - **Idempotent re-runs**: entries whose files already exist are skipped
//!   without transferring a body
//! - **Backup semantics**: a directory is deleted only when a prior clean
//!   install marked it; anything else is renamed to a unique backup sibling
//! - **Retry logic**: exponential backoff on transient network failures
//! - **Progress tracking**: per-entry and byte-level events through a
//!   cooperative callback, plus cooperative cancellation between entries
//! - **Legacy format**: reads and writes the `*.Modpack.json` file shape

pub mod installer;

// Re-export commonly used types for convenience
pub use installer::{
    CancelToken, ConsoleProgressReporter, Fetcher, FileOperation, InstallConfig, InstallError,
    InstallOptions, InstallResult, InstallStatus, InstallSummary, Installer, IntoProgressCallback,
    MARKER_FILE, MODPACK_FILE_SUFFIX, ModEntry, ModpackConfig, NullProgressReporter,
    ProgressCallback, ProgressEvent, ProgressReporter, Result, UrlResolver, suggest_mod_name,
};
