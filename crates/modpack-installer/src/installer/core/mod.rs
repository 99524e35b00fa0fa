//! Core types used throughout the install engine
//!
//! The data model matches the legacy modpack file format: an ordered list of
//! mod records under a `Mods` key, each with `Name`, `DownloadLink` and an
//! optional `Version`.

pub mod error;
pub mod progress;

// Re-export main types for convenience
pub use error::{FileOperation, InstallError, Result};
pub use progress::{
    ConsoleProgressReporter, IntoProgressCallback, NullProgressReporter, ProgressCallback,
    ProgressEvent, ProgressReporter,
};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::path::Path;
use tokio::fs;
use tracing::debug;
use url::Url;

/// Conventional double extension for modpack definition files.
pub const MODPACK_FILE_SUFFIX: &str = ".Modpack.json";

/// Dotted numeric version, two or three components.
static VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+(\.\d+)?$").unwrap());

/// Leading letters/spaces/separators of a filename, the part that usually
/// carries the mod name before version numbers start.
static NAME_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z _\-]*").unwrap());

/// A single mod record: display name, download URL, optional version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "DownloadLink")]
    pub download_url: String,
    #[serde(rename = "Version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ModEntry {
    pub fn new<S: Into<String>, U: Into<String>>(name: S, download_url: U) -> Self {
        Self {
            name: name.into(),
            download_url: download_url.into(),
            version: None,
        }
    }

    pub fn with_version<S: Into<String>>(mut self, version: S) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Enforce the data-model invariants before the engine accepts an entry.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(InstallError::InvalidEntry {
                name: self.name.clone(),
                reason: "mod name is empty".to_string(),
            });
        }
        if self.download_url.trim().is_empty() {
            return Err(InstallError::InvalidEntry {
                name: self.name.clone(),
                reason: "download link is empty".to_string(),
            });
        }

        let parsed = Url::parse(&self.download_url).map_err(|e| InstallError::InvalidUrl {
            url: self.download_url.clone(),
            source: e,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(InstallError::InvalidEntry {
                name: self.name.clone(),
                reason: format!("unsupported URL scheme '{}'", parsed.scheme()),
            });
        }

        if let Some(version) = &self.version {
            if !VERSION_RE.is_match(version) {
                return Err(InstallError::InvalidEntry {
                    name: self.name.clone(),
                    reason: format!("version '{}' is not dotted numeric", version),
                });
            }
        }

        Ok(())
    }
}

/// An ordered modpack: the unit an install run operates on
///
/// Order is insertion order from the editing layer and carries no meaning
/// beyond display and processing sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModpackConfig {
    #[serde(rename = "Mods", default)]
    pub mods: Vec<ModEntry>,
}

impl ModpackConfig {
    pub fn new(mods: Vec<ModEntry>) -> Self {
        Self { mods }
    }

    pub fn len(&self) -> usize {
        self.mods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    /// Load a modpack from a JSON file, validating every entry.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = fs::read(path)
            .await
            .map_err(|e| InstallError::fs(path, FileOperation::Read, e))?;
        let config: Self = serde_json::from_slice(&raw).map_err(|e| InstallError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        for entry in &config.mods {
            entry.validate()?;
        }
        debug!("loaded {} mods from {}", config.mods.len(), path.display());
        Ok(config)
    }

    /// Write the modpack back out in the legacy JSON shape.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_vec_pretty(self).map_err(|e| InstallError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, raw)
            .await
            .map_err(|e| InstallError::fs(path, FileOperation::Write, e))?;
        debug!("saved {} mods to {}", self.mods.len(), path.display());
        Ok(())
    }
}

/// Terminal state of a single entry within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
    Downloaded,
    Skipped,
    Failed,
}

impl fmt::Display for InstallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallStatus::Downloaded => write!(f, "downloaded"),
            InstallStatus::Skipped => write!(f, "skipped"),
            InstallStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Per-entry outcome of an install run
///
/// Produced fresh per run and handed back to the caller; the engine never
/// retains these between runs.
#[derive(Debug, Clone)]
pub struct InstallResult {
    pub entry: ModEntry,
    pub status: InstallStatus,
    pub resolved_filename: Option<String>,
    pub error: Option<String>,
}

impl InstallResult {
    pub(crate) fn downloaded(entry: ModEntry, filename: String) -> Self {
        Self {
            entry,
            status: InstallStatus::Downloaded,
            resolved_filename: Some(filename),
            error: None,
        }
    }

    pub(crate) fn skipped(entry: ModEntry, filename: String) -> Self {
        Self {
            entry,
            status: InstallStatus::Skipped,
            resolved_filename: Some(filename),
            error: None,
        }
    }

    pub(crate) fn failed(entry: ModEntry, error: &InstallError) -> Self {
        Self {
            entry,
            status: InstallStatus::Failed,
            resolved_filename: None,
            error: Some(error_chain(error)),
        }
    }
}

/// Flatten an error and its sources into one display string.
fn error_chain(error: &InstallError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Downloaded/Skipped/Failed counts over a result sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl InstallSummary {
    pub fn of(results: &[InstallResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            match result.status {
                InstallStatus::Downloaded => summary.downloaded += 1,
                InstallStatus::Skipped => summary.skipped += 1,
                InstallStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.downloaded + self.skipped + self.failed
    }
}

impl fmt::Display for InstallSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} downloaded, {} skipped, {} failed",
            self.downloaded, self.skipped, self.failed
        )
    }
}

/// Suggest a display name for a mod from its resolved filename.
///
/// Takes the leading letters of the file stem, turns separators into spaces,
/// title-cases the words, upper-cases `api` and drops the loader suffixes
/// `fabric` and `forge`.
pub fn suggest_mod_name(filename: &str) -> String {
    let stem = filename.rsplit_once('.').map_or(filename, |(stem, _)| stem);
    let prefix = NAME_PREFIX_RE.find(stem).map_or("", |m| m.as_str());

    let mut words = Vec::new();
    for word in prefix.replace('-', " ").split_whitespace() {
        if word.eq_ignore_ascii_case("fabric") || word.eq_ignore_ascii_case("forge") {
            continue;
        }
        if word.eq_ignore_ascii_case("api") {
            words.push("API".to_string());
            continue;
        }
        let mut chars = word.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => continue,
        };
        words.push(capitalized);
    }
    words.join(" ")
}
