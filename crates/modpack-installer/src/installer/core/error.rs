//! Error types for the install engine with context and recovery information

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while resolving, fetching and installing mods
#[derive(Error, Debug)]
pub enum InstallError {
    /// HTTP-related errors with context
    #[error("HTTP request to '{url}' failed")]
    HttpRequest {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status during a body fetch
    #[error("'{url}' answered {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// URL parsing errors
    #[error("invalid download URL '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// No usable filename could be derived for a URL
    #[error("cannot derive a filename for '{url}': {reason}")]
    Resolution { url: String, reason: String },

    /// A mod entry violated the data-model invariants
    #[error("invalid mod entry '{name}': {reason}")]
    InvalidEntry { name: String, reason: String },

    /// File system I/O errors with file context
    #[error("{operation} failed on '{path}'")]
    FileSystem {
        path: PathBuf,
        operation: FileOperation,
        #[source]
        source: std::io::Error,
    },

    /// Backup-name generation exhausted its attempt cap
    #[error("no free backup name for '{path}' after {attempts} attempts")]
    BackupCollision { path: PathBuf, attempts: usize },

    /// A modpack file did not parse as the expected JSON shape
    #[error("malformed modpack file '{path}'")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to construct the HTTP client
    #[error("failed to build HTTP client")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },

    /// Install run stopped cooperatively before processing every entry
    #[error("install cancelled after {completed} of {total} entries")]
    Cancelled { completed: usize, total: usize },
}

pub type Result<T> = std::result::Result<T, InstallError>;

impl InstallError {
    /// Shorthand for wrapping an I/O error with its path and operation.
    pub(crate) fn fs(
        path: impl Into<PathBuf>,
        operation: FileOperation,
        source: std::io::Error,
    ) -> Self {
        InstallError::FileSystem {
            path: path.into(),
            operation,
            source,
        }
    }

    /// Check if error is recoverable (worth retrying)
    pub fn is_recoverable(&self) -> bool {
        match self {
            InstallError::HttpRequest { source, .. } => {
                // Retry on transport problems and server-side errors, not client errors (4xx)
                source.is_timeout()
                    || source.is_connect()
                    || source
                        .status()
                        .is_none_or(|status| status.is_server_error() || status == 429)
            }
            InstallError::HttpStatus { status, .. } => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            InstallError::FileSystem { source, .. } => {
                matches!(
                    source.kind(),
                    std::io::ErrorKind::Interrupted
                        | std::io::ErrorKind::TimedOut
                        | std::io::ErrorKind::WouldBlock
                )
            }
            InstallError::InvalidUrl { .. } => false,
            InstallError::Resolution { .. } => false,
            InstallError::InvalidEntry { .. } => false,
            InstallError::BackupCollision { .. } => false,
            InstallError::ConfigParse { .. } => false,
            InstallError::ClientBuild { .. } => false,
            InstallError::Cancelled { .. } => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            InstallError::HttpRequest { .. } => "http_request",
            InstallError::HttpStatus { .. } => "http_status",
            InstallError::InvalidUrl { .. } => "invalid_url",
            InstallError::Resolution { .. } => "resolution",
            InstallError::InvalidEntry { .. } => "invalid_entry",
            InstallError::FileSystem { .. } => "file_system",
            InstallError::BackupCollision { .. } => "backup_collision",
            InstallError::ConfigParse { .. } => "config_parse",
            InstallError::ClientBuild { .. } => "client_build",
            InstallError::Cancelled { .. } => "cancelled",
        }
    }
}

/// Types of file operations for error context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    Read,
    Write,
    Create,
    Delete,
    Rename,
    Metadata,
    CreateDir,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Read => write!(f, "reading"),
            FileOperation::Write => write!(f, "writing"),
            FileOperation::Create => write!(f, "creating"),
            FileOperation::Delete => write!(f, "deleting"),
            FileOperation::Rename => write!(f, "renaming"),
            FileOperation::Metadata => write!(f, "reading metadata"),
            FileOperation::CreateDir => write!(f, "creating directory"),
        }
    }
}
