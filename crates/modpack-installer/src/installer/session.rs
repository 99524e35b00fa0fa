//! Install session orchestration
//!
//! An `Installer` is an explicit session object owned by the caller and
//! handed a modpack per run; nothing in the engine lives in ambient global
//! state. Entries are processed strictly in list order with a single
//! transfer in flight, and the target directory belongs to the session for
//! the duration of a run — callers serialize concurrent installs.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::installer::config::InstallConfig;
use crate::installer::core::{
    FileOperation, InstallError, InstallResult, InstallSummary, ModEntry, ModpackConfig,
    ProgressCallback, ProgressEvent, Result,
};
use crate::installer::fetch::Fetcher;
use crate::installer::resolve::UrlResolver;
use crate::installer::swap;

/// Cooperative cancellation flag, checked at entry boundaries only —
/// an in-flight transfer always runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Options for a single install run
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Replace the target directory via the backup policy; when false the
    /// directory must already exist and is filled in place.
    pub delete_existing: bool,
    pub cancel: Option<CancelToken>,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            delete_existing: true,
            cancel: None,
        }
    }
}

/// The install engine: resolves, skips or fetches every entry of a modpack
pub struct Installer {
    config: InstallConfig,
    resolver: UrlResolver,
    fetcher: Fetcher,
}

impl Installer {
    pub fn new(config: InstallConfig) -> Result<Self> {
        let resolver = UrlResolver::new(&config)?;
        let fetcher = Fetcher::new(config.clone())?;
        Ok(Self {
            config,
            resolver,
            fetcher,
        })
    }

    /// Install a modpack with the default options (replace the target).
    pub async fn install(
        &self,
        modpack: &ModpackConfig,
        target_dir: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<Vec<InstallResult>> {
        self.install_with_options(modpack, target_dir, InstallOptions::default(), progress)
            .await
    }

    /// Install a modpack, returning one result per processed entry.
    ///
    /// Per-entry failures are recorded and never abort the run; only a
    /// failed directory preparation, backup-name exhaustion or marker write
    /// is fatal. A cancelled run returns the results accumulated so far —
    /// fewer than the modpack has entries — and leaves no marker behind.
    pub async fn install_with_options(
        &self,
        modpack: &ModpackConfig,
        target_dir: &Path,
        options: InstallOptions,
        progress: Option<ProgressCallback>,
    ) -> Result<Vec<InstallResult>> {
        let total = modpack.mods.len();

        if options.delete_existing {
            swap::prepare(target_dir, self.config.backup_name_attempts).await?;
        } else {
            let exists = fs::try_exists(target_dir)
                .await
                .map_err(|e| InstallError::fs(target_dir, FileOperation::Metadata, e))?;
            if !exists {
                return Err(InstallError::fs(
                    target_dir,
                    FileOperation::Metadata,
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "target directory does not exist",
                    ),
                ));
            }
        }

        info!("installing {} mods into {}", total, target_dir.display());
        emit(&progress, ProgressEvent::RunStarted { total });

        let mut results = Vec::with_capacity(total);
        let mut cancelled = false;

        for (index, entry) in modpack.mods.iter().enumerate() {
            if options.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                warn!("install cancelled after {} of {} entries", index, total);
                cancelled = true;
                break;
            }

            emit(
                &progress,
                ProgressEvent::EntryStarted {
                    index,
                    total,
                    name: entry.name.clone(),
                },
            );

            let result = self.install_entry(entry, target_dir, &progress).await;

            emit(
                &progress,
                ProgressEvent::EntryFinished {
                    index,
                    total,
                    name: entry.name.clone(),
                    status: result.status,
                },
            );
            results.push(result);

            // Yield point so a single-threaded host stays responsive between entries
            tokio::task::yield_now().await;
        }

        // Marking requires every entry to have reached a terminal state;
        // an aborted run must not pass for a safe full install.
        if !cancelled && results.len() == total {
            swap::write_marker(target_dir).await?;
        }

        let summary = InstallSummary::of(&results);
        info!("install finished: {}", summary);
        emit(&progress, ProgressEvent::RunFinished { summary });

        Ok(results)
    }

    async fn install_entry(
        &self,
        entry: &ModEntry,
        target_dir: &Path,
        progress: &Option<ProgressCallback>,
    ) -> InstallResult {
        if let Err(e) = entry.validate() {
            warn!("rejecting entry '{}': {}", entry.name, e);
            return InstallResult::failed(entry.clone(), &e);
        }

        // The present-file check needs the real filename, which may come from
        // a redirect or a header; the probe decides without moving a body.
        let filename = match self.resolver.resolve(&entry.download_url).await {
            Ok(filename) => filename,
            Err(e) => {
                warn!("resolution of '{}' failed: {}", entry.name, e);
                emit(
                    progress,
                    ProgressEvent::Error {
                        url: entry.download_url.clone(),
                        error: e.to_string(),
                    },
                );
                return InstallResult::failed(entry.clone(), &e);
            }
        };

        match fs::try_exists(target_dir.join(&filename)).await {
            Ok(true) => {
                debug!("{} already present, skipping", filename);
                return InstallResult::skipped(entry.clone(), filename);
            }
            Ok(false) => {}
            Err(e) => {
                debug!("presence check for {} failed ({}), downloading", filename, e);
            }
        }

        match self
            .fetcher
            .fetch(&entry.download_url, target_dir, progress.clone())
            .await
        {
            Ok(filename) => InstallResult::downloaded(entry.clone(), filename),
            Err(e) => {
                warn!("download of '{}' failed: {}", entry.name, e);
                emit(
                    progress,
                    ProgressEvent::Error {
                        url: entry.download_url.clone(),
                        error: e.to_string(),
                    },
                );
                InstallResult::failed(entry.clone(), &e)
            }
        }
    }
}

fn emit(progress: &Option<ProgressCallback>, event: ProgressEvent) {
    if let Some(callback) = progress {
        callback(event);
    }
}
