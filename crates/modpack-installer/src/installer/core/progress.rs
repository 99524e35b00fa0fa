//! Progress tracking and reporting for install runs

use std::sync::Arc;

use super::{InstallStatus, InstallSummary};

/// Progress callback for install operations
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Events emitted during an install run
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    RunStarted {
        total: usize,
    },
    EntryStarted {
        index: usize,
        total: usize,
        name: String,
    },
    EntryFinished {
        index: usize,
        total: usize,
        name: String,
        status: InstallStatus,
    },
    DownloadStarted {
        url: String,
        total_size: Option<u64>,
    },
    DownloadProgress {
        url: String,
        downloaded: u64,
        total: Option<u64>,
        speed_bps: f64,
    },
    DownloadComplete {
        url: String,
        final_size: u64,
    },
    RetryAttempt {
        url: String,
        attempt: usize,
        max_attempts: usize,
    },
    RunFinished {
        summary: InstallSummary,
    },
    Error {
        url: String,
        error: String,
    },
}

/// Trait for progress reporting with more granular control
pub trait ProgressReporter: Send + Sync {
    fn on_run_started(&self, _total: usize) {}
    fn on_entry_started(&self, _index: usize, _total: usize, _name: &str) {}
    fn on_entry_finished(&self, _index: usize, _total: usize, _name: &str, _status: InstallStatus) {}
    fn on_download_started(&self, _url: &str, _total_size: Option<u64>) {}
    fn on_download_progress(&self, _url: &str, _downloaded: u64, _total: Option<u64>, _speed_bps: f64) {
    }
    fn on_download_complete(&self, _url: &str, _final_size: u64) {}
    fn on_retry_attempt(&self, _url: &str, _attempt: usize, _max_attempts: usize) {}
    fn on_run_finished(&self, _summary: InstallSummary) {}
    fn on_error(&self, _url: &str, _error: &str) {}
}

/// Extension trait to convert a ProgressReporter into a ProgressCallback
pub trait IntoProgressCallback {
    fn into_callback(self) -> ProgressCallback;
}

impl<T: ProgressReporter + 'static> IntoProgressCallback for T {
    fn into_callback(self) -> ProgressCallback {
        Arc::new(move |event| match event {
            ProgressEvent::RunStarted { total } => {
                self.on_run_started(total);
            }
            ProgressEvent::EntryStarted { index, total, name } => {
                self.on_entry_started(index, total, &name);
            }
            ProgressEvent::EntryFinished {
                index,
                total,
                name,
                status,
            } => {
                self.on_entry_finished(index, total, &name, status);
            }
            ProgressEvent::DownloadStarted { url, total_size } => {
                self.on_download_started(&url, total_size);
            }
            ProgressEvent::DownloadProgress {
                url,
                downloaded,
                total,
                speed_bps,
            } => {
                self.on_download_progress(&url, downloaded, total, speed_bps);
            }
            ProgressEvent::DownloadComplete { url, final_size } => {
                self.on_download_complete(&url, final_size);
            }
            ProgressEvent::RetryAttempt {
                url,
                attempt,
                max_attempts,
            } => {
                self.on_retry_attempt(&url, attempt, max_attempts);
            }
            ProgressEvent::RunFinished { summary } => {
                self.on_run_finished(summary);
            }
            ProgressEvent::Error { url, error } => {
                self.on_error(&url, &error);
            }
        })
    }
}

/// Simple console progress reporter implementation
#[derive(Debug, Default)]
pub struct ConsoleProgressReporter {
    pub verbose: bool,
}

impl ConsoleProgressReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn on_entry_started(&self, index: usize, total: usize, name: &str) {
        println!("[{}/{}] {}", index + 1, total, name);
    }

    fn on_entry_finished(&self, _index: usize, _total: usize, name: &str, status: InstallStatus) {
        if self.verbose {
            println!("    {} -> {}", name, status);
        }
    }

    fn on_download_progress(&self, _url: &str, downloaded: u64, total: Option<u64>, speed_bps: f64) {
        if self.verbose {
            let speed_mb = speed_bps / 1_000_000.0;
            match total {
                Some(total) if total > 0 => {
                    let percent = (downloaded as f64 / total as f64) * 100.0;
                    println!("    {:.1}% ({}/{} bytes, {:.1} MB/s)", percent, downloaded, total, speed_mb);
                }
                _ => {
                    println!("    {} bytes downloaded ({:.1} MB/s)", downloaded, speed_mb);
                }
            }
        }
    }

    fn on_retry_attempt(&self, url: &str, attempt: usize, max_attempts: usize) {
        println!("    retry {}/{} for {}", attempt, max_attempts, url);
    }

    fn on_run_finished(&self, summary: InstallSummary) {
        println!("{}", summary);
    }

    fn on_error(&self, url: &str, error: &str) {
        eprintln!("    error downloading {}: {}", url, error);
    }
}

/// Null progress reporter that does nothing
#[derive(Debug, Default)]
pub struct NullProgressReporter;

impl ProgressReporter for NullProgressReporter {}
