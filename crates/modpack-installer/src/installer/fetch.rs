//! Streaming download of a single mod file
//!
//! One GET with redirects disabled decides both the filename and the bytes:
//! a redirect answer contributes its `Location` for naming and a second,
//! redirect-following GET delivers the content; a direct answer is the
//! content. The filename and the body always come from the same response,
//! never from a separate name probe followed by a re-download.

use futures::StreamExt;
use reqwest::header::LOCATION;
use reqwest::{Client, Response, redirect};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::installer::config::InstallConfig;
use crate::installer::core::{
    FileOperation, InstallError, ProgressCallback, ProgressEvent, Result,
};
use crate::installer::resolve::{
    filename_from_headers, filename_from_url, header_str, is_naming_redirect,
};

/// Downloads a URL into a destination directory under its resolved filename
pub struct Fetcher {
    /// Redirects disabled, captures the first `Location`
    probe: Client,
    /// Follows the rest of the chain to the content
    follow: Client,
    config: InstallConfig,
}

impl Fetcher {
    pub fn new(config: InstallConfig) -> Result<Self> {
        let probe = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| InstallError::ClientBuild { source: e })?;
        let follow = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| InstallError::ClientBuild { source: e })?;
        Ok(Self {
            probe,
            follow,
            config,
        })
    }

    /// Download `url` into `destination_dir`, returning the resolved filename.
    ///
    /// Recoverable failures (timeouts, 5xx, 429) are retried with exponential
    /// backoff up to the configured cap; anything else fails immediately.
    pub async fn fetch(
        &self,
        url: &str,
        destination_dir: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url, destination_dir, progress.clone()).await {
                Ok(filename) => return Ok(filename),
                Err(e) if e.is_recoverable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = self.config.get_retry_delay(attempt - 1);
                    warn!(
                        "download of {} failed, retry {}/{} in {:?}: {}",
                        url, attempt, self.config.max_retries, delay, e
                    );
                    if let Some(ref callback) = progress {
                        callback(ProgressEvent::RetryAttempt {
                            url: url.to_string(),
                            attempt,
                            max_attempts: self.config.max_retries,
                        });
                    }
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(
        &self,
        url: &str,
        destination_dir: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<String> {
        let first = self
            .probe
            .get(url)
            .send()
            .await
            .map_err(|e| InstallError::HttpRequest {
                url: url.to_string(),
                source: e,
            })?;

        let (response, redirect_name) = if is_naming_redirect(first.status()) {
            let status = first.status();
            let target = header_str(first.headers(), LOCATION)
                .map(str::to_owned)
                .ok_or_else(|| InstallError::Resolution {
                    url: url.to_string(),
                    reason: format!("{} without a Location header", status),
                })?;
            debug!("{} redirects to {}", url, target);

            let target_url = absolute_location(url, &target)?;
            let response = self
                .follow
                .get(&target_url)
                .send()
                .await
                .map_err(|e| InstallError::HttpRequest {
                    url: target_url.clone(),
                    source: e,
                })?;
            (response, filename_from_url(&target))
        } else {
            (first, None)
        };

        let status = response.status();
        if !status.is_success() {
            return Err(InstallError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        // Header wins over redirect target wins over the original URL
        let filename = filename_from_headers(response.headers())
            .or(redirect_name)
            .or_else(|| filename_from_url(url))
            .ok_or_else(|| InstallError::Resolution {
                url: url.to_string(),
                reason: "no Content-Disposition filename or usable path segment".to_string(),
            })?;

        let dest_path = destination_dir.join(&filename);
        let size = self
            .stream_to_file(response, url, &dest_path, progress)
            .await?;
        debug!("downloaded {} ({} bytes) from {}", filename, size, url);
        Ok(filename)
    }

    /// Stream a response body to `dest_path` through a `.part` temp file.
    async fn stream_to_file(
        &self,
        response: Response,
        url: &str,
        dest_path: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<u64> {
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| InstallError::fs(parent, FileOperation::CreateDir, e))?;
        }

        let total_size = response.content_length();
        if let Some(ref callback) = progress {
            callback(ProgressEvent::DownloadStarted {
                url: url.to_string(),
                total_size,
            });
        }

        // Truncates any stale partial file from an aborted run
        let temp_path = dest_path.with_extension("part");
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| InstallError::fs(&temp_path, FileOperation::Create, e))?;

        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;
        let start_time = std::time::Instant::now();
        let mut last_progress_time = start_time;

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| InstallError::HttpRequest {
                url: url.to_string(),
                source: e,
            })?;

            file.write_all(&chunk)
                .await
                .map_err(|e| InstallError::fs(&temp_path, FileOperation::Write, e))?;
            downloaded += chunk.len() as u64;

            // Report progress at most every 100ms to avoid spam
            let now = std::time::Instant::now();
            if now.duration_since(last_progress_time).as_millis() >= 100 {
                if let Some(ref callback) = progress {
                    let elapsed = start_time.elapsed().as_secs_f64();
                    let speed = if elapsed > 0.0 {
                        downloaded as f64 / elapsed
                    } else {
                        0.0
                    };
                    callback(ProgressEvent::DownloadProgress {
                        url: url.to_string(),
                        downloaded,
                        total: total_size,
                        speed_bps: speed,
                    });
                }
                last_progress_time = now;
            }
        }

        file.flush()
            .await
            .map_err(|e| InstallError::fs(&temp_path, FileOperation::Write, e))?;
        file.sync_all()
            .await
            .map_err(|e| InstallError::fs(&temp_path, FileOperation::Write, e))?;
        drop(file);

        // The file either lands complete or not at all
        fs::rename(&temp_path, dest_path)
            .await
            .map_err(|e| InstallError::fs(dest_path, FileOperation::Rename, e))?;

        if let Some(ref callback) = progress {
            callback(ProgressEvent::DownloadComplete {
                url: url.to_string(),
                final_size: downloaded,
            });
        }

        Ok(downloaded)
    }
}

/// Turn a possibly relative `Location` into an absolute URL.
fn absolute_location(base: &str, location: &str) -> Result<String> {
    if location.starts_with("http://") || location.starts_with("https://") {
        return Ok(location.to_string());
    }
    let base = url::Url::parse(base).map_err(|e| InstallError::InvalidUrl {
        url: base.to_string(),
        source: e,
    })?;
    let joined = base.join(location).map_err(|e| InstallError::InvalidUrl {
        url: location.to_string(),
        source: e,
    })?;
    Ok(joined.to_string())
}
