//! Download URL to filename resolution
//!
//! Mod hosts rarely serve a file under the literal URL a modpack records:
//! the link usually answers with a redirect whose `Location` carries the real
//! name, or with a `Content-Disposition` header naming the attachment. The
//! resolver probes one redirect layer without following the chain and falls
//! back to URL-path naming.

use reqwest::header::{CONTENT_DISPOSITION, HeaderMap, HeaderName, LOCATION};
use reqwest::{Client, StatusCode, redirect};
use tracing::debug;

use crate::installer::config::InstallConfig;
use crate::installer::core::{InstallError, Result};

/// Statuses whose `Location` header names the real file.
const REDIRECT_STATUSES: [StatusCode; 3] = [
    StatusCode::MOVED_PERMANENTLY,
    StatusCode::FOUND,
    StatusCode::TEMPORARY_REDIRECT,
];

pub(crate) fn is_naming_redirect(status: StatusCode) -> bool {
    REDIRECT_STATUSES.contains(&status)
}

pub(crate) fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers.get(name)?.to_str().ok()
}

/// Final path segment of a URL: query stripped, percent-decoded, sanitized.
///
/// Works on raw strings so relative `Location` values resolve the same way
/// absolute URLs do.
pub(crate) fn filename_from_url(url: &str) -> Option<String> {
    let tail = &url[url.rfind('/')? + 1..];
    let tail = tail.split('?').next().unwrap_or(tail);
    if tail.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(tail)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| tail.to_string());
    let safe = sanitize_filename::sanitize(&decoded);
    if safe.is_empty() { None } else { Some(safe) }
}

/// `filename` parameter of a Content-Disposition header value.
pub(crate) fn filename_from_disposition(value: &str) -> Option<String> {
    for part in value.split(';') {
        let part = part.trim();
        let Some(prefix) = part.get(..9) else {
            continue;
        };
        if !prefix.eq_ignore_ascii_case("filename=") {
            continue;
        }

        let raw = part[9..].trim().trim_matches('"');
        if raw.is_empty() {
            return None;
        }
        let decoded = urlencoding::decode(raw)
            .map(|cow| cow.into_owned())
            .unwrap_or_else(|_| raw.to_string());
        let safe = sanitize_filename::sanitize(&decoded);
        return if safe.is_empty() { None } else { Some(safe) };
    }
    None
}

pub(crate) fn filename_from_headers(headers: &HeaderMap) -> Option<String> {
    header_str(headers, CONTENT_DISPOSITION).and_then(filename_from_disposition)
}

/// Resolves the concrete filename a download URL will produce on disk.
pub struct UrlResolver {
    probe: Client,
}

impl UrlResolver {
    pub fn new(config: &InstallConfig) -> Result<Self> {
        let probe = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| InstallError::ClientBuild { source: e })?;
        Ok(Self { probe })
    }

    /// Determine the filename `url` would deliver, without transferring a body.
    ///
    /// A 301/302/307 answer names the file through its `Location` (one layer,
    /// never followed). Any other status falls back to `Content-Disposition`
    /// and then to the URL's own path, so servers that reject HEAD still
    /// resolve. Only transport failures and nameless URLs are errors.
    pub async fn resolve(&self, url: &str) -> Result<String> {
        let response = self
            .probe
            .head(url)
            .send()
            .await
            .map_err(|e| InstallError::HttpRequest {
                url: url.to_string(),
                source: e,
            })?;
        let status = response.status();

        if is_naming_redirect(status) {
            if let Some(target) = header_str(response.headers(), LOCATION) {
                debug!("{} redirects to {}", url, target);
                return filename_from_url(target).ok_or_else(|| InstallError::Resolution {
                    url: url.to_string(),
                    reason: "redirect target has no path segment".to_string(),
                });
            }
        }

        if let Some(name) = filename_from_headers(response.headers()) {
            debug!("{} names '{}' via Content-Disposition", url, name);
            return Ok(name);
        }

        filename_from_url(url).ok_or_else(|| InstallError::Resolution {
            url: url.to_string(),
            reason: "no usable path segment".to_string(),
        })
    }
}
