//! HTTP utilities for downloading build inputs.
//!
//! Every network access (revision lookup, Miniconda installer, payload
//! script, appimagetool) is a single GET through a [`Fetcher`]. There is no
//! retry: a failed request is reported once and the caller decides whether
//! that is fatal.

use crate::bundler::error::{Context, Error, ErrorExt, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Performs plain HTTP GETs.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    /// Fetches `url` and returns the body as text.
    async fn get_text(&self, url: &str) -> Result<String>;

    /// Fetches `url` into `dest`, replacing any existing file.
    ///
    /// The body is written next to `dest` first and renamed into place once
    /// complete, so an interrupted download never leaves a truncated `dest`.
    async fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// [`Fetcher`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a client identifying itself as this tool (GitHub's API rejects
    /// requests without a `User-Agent`).
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let download_error = |e: reqwest::Error| Error::Download {
            url: url.to_string(),
            reason: e.to_string(),
        };

        self.client
            .get(url)
            .send()
            .await
            .map_err(download_error)?
            .error_for_status()
            .map_err(download_error)
    }
}

impl Fetcher for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        log::debug!("GET {}", url);
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|e| Error::Download {
                url: url.to_string(),
                reason: format!("failed to read response: {e}"),
            })
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        use futures_lite::StreamExt;

        log::info!("Downloading {}", url);

        let response = self.get(url).await?;
        let part = partial_path(dest);
        let mut file = tokio::fs::File::create(&part)
            .await
            .fs_context("creating download file", &part)?;

        let mut stream = std::pin::pin!(response.bytes_stream());
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::Download {
                url: url.to_string(),
                reason: format!("failed to read response: {e}"),
            })?;
            file.write_all(&chunk)
                .await
                .fs_context("writing download", &part)?;
            written += chunk.len() as u64;
        }
        file.flush().await.fs_context("flushing download", &part)?;
        drop(file);

        tokio::fs::rename(&part, dest)
            .await
            .fs_context("moving download into place", dest)?;

        log::debug!("Downloaded {} bytes to {}", written, dest.display());
        Ok(())
    }
}

/// `<dest>.part`
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = OsString::from(dest.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}

/// Downloads `url` to `dest` unless `dest` already exists.
///
/// Returns `true` when a download happened.
pub async fn download_if_missing<F: Fetcher>(fetcher: &F, url: &str, dest: &Path) -> Result<bool> {
    if tokio::fs::try_exists(dest).await.unwrap_or(false) {
        log::debug!("Using cached {}", dest.display());
        return Ok(false);
    }
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating download directory", parent)?;
    }
    fetcher.download(url, dest).await?;
    Ok(true)
}
