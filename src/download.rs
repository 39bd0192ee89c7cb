//! Downloading generated media and encoding it as base64.

use crate::error::{Result, StoryError};
use crate::fetch::{fetch_with_retry, FetchOptions, RetryPolicy};
use crate::types::MediaReference;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::debug;
use url::Url;

/// Query parameter carrying the API key on signed media URLs.
pub const API_KEY_PARAM: &str = "key";

/// Resolves [`MediaReference`]s to base64 payloads.
///
/// The generation service hands out media URLs that still need the API key
/// appended, so the downloader is built with the key it should add.
#[derive(Clone)]
pub struct MediaDownloader {
    client: reqwest::Client,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl MediaDownloader {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key: api_key.filter(|key| !key.is_empty()),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The URL that will actually be fetched for `url`.
    ///
    /// The key is appended only when one is configured and the URL has no
    /// `key` parameter yet.
    ///
    /// # Errors
    ///
    /// - `StoryError::InvalidReference` if `url` is not an absolute URL.
    pub fn authorized_url(&self, url: &str) -> Result<Url> {
        let mut parsed = Url::parse(url)
            .map_err(|err| StoryError::InvalidReference(format!("{url}: {err}")))?;

        let has_key = parsed
            .query_pairs()
            .any(|(name, _)| name == API_KEY_PARAM);
        if let (false, Some(key)) = (has_key, &self.api_key) {
            parsed.query_pairs_mut().append_pair(API_KEY_PARAM, key);
        }
        Ok(parsed)
    }

    /// Downloads the referenced media and returns it base64 encoded.
    ///
    /// # Errors
    ///
    /// - `StoryError::InvalidReference` if the reference has no usable URL.
    /// - `StoryError::DownloadFailed` if the host still answers with a
    ///   non-success status after all retries.
    /// - `StoryError::RequestFailed` on a transport error after all retries.
    pub async fn download_media(&self, media: &MediaReference) -> Result<String> {
        if media.url.trim().is_empty() {
            return Err(StoryError::InvalidReference(
                "media reference does not have a URL".to_string(),
            ));
        }

        let url = self.authorized_url(&media.url)?;
        debug!(url = %media.url, "downloading media");
        let response = fetch_with_retry(&self.client, &url, &FetchOptions::get(), self.retry).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoryError::DownloadFailed {
                status: status.to_string(),
                body,
            });
        }

        let content = response.bytes().await?;
        debug!(url = %media.url, bytes = content.len(), "media downloaded");
        Ok(STANDARD.encode(&content))
    }
}
