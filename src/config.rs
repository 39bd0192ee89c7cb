//! Runtime configuration for the generation backend and the media pipeline.
//!
//! Values are plain data so tests can build a [`Config`] with fake keys and a
//! mock server URL instead of touching the process environment.

use crate::error::{Result, StoryError};
use crate::fetch::RetryPolicy;
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Overrides [`DEFAULT_API_URL`] when set.
pub const BASE_URL_VAR: &str = "STORYCRAFTER_BASE_URL";

/// The model identifiers used by each adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Model that writes the story continuation and extracts image prompts.
    pub text: String,
    /// Model behind the cartoon image adapter.
    pub image: String,
    /// Long-running video model.
    pub video: String,
    /// Speech synthesis model.
    pub speech: String,
    /// Prebuilt voice used for narration.
    pub voice: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            text: "gemini-2.5-flash".to_string(),
            image: "imagen-4.0-fast-generate-001".to_string(),
            video: "veo-2.0-generate-001".to_string(),
            speech: "gemini-2.5-flash-preview-tts".to_string(),
            voice: "Algenib".to_string(),
        }
    }
}

/// Settings for video generation and its poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoConfig {
    /// How long to wait before re-querying a pending operation.
    pub poll_interval: Duration,
    /// Upper bound on the whole poll loop. `None` polls until the backend
    /// reports completion.
    pub timeout: Option<Duration>,
    pub duration_seconds: u8,
    pub aspect_ratio: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            timeout: None,
            duration_seconds: 5,
            aspect_ratio: "16:9".to_string(),
        }
    }
}

/// Everything needed to build a [`GeminiClient`](crate::GeminiClient).
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: Url,
    pub models: ModelConfig,
    pub retry: RetryPolicy,
    pub video: VideoConfig,
}

impl Config {
    /// Creates a configuration pointing at the public API.
    ///
    /// An empty key is treated the same as no key.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            api_key: api_key.filter(|key| !key.is_empty()),
            base_url: Url::parse(DEFAULT_API_URL)?,
            models: ModelConfig::default(),
            retry: RetryPolicy::default(),
            video: VideoConfig::default(),
        })
    }

    /// Reads the API key and optional base URL from the process environment.
    ///
    /// # Errors
    ///
    /// - `StoryError::UrlParseFailed` if `STORYCRAFTER_BASE_URL` is not a valid URL.
    pub fn from_env() -> Result<Self> {
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|name| env::var(name).ok().filter(|value| !value.is_empty()));
        let config = Self::new(api_key)?;
        match env::var(BASE_URL_VAR) {
            Ok(base_url) if !base_url.is_empty() => config.with_base_url(&base_url),
            _ => Ok(config),
        }
    }

    /// Loads a `.env` file if one exists, then behaves like [`Config::from_env`].
    pub fn from_dotenv() -> Result<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                tracing::warn!(error = %err, "ignoring unreadable .env file");
            }
        }
        Self::from_env()
    }

    /// Points the configuration at a different API root, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = normalize_base_url(base_url)?;
        Ok(self)
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_video_config(mut self, video: VideoConfig) -> Self {
        self.video = video;
        self
    }

    /// Returns the API key or `StoryError::MissingApiKey`.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(StoryError::MissingApiKey)
    }
}

/// Endpoint paths are joined onto the base URL, so it must end in a slash.
fn normalize_base_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
