use serde::{Deserialize, Serialize};

/// Represents the possible errors raised while generating a story page.
#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("The storyteller returned an empty continuation")]
    EmptyResult,
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
    #[error("Failed to fetch media: {status}. Details: {body}")]
    DownloadFailed { status: String, body: String },
    #[error("Invalid media reference: {0}")]
    InvalidReference(String),
    #[error("API key is missing. Please provide it or set the GEMINI_API_KEY environment variable.")]
    MissingApiKey,
    #[error("API key contains characters that cannot be sent in a header")]
    InvalidApiKey,
    #[error("API request failed: {message}")]
    ApiError { message: String },
    #[error("Network request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Failed to parse API response: {0}")]
    ResponseParseFailed(#[from] serde_json::Error),
    #[error("URL parsing failed: {0}")]
    UrlParseFailed(#[from] url::ParseError),
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),
}

impl StoryError {
    /// Maps a failure of the primary continuation step onto the code shown to the user.
    pub fn code(&self) -> ErrorCode {
        match self {
            StoryError::EmptyResult => ErrorCode::AiEmptyResponse,
            _ => ErrorCode::ApiFailure,
        }
    }
}

/// The coarse error codes surfaced to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The continuation step produced nothing usable.
    AiEmptyResponse,
    /// The continuation call itself failed.
    ApiFailure,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AiEmptyResponse => "AI_EMPTY_RESPONSE",
            ErrorCode::ApiFailure => "API_FAILURE",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Result<T> = std::result::Result<T, StoryError>;
