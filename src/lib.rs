//! Backend orchestration for an illustrated, narrated storytelling app.
//!
//! A user writes a story fragment; this crate asks a generative backend for
//! the next part of the story and then dresses it up with media. It handles
//! partial failures so the user still gets a page when enrichment fails.
//!
//! ## Features
//! - Story continuation with a strict fallback tree: video, else a placeholder image.
//! - Best-effort narration returned as a WAV data URI.
//! - Long-running video operations polled until completion.
//! - Media downloads with exponential-backoff retries.
//! - Schema-validated adapter records and typed error handling.
//!
//! ## Example
//!
//! ```no_run
//! # use storycrafter::{Config, GeminiClient, StoryOrchestrator};
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let client = GeminiClient::from_config(&Config::from_dotenv()?)?;
//! let orchestrator = StoryOrchestrator::new(client);
//! let response = orchestrator
//!     .continue_story("", "The fox opened the door")
//!     .await;
//! match response.into_result() {
//!     Ok(page) => println!("{}", page.text),
//!     Err(code) => eprintln!("failed: {code}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod download;
pub mod error;
pub mod fetch;
pub mod gemini;
pub mod media;
pub mod operation;
pub mod orchestrator;
pub mod story;
pub mod types;

pub use backend::GenerationBackend;
pub use config::{Config, ModelConfig, VideoConfig};
pub use download::MediaDownloader;
pub use error::{ErrorCode, Result, StoryError};
pub use fetch::{fetch_with_retry, FetchOptions, RetryPolicy};
pub use gemini::GeminiClient;
pub use operation::{generate_story_video, wait_for_media, VideoOperations};
pub use orchestrator::{
    ContinueStoryResponse, ImageHint, StoryOrchestrator, Visuals, FALLBACK_IMAGE_HINT,
};
pub use story::{PrimaryVisual, Story, StoryPart, StoryPartFields};
pub use types::*;
