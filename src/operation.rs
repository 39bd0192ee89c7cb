//! Long-running video generation: start an operation, poll it until the
//! backend reports a terminal state, then download the result.

use crate::config::VideoConfig;
use crate::download::MediaDownloader;
use crate::error::{Result, StoryError};
use crate::media::data_uri;
use crate::types::{
    GenerateVideoInput, GenerateVideoOutput, MediaReference, Operation, OperationState, Validate,
};
use async_trait::async_trait;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

/// The two calls a video backend must support for the poll loop.
#[async_trait]
pub trait VideoOperations: Send + Sync {
    /// Submits a generation job. The returned operation may already be done.
    async fn start_video(&self, input: &GenerateVideoInput) -> Result<Operation>;

    /// Re-queries the same operation handle.
    async fn check_operation(&self, operation: &Operation) -> Result<Operation>;
}

/// Polls `operation` every `config.poll_interval` until it is done and
/// returns the media it produced.
///
/// Without `config.timeout` the loop only ends when the backend reports
/// completion or a poll request fails.
pub async fn wait_for_media<V>(
    backend: &V,
    mut operation: Operation,
    config: &VideoConfig,
) -> Result<MediaReference>
where
    V: VideoOperations + ?Sized,
{
    let started = Instant::now();
    let mut polls = 0u32;
    loop {
        match operation.state() {
            OperationState::Pending => {}
            OperationState::DoneError(message) => {
                return Err(StoryError::GenerationFailed(message.to_string()));
            }
            OperationState::DoneNoMedia => {
                return Err(StoryError::GenerationFailed("no media found".to_string()));
            }
            OperationState::DoneSuccess(media) => {
                info!(operation = %operation.name, polls, "video operation finished");
                return Ok(media.clone());
            }
        }

        if let Some(timeout) = config.timeout {
            if started.elapsed() >= timeout {
                return Err(StoryError::GenerationFailed(format!(
                    "timed out after {}s waiting for operation {}",
                    timeout.as_secs_f64(),
                    operation.name
                )));
            }
        }

        debug!(operation = %operation.name, polls, "video operation pending");
        sleep(config.poll_interval).await;
        operation = backend.check_operation(&operation).await?;
        polls += 1;
    }
}

/// Generates a video for `input` and returns it as an mp4 data URI.
pub async fn generate_story_video<V>(
    backend: &V,
    downloader: &MediaDownloader,
    input: &GenerateVideoInput,
    config: &VideoConfig,
) -> Result<GenerateVideoOutput>
where
    V: VideoOperations + ?Sized,
{
    input.validate()?;

    let operation = backend.start_video(input).await?;
    let media = wait_for_media(backend, operation, config).await?;
    let encoded = downloader.download_media(&media).await?;

    let output = GenerateVideoOutput {
        video_data_uri: data_uri("video/mp4", &encoded),
    };
    output.validate()?;
    Ok(output)
}
