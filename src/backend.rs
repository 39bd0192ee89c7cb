//! The seam between the orchestrator and a generative backend.

use crate::error::Result;
use crate::types::{
    ContinueStoryInput, ContinueStoryOutput, GenerateImageInput, GenerateImageOutput,
    GenerateVideoInput, GenerateVideoOutput, ImagePromptInput, ImagePromptOutput,
    TextToSpeechInput, TextToSpeechOutput,
};
use async_trait::async_trait;

/// The generation calls the orchestrator sequences.
///
/// Implementations validate each input before making any external call.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Writes the next part of the story.
    async fn continue_story(&self, input: &ContinueStoryInput) -> Result<ContinueStoryOutput>;

    /// Extracts a concise visual prompt from story text.
    ///
    /// `Ok(None)` means the model produced no structured output.
    async fn extract_image_prompt(
        &self,
        input: &ImagePromptInput,
    ) -> Result<Option<ImagePromptOutput>>;

    /// Generates a short video and returns it as a data URI.
    async fn generate_video(&self, input: &GenerateVideoInput) -> Result<GenerateVideoOutput>;

    /// Generates a cartoon-style still image and returns it as a data URI.
    async fn generate_image(&self, input: &GenerateImageInput) -> Result<GenerateImageOutput>;

    /// Narrates text and returns the audio as a data URI.
    async fn text_to_speech(&self, input: &TextToSpeechInput) -> Result<TextToSpeechOutput>;
}
