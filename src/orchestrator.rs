//! Turns one user submission into one story page.
//!
//! Steps run strictly in order: continuation, image prompt, video (or a
//! placeholder image), narration. Only the continuation step can fail the
//! request. Every later step resolves to a tagged value, either the
//! generated media or a degraded default, so the fallback tree is plain
//! branching and each branch can be exercised on its own.

use crate::backend::GenerationBackend;
use crate::error::{ErrorCode, Result, StoryError};
use crate::media::placeholder_image_url;
use crate::story::{Story, StoryPart, StoryPartFields};
use crate::types::{ContinueStoryInput, GenerateVideoInput, ImagePromptInput, TextToSpeechInput};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Hint used when no prompt could be extracted from the continuation.
pub const FALLBACK_IMAGE_HINT: &str = "fantasy magical";

/// What the UI receives for a submission. Exactly one of the fields is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinueStoryResponse {
    pub data: Option<StoryPartFields>,
    pub error: Option<ErrorCode>,
}

impl ContinueStoryResponse {
    pub fn success(data: StoryPartFields) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(code: ErrorCode) -> Self {
        Self {
            data: None,
            error: Some(code),
        }
    }

    pub fn into_result(self) -> std::result::Result<StoryPartFields, ErrorCode> {
        match (self.data, self.error) {
            (Some(data), None) => Ok(data),
            (_, Some(code)) => Err(code),
            (None, None) => Err(ErrorCode::ApiFailure),
        }
    }
}

/// Outcome of the image prompt step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageHint {
    Extracted(String),
    /// Extraction failed or produced an empty prompt.
    Fallback,
}

/// Outcome of the visual media steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visuals {
    Video {
        video_url: String,
        image_hint: String,
    },
    Placeholder {
        image_url: String,
        image_hint: String,
    },
}

impl Visuals {
    pub fn placeholder(image_hint: impl Into<String>) -> Self {
        Visuals::Placeholder {
            image_url: placeholder_image_url(),
            image_hint: image_hint.into(),
        }
    }

    pub fn image_hint(&self) -> &str {
        match self {
            Visuals::Video { image_hint, .. } | Visuals::Placeholder { image_hint, .. } => {
                image_hint
            }
        }
    }

    fn into_fields(self, text: String, audio_url: Option<String>) -> StoryPartFields {
        let (video_url, image_url, image_hint) = match self {
            Visuals::Video {
                video_url,
                image_hint,
            } => (Some(video_url), None, image_hint),
            Visuals::Placeholder {
                image_url,
                image_hint,
            } => (None, Some(image_url), image_hint),
        };
        StoryPartFields {
            text,
            image_url,
            video_url,
            audio_url,
            image_hint: Some(image_hint),
        }
    }
}

/// Sequences the generation calls for each submission.
///
/// Holds no mutable state, so concurrent submissions are independent.
pub struct StoryOrchestrator<B> {
    backend: B,
}

impl<B: GenerationBackend> StoryOrchestrator<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Produces the next page for `user_input`.
    ///
    /// `_story_so_far` is accepted to keep the call shape stable but is not
    /// part of the continuation prompt; only the latest input is sent.
    pub async fn continue_story(
        &self,
        _story_so_far: &str,
        user_input: &str,
    ) -> ContinueStoryResponse {
        match self.build_part(user_input).await {
            Ok(fields) => ContinueStoryResponse::success(fields),
            Err(StoryError::EmptyResult) => {
                warn!("story continuation came back empty");
                ContinueStoryResponse::failure(ErrorCode::AiEmptyResponse)
            }
            Err(err) => {
                error!(error = %err, "story continuation failed");
                ContinueStoryResponse::failure(err.code())
            }
        }
    }

    /// Runs [`continue_story`](Self::continue_story) against a session and
    /// appends the resulting page.
    pub async fn continue_session<'s>(
        &self,
        story: &'s mut Story,
        user_input: &str,
    ) -> std::result::Result<&'s StoryPart, ErrorCode> {
        let fields = self
            .continue_story(&story.transcript(), user_input)
            .await
            .into_result()?;
        Ok(story.push(fields))
    }

    async fn build_part(&self, user_input: &str) -> Result<StoryPartFields> {
        let text = self
            .backend
            .continue_story(&ContinueStoryInput::new(user_input))
            .await?
            .story_continuation;
        if text.trim().is_empty() {
            return Err(StoryError::EmptyResult);
        }

        let visuals = self.visuals(&text).await;
        let audio_url = self.narration(&text).await;
        Ok(visuals.into_fields(text, audio_url))
    }

    /// Asks the backend for a concise visual prompt describing `text`.
    pub async fn image_hint(&self, text: &str) -> ImageHint {
        match self
            .backend
            .extract_image_prompt(&ImagePromptInput::new(text))
            .await
        {
            Ok(Some(output)) if !output.prompt.trim().is_empty() => {
                ImageHint::Extracted(output.prompt)
            }
            Ok(_) => {
                warn!("image prompt generation returned nothing, using placeholder image");
                ImageHint::Fallback
            }
            Err(err) => {
                warn!(error = %err, "image prompt generation failed, using placeholder image");
                ImageHint::Fallback
            }
        }
    }

    /// Prefers a generated video, falling back to a placeholder image that
    /// keeps `image_hint`.
    pub async fn video_or_placeholder(&self, image_hint: String) -> Visuals {
        match self
            .backend
            .generate_video(&GenerateVideoInput::new(image_hint.clone()))
            .await
        {
            Ok(output) => {
                info!(hint = %image_hint, "video generated");
                Visuals::Video {
                    video_url: output.video_data_uri,
                    image_hint,
                }
            }
            Err(err) => {
                warn!(error = %err, "video generation failed, falling back to image");
                Visuals::placeholder(image_hint)
            }
        }
    }

    /// The full visual fallback tree for one continuation.
    pub async fn visuals(&self, text: &str) -> Visuals {
        match self.image_hint(text).await {
            ImageHint::Extracted(hint) => self.video_or_placeholder(hint).await,
            ImageHint::Fallback => Visuals::placeholder(FALLBACK_IMAGE_HINT),
        }
    }

    /// Narrates `text`. Failures only cost the audio.
    pub async fn narration(&self, text: &str) -> Option<String> {
        match self
            .backend
            .text_to_speech(&TextToSpeechInput::new(text))
            .await
        {
            Ok(output) => Some(output.audio_data_uri),
            Err(err) => {
                warn!(error = %err, "audio generation failed");
                None
            }
        }
    }
}
