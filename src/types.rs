//! Request and response records for the generation adapters, plus long-running operations.

use crate::error::{Result, StoryError};
use crate::media::parse_data_uri;
use serde::{Deserialize, Serialize};

/// Schema checks run on adapter records before and after each external call.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoryError::Validation(format!("`{field}` must not be empty")));
    }
    Ok(())
}

fn require_data_uri(field: &str, value: &str) -> Result<()> {
    if parse_data_uri(value).is_none() {
        return Err(StoryError::Validation(format!(
            "`{field}` must be a data URI of the form data:<mimetype>;base64,<encoded_data>"
        )));
    }
    Ok(())
}

/// Input to the story continuation adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueStoryInput {
    /// The story that has been written so far.
    pub story_so_far: String,
}

impl ContinueStoryInput {
    pub fn new(story_so_far: impl Into<String>) -> Self {
        Self {
            story_so_far: story_so_far.into(),
        }
    }
}

impl Validate for ContinueStoryInput {
    fn validate(&self) -> Result<()> {
        require_text("storySoFar", &self.story_so_far)
    }
}

/// The next part of the story. May be empty when the model has nothing to say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueStoryOutput {
    pub story_continuation: String,
}

/// Input to the image prompt extraction call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePromptInput {
    pub story_text: String,
}

impl ImagePromptInput {
    pub fn new(story_text: impl Into<String>) -> Self {
        Self {
            story_text: story_text.into(),
        }
    }
}

impl Validate for ImagePromptInput {
    fn validate(&self) -> Result<()> {
        require_text("storyText", &self.story_text)
    }
}

/// A single visually descriptive phrase for media generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePromptOutput {
    pub prompt: String,
}

/// Input to the video adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoInput {
    /// A description of the scene to generate a video for.
    pub text_description: String,
}

impl GenerateVideoInput {
    pub fn new(text_description: impl Into<String>) -> Self {
        Self {
            text_description: text_description.into(),
        }
    }
}

impl Validate for GenerateVideoInput {
    fn validate(&self) -> Result<()> {
        require_text("textDescription", &self.text_description)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoOutput {
    /// `data:video/mp4;base64,...`
    pub video_data_uri: String,
}

impl Validate for GenerateVideoOutput {
    fn validate(&self) -> Result<()> {
        require_data_uri("videoDataUri", &self.video_data_uri)
    }
}

/// Input to the cartoon image adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageInput {
    /// A description of the scene to generate an image for.
    pub text_description: String,
}

impl GenerateImageInput {
    pub fn new(text_description: impl Into<String>) -> Self {
        Self {
            text_description: text_description.into(),
        }
    }
}

impl Validate for GenerateImageInput {
    fn validate(&self) -> Result<()> {
        require_text("textDescription", &self.text_description)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageOutput {
    pub cartoon_image_data_uri: String,
}

impl Validate for GenerateImageOutput {
    fn validate(&self) -> Result<()> {
        require_data_uri("cartoonImageDataUri", &self.cartoon_image_data_uri)
    }
}

/// Input to the speech adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextToSpeechInput {
    pub text: String,
}

impl TextToSpeechInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Validate for TextToSpeechInput {
    fn validate(&self) -> Result<()> {
        require_text("text", &self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToSpeechOutput {
    /// `data:audio/wav;base64,...`
    pub audio_data_uri: String,
}

impl Validate for TextToSpeechOutput {
    fn validate(&self) -> Result<()> {
        require_data_uri("audioDataUri", &self.audio_data_uri)
    }
}

/// A pointer to remotely hosted media, resolved by the
/// [`MediaDownloader`](crate::MediaDownloader).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaReference {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl MediaReference {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content_type: None,
        }
    }
}

/// One item of an operation's output. Only some items carry media.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OperationOutput {
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

/// A handle to a long-running generation job.
///
/// Created by the initial generation call and replaced by each re-poll of the
/// same `name`. Terminal once `done` is true.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OperationOutput>,
}

/// Where an [`Operation`] stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState<'a> {
    Pending,
    DoneSuccess(&'a MediaReference),
    DoneError(&'a str),
    DoneNoMedia,
}

impl Operation {
    pub fn state(&self) -> OperationState<'_> {
        if !self.done {
            return OperationState::Pending;
        }
        if let Some(error) = &self.error {
            return OperationState::DoneError(&error.message);
        }
        // A reference without a URL cannot be downloaded.
        self.first_media()
            .filter(|media| !media.url.trim().is_empty())
            .map(OperationState::DoneSuccess)
            .unwrap_or(OperationState::DoneNoMedia)
    }

    /// The first output item that carries a media reference.
    pub fn first_media(&self) -> Option<&MediaReference> {
        self.output
            .as_ref()?
            .content
            .iter()
            .find_map(|part| part.media.as_ref())
    }
}
