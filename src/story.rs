//! Story pages and the in-memory session that collects them.

use serde::{Deserialize, Serialize};

/// Everything the orchestrator produces for one page. The consumer assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryPartFields {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Short descriptive phrase used for media generation and alt text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_hint: Option<String>,
}

/// One illustrated, narrated page of the story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryPart {
    /// Position in the story, starting at 1.
    pub id: u32,
    #[serde(flatten)]
    pub fields: StoryPartFields,
}

/// The visual a page should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryVisual<'a> {
    Video(&'a str),
    Image(&'a str),
    /// Neither a video nor an image is available yet.
    Loading,
}

impl StoryPart {
    pub fn from_fields(id: u32, fields: StoryPartFields) -> Self {
        Self { id, fields }
    }

    pub fn text(&self) -> &str {
        &self.fields.text
    }

    /// A video takes precedence over an image.
    pub fn primary_visual(&self) -> PrimaryVisual<'_> {
        match (&self.fields.video_url, &self.fields.image_url) {
            (Some(video), _) => PrimaryVisual::Video(video),
            (None, Some(image)) => PrimaryVisual::Image(image),
            (None, None) => PrimaryVisual::Loading,
        }
    }
}

/// The pages of a single session. Nothing is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    parts: Vec<StoryPart>,
}

impl Story {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parts(&self) -> &[StoryPart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Page texts joined by blank lines.
    pub fn transcript(&self) -> String {
        self.parts
            .iter()
            .map(StoryPart::text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Appends a page with the next sequence id and returns it.
    pub fn push(&mut self, fields: StoryPartFields) -> &StoryPart {
        let id = self.parts.len() as u32 + 1;
        self.parts.push(StoryPart::from_fields(id, fields));
        &self.parts[self.parts.len() - 1]
    }
}
