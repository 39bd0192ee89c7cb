#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use storycrafter::{
    ContentPart, ContinueStoryInput, ContinueStoryOutput, GenerateImageInput, GenerateImageOutput,
    GenerateVideoInput, GenerateVideoOutput, GenerationBackend, ImagePromptInput,
    ImagePromptOutput, MediaReference, Operation, OperationError, OperationOutput, Result,
    StoryError, TextToSpeechInput, TextToSpeechOutput, VideoOperations,
};
use wiremock::{Request, Respond, ResponseTemplate};

pub const FAKE_VIDEO_URI: &str = "data:video/mp4;base64,AAAAIGZ0eXBpc29t";
pub const FAKE_AUDIO_URI: &str = "data:audio/wav;base64,UklGRiQAAABXQVZF";
pub const FAKE_IMAGE_URI: &str = "data:image/png;base64,iVBORw0KGgo=";

/// What a fake adapter call should do.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Fail,
}

impl<T: Clone> Reply<T> {
    fn resolve(&self, step: &str) -> Result<T> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::Fail => Err(StoryError::GenerationFailed(format!("{step} exploded"))),
        }
    }
}

/// An in-process backend with scripted replies that records the calls it receives.
pub struct FakeBackend {
    pub continuation: Reply<String>,
    pub image_prompt: Reply<Option<String>>,
    pub video: Reply<String>,
    pub speech: Reply<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    /// Every adapter succeeds.
    pub fn happy(continuation: &str) -> Self {
        Self {
            continuation: Reply::Ok(continuation.to_string()),
            image_prompt: Reply::Ok(Some("A fox in a room full of stars".to_string())),
            video: Reply::Ok(FAKE_VIDEO_URI.to_string()),
            speech: Reply::Ok(FAKE_AUDIO_URI.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_image_prompt(mut self, reply: Reply<Option<String>>) -> Self {
        self.image_prompt = reply;
        self
    }

    pub fn with_video(mut self, reply: Reply<String>) -> Self {
        self.video = reply;
        self
    }

    pub fn with_speech(mut self, reply: Reply<String>) -> Self {
        self.speech = reply;
        self
    }

    pub fn with_continuation(mut self, reply: Reply<String>) -> Self {
        self.continuation = reply;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl GenerationBackend for FakeBackend {
    async fn continue_story(&self, input: &ContinueStoryInput) -> Result<ContinueStoryOutput> {
        self.record(format!("continue_story:{}", input.story_so_far));
        let story_continuation = self.continuation.resolve("continuation")?;
        Ok(ContinueStoryOutput { story_continuation })
    }

    async fn extract_image_prompt(
        &self,
        input: &ImagePromptInput,
    ) -> Result<Option<ImagePromptOutput>> {
        self.record(format!("extract_image_prompt:{}", input.story_text));
        let prompt = self.image_prompt.resolve("image prompt")?;
        Ok(prompt.map(|prompt| ImagePromptOutput { prompt }))
    }

    async fn generate_video(&self, input: &GenerateVideoInput) -> Result<GenerateVideoOutput> {
        self.record(format!("generate_video:{}", input.text_description));
        let video_data_uri = self.video.resolve("video")?;
        Ok(GenerateVideoOutput { video_data_uri })
    }

    async fn generate_image(&self, input: &GenerateImageInput) -> Result<GenerateImageOutput> {
        self.record(format!("generate_image:{}", input.text_description));
        Ok(GenerateImageOutput {
            cartoon_image_data_uri: FAKE_IMAGE_URI.to_string(),
        })
    }

    async fn text_to_speech(&self, input: &TextToSpeechInput) -> Result<TextToSpeechOutput> {
        self.record(format!("text_to_speech:{}", input.text));
        let audio_data_uri = self.speech.resolve("speech")?;
        Ok(TextToSpeechOutput { audio_data_uri })
    }
}

pub fn pending(name: &str) -> Operation {
    Operation {
        name: name.to_string(),
        done: false,
        ..Default::default()
    }
}

pub fn succeeded(name: &str, url: &str) -> Operation {
    Operation {
        name: name.to_string(),
        done: true,
        error: None,
        output: Some(OperationOutput {
            content: vec![
                ContentPart { media: None },
                ContentPart {
                    media: Some(MediaReference::new(url)),
                },
            ],
        }),
    }
}

pub fn failed(name: &str, message: &str) -> Operation {
    Operation {
        name: name.to_string(),
        done: true,
        error: Some(OperationError {
            message: message.to_string(),
        }),
        output: None,
    }
}

/// Hands out scripted operation snapshots: the first from `start_video`, the
/// rest from successive `check_operation` calls. The last snapshot repeats.
pub struct ScriptedOperations {
    snapshots: Mutex<VecDeque<Operation>>,
    pub starts: AtomicUsize,
    pub checks: AtomicUsize,
}

impl ScriptedOperations {
    pub fn new(snapshots: Vec<Operation>) -> Self {
        Self {
            snapshots: Mutex::new(snapshots.into()),
            starts: AtomicUsize::new(0),
            checks: AtomicUsize::new(0),
        }
    }

    fn next(&self) -> Operation {
        let mut snapshots = self.snapshots.lock().unwrap();
        if snapshots.len() > 1 {
            snapshots.pop_front().unwrap()
        } else {
            snapshots.front().cloned().unwrap()
        }
    }
}

#[async_trait]
impl VideoOperations for ScriptedOperations {
    async fn start_video(&self, _input: &GenerateVideoInput) -> Result<Operation> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(self.next())
    }

    async fn check_operation(&self, operation: &Operation) -> Result<Operation> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        let next = self.next();
        assert_eq!(next.name, operation.name, "re-polled a different handle");
        Ok(next)
    }
}

/// Fails the first `failures` requests with a 503, then serves `body`.
pub struct FlakyResponder {
    failures: usize,
    body: Vec<u8>,
    hits: AtomicUsize,
}

impl FlakyResponder {
    pub fn new(failures: usize, body: impl Into<Vec<u8>>) -> Self {
        Self {
            failures,
            body: body.into(),
            hits: AtomicUsize::new(0),
        }
    }
}

impl Respond for FlakyResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let hit = self.hits.fetch_add(1, Ordering::SeqCst);
        if hit < self.failures {
            ResponseTemplate::new(503).set_body_string("try again later")
        } else {
            ResponseTemplate::new(200).set_body_bytes(self.body.clone())
        }
    }
}
