use super::api::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageParameters,
    LongRunningOperation, PredictRequest, PredictResponse, PromptInstance, SpeechConfig,
    VideoParameters,
};
use crate::backend::GenerationBackend;
use crate::config::{Config, ModelConfig, VideoConfig};
use crate::download::MediaDownloader;
use crate::error::{Result, StoryError};
use crate::media::{data_uri, pcm_sample_rate, pcm_to_wav, DEFAULT_PCM_SAMPLE_RATE};
use crate::operation::{generate_story_video, VideoOperations};
use crate::types::{
    ContinueStoryInput, ContinueStoryOutput, GenerateImageInput, GenerateImageOutput,
    GenerateVideoInput, GenerateVideoOutput, ImagePromptInput, ImagePromptOutput, Operation,
    TextToSpeechInput, TextToSpeechOutput, Validate,
};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::debug;
use url::Url;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// The main client for the Generative Language API.
///
/// Implements every adapter the orchestrator needs. It holds a shared
/// `reqwest::Client` and is cheap to clone.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: Url,
    models: ModelConfig,
    video: VideoConfig,
    downloader: MediaDownloader,
}

impl GeminiClient {
    /// Creates a new `GeminiClient`.
    ///
    /// Uses `api_key` when given, otherwise the `GEMINI_API_KEY` or
    /// `GOOGLE_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// - `StoryError::MissingApiKey` if no key is found either way.
    /// - `StoryError::RequestFailed` if the internal HTTP client fails to build.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let mut config = Config::from_env()?;
        if let Some(key) = api_key.filter(|key| !key.is_empty()) {
            config.api_key = Some(key);
        }
        Self::from_config(&config)
    }

    /// Creates a new `GeminiClient` against a custom base URL, e.g. a mock server.
    pub fn new_with_url(api_key: String, base_url: &str) -> Result<Self> {
        let config = Config::new(Some(api_key))?.with_base_url(base_url)?;
        Self::from_config(&config)
    }

    /// Creates a client from an explicit [`Config`].
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.require_api_key()?;

        let mut key_header =
            HeaderValue::from_str(api_key).map_err(|_| StoryError::InvalidApiKey)?;
        key_header.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        // Media hosts get the key as a query parameter only.
        let download_client = reqwest::Client::builder().build()?;
        let downloader = MediaDownloader::new(download_client, Some(api_key.to_string()))
            .with_retry_policy(config.retry);

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            models: config.models.clone(),
            video: config.video.clone(),
            downloader,
        })
    }

    pub fn models(&self) -> &ModelConfig {
        &self.models
    }

    pub fn downloader(&self) -> &MediaDownloader {
        &self.downloader
    }

    async fn post_json<T: Serialize, R: DeserializeOwned>(&self, path: &str, body: &T) -> Result<R> {
        let url = self.base_url.join(path)?;
        debug!(%url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        Self::read_json(response).await
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let url = self.base_url.join(path)?;
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        Self::read_json(response).await
    }

    async fn read_json<R: DeserializeOwned>(response: reqwest::Response) -> Result<R> {
        let status = response.status();
        if status.is_success() {
            let body = response.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        } else {
            let error_body = response.text().await.unwrap_or_default();
            Err(StoryError::ApiError {
                message: if error_body.is_empty() {
                    status.to_string()
                } else {
                    format!("{status}: {error_body}")
                },
            })
        }
    }

    async fn generate_content(
        &self,
        model: &str,
        prompt: String,
        generation_config: GenerationConfig,
    ) -> Result<GenerateContentResponse> {
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config,
        };
        self.post_json(&format!("models/{model}:generateContent"), &request)
            .await
    }
}

fn storyteller_prompt(story_so_far: &str) -> String {
    format!(
        "You are a storyteller for children with a big, enthusiastic and motivational personality. \
Your stories are exciting, positive and full of action, and you never stop telling your listeners \
to never give up! Continue the following story with one or two exciting new sentences. \
Keep the story moving forward.\n\nSTORY SO FAR:\n---\n{story_so_far}\n---\n\nWHAT HAPPENS NEXT:"
    )
}

fn image_prompt_prompt(story_text: &str) -> String {
    format!(
        "Extract a concise, visually descriptive prompt for an image generation model from the \
following story text. Focus on characters, objects, and the environment. The prompt should be a \
single phrase. For example, for \"A brave knight entered a dark cave where a dragon slept on a \
pile of gold\" a good prompt would be \"A brave knight in a dark cave with a sleeping dragon and \
gold.\".\n\nStory: {story_text}\n\nImage Prompt:"
    )
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn continue_story(&self, input: &ContinueStoryInput) -> Result<ContinueStoryOutput> {
        input.validate()?;
        let response = self
            .generate_content(
                &self.models.text,
                storyteller_prompt(&input.story_so_far),
                GenerationConfig {
                    temperature: Some(0.8),
                    ..Default::default()
                },
            )
            .await?;

        Ok(ContinueStoryOutput {
            story_continuation: response.text().unwrap_or_default(),
        })
    }

    async fn extract_image_prompt(
        &self,
        input: &ImagePromptInput,
    ) -> Result<Option<ImagePromptOutput>> {
        input.validate()?;
        let response = self
            .generate_content(
                &self.models.text,
                image_prompt_prompt(&input.story_text),
                GenerationConfig {
                    response_mime_type: Some("application/json".to_string()),
                    response_schema: Some(json!({
                        "type": "OBJECT",
                        "properties": { "prompt": { "type": "STRING" } },
                        "required": ["prompt"]
                    })),
                    ..Default::default()
                },
            )
            .await?;

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(Some(serde_json::from_str(&text)?)),
            _ => Ok(None),
        }
    }

    async fn generate_video(&self, input: &GenerateVideoInput) -> Result<GenerateVideoOutput> {
        generate_story_video(self, &self.downloader, input, &self.video).await
    }

    async fn generate_image(&self, input: &GenerateImageInput) -> Result<GenerateImageOutput> {
        input.validate()?;
        let request = PredictRequest {
            instances: vec![PromptInstance {
                prompt: format!(
                    "Generate a cartoon-style image for the following scene description: {}",
                    input.text_description
                ),
            }],
            parameters: ImageParameters { sample_count: 1 },
        };
        let response: PredictResponse = self
            .post_json(&format!("models/{}:predict", self.models.image), &request)
            .await?;

        let (bytes, mime_type) = response
            .predictions
            .into_iter()
            .find_map(|prediction| {
                let bytes = prediction.bytes_base64_encoded?;
                Some((bytes, prediction.mime_type))
            })
            .ok_or_else(|| StoryError::GenerationFailed("no image was generated".to_string()))?;

        let output = GenerateImageOutput {
            cartoon_image_data_uri: data_uri(mime_type.as_deref().unwrap_or("image/png"), &bytes),
        };
        output.validate()?;
        Ok(output)
    }

    async fn text_to_speech(&self, input: &TextToSpeechInput) -> Result<TextToSpeechOutput> {
        input.validate()?;
        let response = self
            .generate_content(
                &self.models.speech,
                input.text.clone(),
                GenerationConfig {
                    response_modalities: Some(vec!["AUDIO".to_string()]),
                    speech_config: Some(SpeechConfig::prebuilt(self.models.voice.clone())),
                    ..Default::default()
                },
            )
            .await?;

        let audio = response
            .inline_data()
            .ok_or_else(|| StoryError::GenerationFailed("no audio was generated".to_string()))?;

        let audio_data_uri = if is_raw_pcm(&audio.mime_type) {
            let pcm = STANDARD.decode(&audio.data)?;
            let rate = pcm_sample_rate(&audio.mime_type).unwrap_or(DEFAULT_PCM_SAMPLE_RATE);
            let wav = pcm_to_wav(&pcm, 1, rate, 16).ok_or_else(|| {
                StoryError::GenerationFailed(format!(
                    "unsupported narration audio format: {}",
                    audio.mime_type
                ))
            })?;
            data_uri("audio/wav", &STANDARD.encode(wav))
        } else {
            data_uri(&audio.mime_type, &audio.data)
        };

        let output = TextToSpeechOutput { audio_data_uri };
        output.validate()?;
        Ok(output)
    }
}

fn is_raw_pcm(mime_type: &str) -> bool {
    let mime_type = mime_type.to_ascii_lowercase();
    mime_type.starts_with("audio/l16") || mime_type.contains("codec=pcm")
}

#[async_trait]
impl VideoOperations for GeminiClient {
    async fn start_video(&self, input: &GenerateVideoInput) -> Result<Operation> {
        let request = PredictRequest {
            instances: vec![PromptInstance {
                prompt: format!(
                    "Generate a whimsical, kid-friendly animated video for the following scene: {}",
                    input.text_description
                ),
            }],
            parameters: VideoParameters {
                duration_seconds: self.video.duration_seconds,
                aspect_ratio: self.video.aspect_ratio.clone(),
            },
        };
        let operation: LongRunningOperation = self
            .post_json(
                &format!("models/{}:predictLongRunning", self.models.video),
                &request,
            )
            .await?;

        if operation.name.is_empty() {
            return Err(StoryError::GenerationFailed(
                "expected the model to return an operation".to_string(),
            ));
        }
        Ok(operation.into())
    }

    async fn check_operation(&self, operation: &Operation) -> Result<Operation> {
        let refreshed: LongRunningOperation = self.get_json(&operation.name).await?;
        Ok(refreshed.into())
    }
}
