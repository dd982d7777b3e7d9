//! OpenAI audio clients: Whisper transcription and TTS.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use super::openai_helpers::{error_message, essence, is_expected_audio, upload_extension, TranscriptionForm};
use super::transcription::Transcriber;
use super::tts::SpeechSynthesizer;
use super::types::{AudioClip, AudioFormat, SpeechRequest, TranscriptionResult};
use crate::error::{QuintetError, Result};
use crate::provider::http::{bearer_headers, shared_client, status_to_error};
use crate::util::retry::RetryPolicy;
use crate::util::timeout::with_timeout;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_WHISPER_MODEL: &str = "whisper-1";
pub const DEFAULT_TTS_MODEL: &str = "tts-1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Whisper transcription over `/audio/transcriptions`.
#[derive(Debug, Clone)]
pub struct OpenAiWhisperTranscriber {
    api_key: String,
    base_url: String,
    model: String,
    language: Option<String>,
    timeout: Duration,
    retry_policy: RetryPolicy,
}

impl OpenAiWhisperTranscriber {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_WHISPER_MODEL.to_string(),
            language: None,
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// ISO-639-1 hint, e.g. `zh`.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    fn upload_type<'a>(&self, clip: &'a AudioClip) -> Result<(&'a str, &'static str)> {
        if self.api_key.trim().is_empty() {
            return Err(QuintetError::Authentication(
                "Missing OpenAI API key for transcription".to_string(),
            ));
        }
        let mime = essence(&clip.mime_type)
            .ok_or_else(|| QuintetError::InvalidArgument("audio MIME type is empty".to_string()))?;
        let extension = upload_extension(mime).ok_or_else(|| {
            QuintetError::InvalidArgument(format!("unsupported audio MIME type: {mime}"))
        })?;
        Ok((mime, extension))
    }

    async fn transcribe_once(&self, clip: &AudioClip, mime: &str, extension: &str) -> Result<TranscriptionResult> {
        let boundary = format!("quintet-{}", Uuid::new_v4().simple());
        let body = TranscriptionForm {
            boundary: &boundary,
            model: &self.model,
            language: self.language.as_deref(),
            mime_type: mime,
            extension,
            audio: &clip.bytes,
        }
        .encode();

        let mut headers = bearer_headers(&self.api_key);
        let content_type = HeaderValue::from_str(&format!("multipart/form-data; boundary={boundary}"))
            .map_err(|e| QuintetError::InvalidArgument(format!("bad multipart boundary: {e}")))?;
        headers.insert(CONTENT_TYPE, content_type);

        let url = format!("{}/audio/transcriptions", self.base_url);
        with_timeout(self.timeout, async {
            let response = shared_client().post(url).headers(headers).body(body).send().await?;
            let status = response.status().as_u16();
            if status != 200 {
                let text = response.text().await.unwrap_or_default();
                return Err(status_to_error(status, &text));
            }
            let parsed: WhisperResponse = response.json().await?;
            Ok(TranscriptionResult {
                text: parsed.text.trim().to_string(),
                language: parsed.language,
                duration_seconds: parsed.duration,
            })
        })
        .await
    }
}

#[async_trait]
impl Transcriber for OpenAiWhisperTranscriber {
    async fn transcribe(&self, clip: &AudioClip) -> Result<TranscriptionResult> {
        if clip.is_empty() {
            return Ok(TranscriptionResult::default());
        }
        let (mime, extension) = self.upload_type(clip)?;
        debug!(model = %self.model, bytes = clip.bytes.len(), "transcribing clip");
        self.retry_policy
            .execute(|| self.transcribe_once(clip, mime, extension))
            .await
            .map_err(|e| match e {
                QuintetError::Network(_) | QuintetError::Api { .. } => QuintetError::Transcription(e.to_string()),
                other => other,
            })
    }
}

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    #[serde(default)]
    text: String,
    language: Option<String>,
    duration: Option<f64>,
}

/// TTS over `/audio/speech`.
#[derive(Debug, Clone)]
pub struct OpenAiSpeechSynthesizer {
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
    retry_policy: RetryPolicy,
}

impl OpenAiSpeechSynthesizer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_TTS_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    fn validate(&self, request: &SpeechRequest) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(QuintetError::Authentication(
                "Missing OpenAI API key for speech".to_string(),
            ));
        }
        if request.text.trim().is_empty() {
            return Err(QuintetError::InvalidArgument("speech text is empty".to_string()));
        }
        if request.voice.trim().is_empty() {
            return Err(QuintetError::InvalidArgument("voice is empty".to_string()));
        }
        if let Some(speed) = request.speed {
            if !speed.is_finite() || !(0.25..=4.0).contains(&speed) {
                return Err(QuintetError::InvalidArgument(
                    "speech speed must be between 0.25 and 4.0".to_string(),
                ));
            }
        }
        Ok(())
    }

    async fn synthesize_once(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        let mut payload = serde_json::json!({
            "model": self.model,
            "input": request.text,
            "voice": request.voice,
            "response_format": request.format.to_string(),
        });
        if let Some(speed) = request.speed {
            payload["speed"] = speed.into();
        }

        let url = format!("{}/audio/speech", self.base_url);
        let headers = bearer_headers(&self.api_key);
        with_timeout(self.timeout, async {
            let response = shared_client().post(url).headers(headers).json(&payload).send().await?;
            read_audio(response, request.format).await
        })
        .await
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeechSynthesizer {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        self.validate(request)?;
        self.retry_policy.execute(|| self.synthesize_once(request)).await
    }
}

async fn read_audio(response: reqwest::Response, format: AudioFormat) -> Result<Vec<u8>> {
    let status = response.status().as_u16();
    if status != 200 {
        let body = response.text().await.unwrap_or_default();
        return Err(status_to_error(status, &body));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/json") {
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| "expected audio, got JSON".to_string());
        return Err(QuintetError::Speech(message));
    }
    if !is_expected_audio(&content_type, format) {
        return Err(QuintetError::Speech(format!(
            "unexpected content type '{content_type}' for {format}"
        )));
    }

    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Err(QuintetError::Speech("empty audio payload".to_string()));
    }
    Ok(bytes.to_vec())
}
