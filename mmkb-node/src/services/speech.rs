use crate::config::SpeechConfig;
use crate::error::{ConfigError, TranscribeError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Recognizes the utterance in a canonical WAV payload.
    async fn recognize(&self, wav: Vec<u8>) -> Result<String, TranscribeError>;
}

/// Client for an OpenAI-compatible `audio/transcriptions` endpoint.
pub struct WhisperApiRecognizer {
    endpoint: String,
    model: String,
    api_key: String,
    language: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl WhisperApiRecognizer {
    pub fn from_config(config: &SpeechConfig) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key()?.to_string();
        Ok(Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            language: config.language.clone(),
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperApiRecognizer {
    async fn recognize(&self, wav: Vec<u8>) -> Result<String, TranscribeError> {
        let file = Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")?;

        let mut form = Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("response_format", "json");
        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscribeError::Service { status, body });
        }

        let parsed: TranscriptionResponse = response.json().await?;
        Ok(parsed.text.trim().to_string())
    }
}
