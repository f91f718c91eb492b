//! OpenAI-compatible speech endpoint client.

use std::time::Duration;

use async_trait::async_trait;
use moltreader_core::{ReaderSettings, SpeechEngine, SynthesisError};
use serde::Serialize;

use crate::error::VoiceError;

/// Connection settings for [`HttpSpeechEngine`].
#[derive(Debug, Clone)]
pub struct HttpEngineConfig {
    /// Base URL, without the `/v1/audio/speech` path.
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl HttpEngineConfig {
    pub fn from_settings(settings: &ReaderSettings) -> Self {
        Self {
            base_url: settings.effective_tts_base_url().to_string(),
            model: settings.effective_tts_model().to_string(),
            api_key: settings.tts_api_key.clone(),
            timeout: settings.tts_timeout(),
        }
    }
}

impl Default for HttpEngineConfig {
    fn default() -> Self {
        Self::from_settings(&ReaderSettings::with_defaults())
    }
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'static str,
}

/// Calls `POST {base_url}/v1/audio/speech` and returns the MP3 body.
pub struct HttpSpeechEngine {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpSpeechEngine {
    pub fn new(config: HttpEngineConfig) -> Result<Self, VoiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| VoiceError::HttpClient(e.to_string()))?;

        let endpoint = format!("{}/v1/audio/speech", config.base_url.trim_end_matches('/'));
        tracing::debug!(%endpoint, model = %config.model, "Speech engine configured");

        Ok(Self {
            client,
            endpoint,
            model: config.model,
            api_key: config.api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SpeechEngine for HttpSpeechEngine {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, SynthesisError> {
        let body = SpeechRequest {
            model: &self.model,
            input: text,
            voice: voice_id,
            response_format: "mp3",
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SynthesisError::Engine("speech request timed out".to_string())
            } else {
                SynthesisError::Engine(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), voice = voice_id, "Speech request rejected");
            return Err(SynthesisError::Engine(format!(
                "HTTP {status}: {}",
                detail.trim()
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::Engine(e.to_string()))?;
        if audio.is_empty() {
            return Err(SynthesisError::Engine("empty audio response".to_string()));
        }

        tracing::debug!(bytes = audio.len(), voice = voice_id, "Synthesized speech");
        Ok(audio.to_vec())
    }
}
