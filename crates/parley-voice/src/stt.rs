use crate::config::SpeechConfig;
use crate::error::VoiceError;
use async_trait::async_trait;
use parley_types::Transcript;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Maximum audio input size for recognition (25 MiB).
pub const MAX_RECOGNITION_INPUT_BYTES: usize = 25 * 1024 * 1024;

const FAST_TRANSCRIPTION_API_VERSION: &str = "2024-11-15";

/// A speech-to-text backend with automatic language identification.
#[async_trait]
pub trait RecognitionBackend: Send + Sync {
    /// Transcribes `audio`, detecting its language among `candidate_languages`.
    async fn recognize(
        &self,
        audio: &[u8],
        candidate_languages: &[String],
    ) -> Result<Transcript, VoiceError>;
}

/// Converts recorded speech into a [`Transcript`].
///
/// The detected language is passed through exactly as the backend reports
/// it; this layer never normalizes it or substitutes a fallback.
#[derive(Clone)]
pub struct SpeechRecognizer {
    backend: Arc<dyn RecognitionBackend>,
    candidate_languages: Vec<String>,
}

impl SpeechRecognizer {
    pub fn new(backend: Arc<dyn RecognitionBackend>, candidate_languages: Vec<String>) -> Self {
        Self {
            backend,
            candidate_languages,
        }
    }

    pub fn candidate_languages(&self) -> &[String] {
        &self.candidate_languages
    }

    pub async fn recognize(&self, audio: &[u8]) -> Result<Transcript, VoiceError> {
        if audio.is_empty() {
            return Err(VoiceError::Recognition("audio input is empty".to_string()));
        }
        if audio.len() > MAX_RECOGNITION_INPUT_BYTES {
            return Err(VoiceError::Recognition(format!(
                "audio data exceeds maximum size: {} bytes (limit: {} bytes)",
                audio.len(),
                MAX_RECOGNITION_INPUT_BYTES
            )));
        }

        let transcript = self
            .backend
            .recognize(audio, &self.candidate_languages)
            .await?;

        if transcript.text.trim().is_empty() {
            return Err(VoiceError::Recognition(
                "no speech could be recognized".to_string(),
            ));
        }

        Ok(transcript)
    }
}

/// Azure Speech fast transcription REST client.
#[derive(Clone)]
pub struct AzureRecognitionBackend {
    client: Client,
    base_url: String,
    key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FastTranscription {
    #[serde(default)]
    combined_phrases: Vec<CombinedPhrase>,
    #[serde(default)]
    phrases: Vec<Phrase>,
}

#[derive(Debug, Deserialize)]
struct CombinedPhrase {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct Phrase {
    #[serde(default)]
    locale: Option<String>,
    #[serde(default)]
    text: String,
}

impl AzureRecognitionBackend {
    pub fn new(config: &SpeechConfig) -> Result<Self, VoiceError> {
        if config.key.is_empty() {
            return Err(VoiceError::Config("speech key is not set".to_string()));
        }
        if config.region.is_empty() && config.stt_endpoint.is_none() {
            return Err(VoiceError::Config(
                "speech region (or stt_endpoint) is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| VoiceError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.stt_base_url(),
            key: config.key.clone(),
        })
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/speechtotext/transcriptions:transcribe?api-version={}",
            self.base_url, FAST_TRANSCRIPTION_API_VERSION
        )
    }
}

#[async_trait]
impl RecognitionBackend for AzureRecognitionBackend {
    async fn recognize(
        &self,
        audio: &[u8],
        candidate_languages: &[String],
    ) -> Result<Transcript, VoiceError> {
        let definition = serde_json::json!({ "locales": candidate_languages }).to_string();
        let audio_part = Part::bytes(audio.to_vec())
            .file_name("audio")
            .mime_str("application/octet-stream")
            .map_err(|e| VoiceError::Recognition(format!("invalid audio part: {}", e)))?;
        let form = Form::new()
            .part("audio", audio_part)
            .text("definition", definition);

        tracing::debug!(
            bytes = audio.len(),
            locales = ?candidate_languages,
            "sending fast transcription request"
        );

        let response = self
            .client
            .post(self.endpoint_url())
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                VoiceError::Recognition(format!("request to speech service failed: {}", e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            VoiceError::Recognition(format!("failed to read response body: {}", e))
        })?;

        if !status.is_success() {
            return Err(VoiceError::Recognition(format!(
                "HTTP {} from speech service: {}",
                status, body
            )));
        }

        parse_transcription(&body)
    }
}

/// Extracts text and detected locale from a fast transcription response.
fn parse_transcription(body: &str) -> Result<Transcript, VoiceError> {
    let parsed: FastTranscription = serde_json::from_str(body)
        .map_err(|e| VoiceError::Recognition(format!("invalid transcription response: {}", e)))?;

    let text = match parsed.combined_phrases.first() {
        Some(combined) => combined.text.clone(),
        None => parsed
            .phrases
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    };

    if text.trim().is_empty() {
        return Err(VoiceError::Recognition(
            "no speech could be recognized".to_string(),
        ));
    }

    let language = parsed
        .phrases
        .iter()
        .find_map(|p| p.locale.clone().filter(|l| !l.is_empty()))
        .ok_or_else(|| {
            VoiceError::Recognition("speech service did not report a language".to_string())
        })?;

    Ok(Transcript { text, language })
}
