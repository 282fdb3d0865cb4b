use crate::config::SpeechConfig;
use crate::error::VoiceError;
use crate::voice_map::VoiceMap;
use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Maximum text input size for synthesis (64 KiB). Prevents resource
/// exhaustion from oversized replies.
pub const MAX_SYNTHESIS_INPUT_BYTES: usize = 64 * 1024;

const USER_AGENT: &str = concat!("parley/", env!("CARGO_PKG_VERSION"));

/// Text to speak and the language to speak it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    pub text: String,
    pub language: String,
}

/// Why a synthesis backend stopped without producing audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationReason {
    /// The backend reported an error condition.
    Error,
    /// The backend finished the stream without delivering any audio.
    EndOfStream,
}

impl fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("Error"),
            Self::EndOfStream => f.write_str("EndOfStream"),
        }
    }
}

/// What a synthesis backend reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisOutcome {
    Completed {
        audio: Vec<u8>,
    },
    Canceled {
        reason: CancellationReason,
        error_details: Option<String>,
    },
}

/// A text-to-speech backend.
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
        voice: &str,
    ) -> Result<SynthesisOutcome, VoiceError>;
}

/// Speaks reply text with the voice configured for its language.
#[derive(Clone)]
pub struct SpeechSynthesizer {
    backend: Arc<dyn SynthesisBackend>,
    voices: VoiceMap,
}

impl SpeechSynthesizer {
    pub fn new(backend: Arc<dyn SynthesisBackend>, voices: VoiceMap) -> Self {
        Self { backend, voices }
    }

    pub fn voices(&self) -> &VoiceMap {
        &self.voices
    }

    /// Returns audio only when the backend reports completion. A cancellation
    /// becomes an error carrying the reason and any nested error detail.
    pub async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, VoiceError> {
        if text.len() > MAX_SYNTHESIS_INPUT_BYTES {
            return Err(VoiceError::Synthesis(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_SYNTHESIS_INPUT_BYTES
            )));
        }

        let voice = self.voices.lookup(language);
        tracing::debug!(language, voice, "selected synthesis voice");

        let request = SynthesisRequest {
            text: text.to_string(),
            language: language.to_string(),
        };

        match self.backend.synthesize(&request, voice).await? {
            SynthesisOutcome::Completed { audio } if audio.is_empty() => Err(
                VoiceError::Synthesis("backend completed without audio data".to_string()),
            ),
            SynthesisOutcome::Completed { audio } => Ok(audio),
            SynthesisOutcome::Canceled {
                reason,
                error_details,
            } => {
                let message = match error_details {
                    Some(details) => {
                        format!("synthesis canceled: {}; error details: {}", reason, details)
                    }
                    None => format!("synthesis canceled: {}", reason),
                };
                Err(VoiceError::Synthesis(message))
            }
        }
    }
}

/// Escapes text for inclusion in SSML.
fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn build_ssml(request: &SynthesisRequest, voice: &str) -> String {
    format!(
        "<speak version='1.0' xml:lang='{lang}'><voice name='{voice}'>{text}</voice></speak>",
        lang = escape_xml(&request.language),
        voice = escape_xml(voice),
        text = escape_xml(&request.text),
    )
}

/// Azure Speech text-to-speech REST client.
#[derive(Clone)]
pub struct AzureSynthesisBackend {
    client: Client,
    base_url: String,
    key: String,
    output_format: String,
}

impl AzureSynthesisBackend {
    pub fn new(config: &SpeechConfig) -> Result<Self, VoiceError> {
        if config.key.is_empty() {
            return Err(VoiceError::Config("speech key is not set".to_string()));
        }
        if config.region.is_empty() && config.tts_endpoint.is_none() {
            return Err(VoiceError::Config(
                "speech region (or tts_endpoint) is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| VoiceError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.tts_base_url(),
            key: config.key.clone(),
            output_format: config.output_format.clone(),
        })
    }
}

#[async_trait]
impl SynthesisBackend for AzureSynthesisBackend {
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
        voice: &str,
    ) -> Result<SynthesisOutcome, VoiceError> {
        let url = format!("{}/cognitiveservices/v1", self.base_url);

        tracing::debug!(
            voice,
            chars = request.text.chars().count(),
            "sending synthesis request"
        );

        let sent = self
            .client
            .post(url)
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", &self.output_format)
            .header("User-Agent", USER_AGENT)
            .body(build_ssml(request, voice))
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                return Ok(SynthesisOutcome::Canceled {
                    reason: CancellationReason::Error,
                    error_details: Some(format!("request to speech service failed: {}", e)),
                })
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Ok(SynthesisOutcome::Canceled {
                reason: CancellationReason::Error,
                error_details: Some(format!("HTTP {}: {}", status, body)),
            });
        }

        let audio = match response.bytes().await {
            Ok(audio) => audio,
            Err(e) => {
                return Ok(SynthesisOutcome::Canceled {
                    reason: CancellationReason::Error,
                    error_details: Some(format!("failed to read audio stream: {}", e)),
                })
            }
        };

        if audio.is_empty() {
            return Ok(SynthesisOutcome::Canceled {
                reason: CancellationReason::EndOfStream,
                error_details: None,
            });
        }

        Ok(SynthesisOutcome::Completed {
            audio: audio.to_vec(),
        })
    }
}
