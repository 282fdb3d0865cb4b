use crate::config::LlmConfig;
use crate::error::VoiceError;
use async_trait::async_trait;
use parley_types::{Persona, Transcript};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// A text generation backend. Both generation modes go through this single
/// call shape; only the submitted contents differ.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, contents: &str) -> Result<String, VoiceError>;
}

/// Input to one generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub transcript: Transcript,
    /// Present only in persona mode.
    pub persona: Option<Persona>,
}

/// Builds the persona-mode prompt.
///
/// The persona's name and description and the user's text are inserted
/// verbatim. The instruction pins the reply language to the input's and asks
/// for plain speakable text.
pub fn persona_prompt(text: &str, persona: &Persona) -> String {
    format!(
        "You are {name}. {description}\n\n\
         Stay in character as {name}. Reply in the same language as the user's message below. \
         Return only raw text that will be spoken aloud: no markdown, no formatting, \
         no emojis, no stage directions or descriptions of actions.\n\n\
         User message: {text}",
        name = persona.name,
        description = persona.prompt_description,
        text = text,
    )
}

/// Turns a transcript into reply text, generically or in character.
#[derive(Clone)]
pub struct ResponseGenerator {
    backend: Arc<dyn GenerationBackend>,
}

impl ResponseGenerator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// Generic mode: the text is forwarded unmodified.
    pub async fn generate(&self, text: &str) -> Result<String, VoiceError> {
        self.complete(text).await
    }

    /// Persona mode.
    pub async fn generate_as(&self, text: &str, persona: &Persona) -> Result<String, VoiceError> {
        self.complete(&persona_prompt(text, persona)).await
    }

    /// Dispatches on whether the request carries a persona.
    pub async fn respond(&self, request: &GenerationRequest) -> Result<String, VoiceError> {
        match &request.persona {
            Some(persona) => self.generate_as(&request.transcript.text, persona).await,
            None => self.generate(&request.transcript.text).await,
        }
    }

    async fn complete(&self, contents: &str) -> Result<String, VoiceError> {
        let reply = self.backend.generate(contents).await?;
        if reply.trim().is_empty() {
            return Err(VoiceError::Generation(
                "backend returned an empty reply".to_string(),
            ));
        }
        Ok(reply)
    }
}

/// Gemini `generateContent` REST client.
#[derive(Clone)]
pub struct GeminiBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiBackend {
    pub fn new(config: &LlmConfig) -> Result<Self, VoiceError> {
        if config.api_key.is_empty() {
            return Err(VoiceError::Config("Gemini API key is not set".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| VoiceError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn map_http_error(status: reqwest::StatusCode, body: &str) -> VoiceError {
        match status.as_u16() {
            401 | 403 => VoiceError::Generation(format!(
                "Gemini API rejected the credentials (HTTP {})",
                status
            )),
            429 => VoiceError::Generation("Gemini API rate limit exceeded".to_string()),
            _ => VoiceError::Generation(format!("HTTP {} from Gemini API: {}", status, body)),
        }
    }
}

/// Concatenates the text parts of the first candidate.
fn parse_response(body: &Value) -> Result<String, VoiceError> {
    let candidates = body["candidates"].as_array();
    let candidate = match candidates.and_then(|c| c.first()) {
        Some(candidate) => candidate,
        None => {
            let reason = body["promptFeedback"]["blockReason"]
                .as_str()
                .map(|r| format!("prompt blocked: {}", r))
                .unwrap_or_else(|| "response contained no candidates".to_string());
            return Err(VoiceError::Generation(reason));
        }
    };

    let parts = candidate["content"]["parts"].as_array().ok_or_else(|| {
        let finish = candidate["finishReason"].as_str().unwrap_or("unknown");
        VoiceError::Generation(format!(
            "candidate has no content parts (finish reason: {})",
            finish
        ))
    })?;

    Ok(parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect::<String>())
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate(&self, contents: &str) -> Result<String, VoiceError> {
        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": contents }]
            }]
        });

        tracing::debug!(model = self.model.as_str(), "sending Gemini generation request");

        let response = self
            .client
            .post(self.endpoint_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                VoiceError::Generation(format!(
                    "request to Gemini API failed: {}",
                    e.without_url()
                ))
            })?;

        let status = response.status();
        let body_text = response.text().await.map_err(|e| {
            VoiceError::Generation(format!("failed to read response body: {}", e.without_url()))
        })?;

        if !status.is_success() {
            return Err(Self::map_http_error(status, &body_text));
        }

        let json: Value = serde_json::from_str(&body_text)
            .map_err(|e| VoiceError::Generation(format!("invalid JSON in response: {}", e)))?;

        parse_response(&json)
    }
}
