use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::voice_map::DEFAULT_VOICE;

/// Locales offered to the recognizer for language identification when none
/// are configured.
pub const DEFAULT_CANDIDATE_LANGUAGES: &[&str] = &["en-US", "hi-IN", "kn-IN"];

/// Synthesis output: RIFF WAV, 24 kHz, 16-bit mono PCM.
pub const DEFAULT_OUTPUT_FORMAT: &str = "riff-24khz-16bit-mono-pcm";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-pro-exp-02-05";

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

fn default_candidate_languages() -> Vec<String> {
    DEFAULT_CANDIDATE_LANGUAGES
        .iter()
        .map(|l| l.to_string())
        .collect()
}

fn default_output_format() -> String {
    DEFAULT_OUTPUT_FORMAT.to_string()
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_speech_timeout_secs() -> u64 {
    60
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_gemini_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_llm_timeout_secs() -> u64 {
    120
}

/// Azure Speech settings shared by recognition and synthesis.
#[derive(Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default, skip_serializing)]
    pub key: String,
    #[serde(default)]
    pub region: String,
    /// Locales the recognizer may detect.
    #[serde(default = "default_candidate_languages")]
    pub candidate_languages: Vec<String>,
    /// Value of the `X-Microsoft-OutputFormat` header.
    #[serde(default = "default_output_format")]
    pub output_format: String,
    /// Voice used when the detected language has no entry.
    #[serde(default = "default_voice")]
    pub default_voice: String,
    /// Extra or replacement language → voice entries.
    #[serde(default)]
    pub voices: HashMap<String, String>,
    #[serde(default = "default_speech_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Overrides `https://{region}.api.cognitive.microsoft.com`.
    #[serde(default)]
    pub stt_endpoint: Option<String>,
    /// Overrides `https://{region}.tts.speech.microsoft.com`.
    #[serde(default)]
    pub tts_endpoint: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            region: String::new(),
            candidate_languages: default_candidate_languages(),
            output_format: default_output_format(),
            default_voice: default_voice(),
            voices: HashMap::new(),
            request_timeout_secs: default_speech_timeout_secs(),
            stt_endpoint: None,
            tts_endpoint: None,
        }
    }
}

impl fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("key", &"[REDACTED]")
            .field("region", &self.region)
            .field("candidate_languages", &self.candidate_languages)
            .field("output_format", &self.output_format)
            .field("default_voice", &self.default_voice)
            .field("voices", &self.voices)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("stt_endpoint", &self.stt_endpoint)
            .field("tts_endpoint", &self.tts_endpoint)
            .finish()
    }
}

impl SpeechConfig {
    pub fn new(key: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            region: region.into(),
            ..Self::default()
        }
    }

    /// Base URL of the speech-to-text REST API.
    pub fn stt_base_url(&self) -> String {
        match &self.stt_endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://{}.api.cognitive.microsoft.com", self.region),
        }
    }

    /// Base URL of the text-to-speech REST API.
    pub fn tts_base_url(&self) -> String {
        match &self.tts_endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://{}.tts.speech.microsoft.com", self.region),
        }
    }
}

/// Gemini text generation settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
            request_timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secrets() {
        let speech = SpeechConfig::new("speech-secret", "westeurope");
        let llm = LlmConfig::new("llm-secret");

        let rendered = format!("{:?} {:?}", speech, llm);
        assert!(!rendered.contains("speech-secret"));
        assert!(!rendered.contains("llm-secret"));
        assert!(rendered.contains("westeurope"));
    }

    #[test]
    fn base_urls_derive_from_region() {
        let speech = SpeechConfig::new("k", "eastus");
        assert_eq!(speech.stt_base_url(), "https://eastus.api.cognitive.microsoft.com");
        assert_eq!(speech.tts_base_url(), "https://eastus.tts.speech.microsoft.com");

        let overridden = SpeechConfig {
            stt_endpoint: Some("http://127.0.0.1:9000/".to_string()),
            ..speech
        };
        assert_eq!(overridden.stt_base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn empty_toml_section_uses_defaults() {
        let speech: SpeechConfig = toml::from_str("region = \"eastus\"").unwrap();
        assert_eq!(speech.candidate_languages, vec!["en-US", "hi-IN", "kn-IN"]);
        assert_eq!(speech.output_format, DEFAULT_OUTPUT_FORMAT);
        assert_eq!(speech.default_voice, DEFAULT_VOICE);

        let llm: LlmConfig = toml::from_str("").unwrap();
        assert_eq!(llm.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(llm.request_timeout_secs, 120);
    }
}
