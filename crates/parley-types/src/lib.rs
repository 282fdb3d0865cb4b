//! Shared types for the Parley voice-conversation service.
//!
//! This crate holds the records that cross crate boundaries: the recognized
//! [`Transcript`], the [`Persona`] records owned by the character store, the
//! [`Stage`] used for failure attribution, and the terminal
//! [`PipelineResult`] of one pipeline invocation.
//!
//! It has no I/O and no async dependencies, so both the storage layer and
//! the voice pipeline can depend on it without pulling in each other.

use serde::{Deserialize, Serialize};
use std::fmt;

mod persona;
pub use persona::{CharacterStore, NewPersona, Persona, StoreError};

/// Recognized text plus the language the recognizer detected it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// The recognized text.
    pub text: String,
    /// Locale code reported by the recognition backend (e.g. `en-US`).
    pub language: String,
}

impl Transcript {
    pub fn new(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: language.into(),
        }
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Text: {}, Language: {}", self.text, self.language)
    }
}

/// A pipeline stage, the unit of failure attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Speech-to-text with language detection.
    Recognition,
    /// Fetching the requested persona from the character store.
    PersonaLookup,
    /// Reply text generation.
    Generation,
    /// Text-to-speech synthesis.
    Synthesis,
}

impl Stage {
    /// Returns the snake_case label used in logs and API responses.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recognition => "recognition",
            Self::PersonaLookup => "persona_lookup",
            Self::Generation => "generation",
            Self::Synthesis => "synthesis",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The terminal outcome of one pipeline invocation.
///
/// Exactly one of these is produced per invocation. A failure carries the
/// stage it originated in and the underlying cause; no partial audio is ever
/// attached to a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineResult {
    /// Synthesized reply audio.
    Success { audio: Vec<u8> },
    /// The invocation stopped at `stage`.
    Failure { stage: Stage, message: String },
}

impl PipelineResult {
    pub fn failure(stage: Stage, message: impl Into<String>) -> Self {
        Self::Failure {
            stage,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the failing stage, or `None` on success.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { stage, .. } => Some(*stage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_labels_match_serde_names() {
        for stage in [
            Stage::Recognition,
            Stage::PersonaLookup,
            Stage::Generation,
            Stage::Synthesis,
        ] {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage.as_str()));
        }
    }

    #[test]
    fn failure_reports_its_stage() {
        let result = PipelineResult::failure(Stage::PersonaLookup, "character not found: 7");
        assert!(!result.is_success());
        assert_eq!(result.failed_stage(), Some(Stage::PersonaLookup));

        let ok = PipelineResult::Success { audio: vec![1, 2] };
        assert!(ok.is_success());
        assert_eq!(ok.failed_stage(), None);
    }

    #[test]
    fn transcript_display() {
        let t = Transcript::new("hello", "en-US");
        assert_eq!(t.to_string(), "Text: hello, Language: en-US");
    }
}
