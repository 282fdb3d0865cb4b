//! Voice conversation pipeline for Parley.
//!
//! A caller's recorded speech goes through three conversions: speech-to-text
//! with language detection ([`SpeechRecognizer`]), reply generation, either
//! generic or in character ([`ResponseGenerator`]), and text-to-speech with a
//! voice chosen for the detected language ([`SpeechSynthesizer`]).
//! [`ConversationPipeline`] runs them in order and turns any stage error into
//! a stage-tagged [`parley_types::PipelineResult::Failure`].
//!
//! Each conversion depends on a backend trait ([`RecognitionBackend`],
//! [`GenerationBackend`], [`SynthesisBackend`]). The shipped implementations
//! talk to the Azure Speech and Gemini REST APIs; tests substitute fakes.

pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod stt;
pub mod tts;
pub mod voice_map;

pub use config::{LlmConfig, SpeechConfig};
pub use error::VoiceError;
pub use llm::{persona_prompt, GeminiBackend, GenerationBackend, GenerationRequest, ResponseGenerator};
pub use pipeline::ConversationPipeline;
pub use stt::{
    AzureRecognitionBackend, RecognitionBackend, SpeechRecognizer, MAX_RECOGNITION_INPUT_BYTES,
};
pub use tts::{
    AzureSynthesisBackend, CancellationReason, SpeechSynthesizer, SynthesisBackend,
    SynthesisOutcome, SynthesisRequest, MAX_SYNTHESIS_INPUT_BYTES,
};
pub use voice_map::{VoiceMap, DEFAULT_VOICE};
