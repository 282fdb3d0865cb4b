//! The conversation pipeline: recognition, optional persona lookup,
//! generation and synthesis, run strictly in that order.

use crate::error::VoiceError;
use crate::llm::{GenerationRequest, ResponseGenerator};
use crate::stt::SpeechRecognizer;
use crate::tts::SpeechSynthesizer;
use parley_types::{CharacterStore, Persona, PipelineResult, Stage};
use std::future::Future;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Sequences the three conversions and isolates failures per stage.
///
/// All handles are injected at construction and shared read-only, so one
/// pipeline serves any number of concurrent invocations. Intermediate data
/// (audio, transcript, reply) is owned by the invocation's own stage tasks.
#[derive(Clone)]
pub struct ConversationPipeline {
    recognizer: SpeechRecognizer,
    generator: ResponseGenerator,
    synthesizer: SpeechSynthesizer,
    characters: Arc<dyn CharacterStore>,
}

impl ConversationPipeline {
    pub fn new(
        recognizer: SpeechRecognizer,
        generator: ResponseGenerator,
        synthesizer: SpeechSynthesizer,
        characters: Arc<dyn CharacterStore>,
    ) -> Self {
        Self {
            recognizer,
            generator,
            synthesizer,
            characters,
        }
    }

    /// Runs one invocation. Always returns a [`PipelineResult`]; backend and
    /// store errors are converted to a failure tagged with their stage, and
    /// no stage runs after a failure.
    pub async fn run(&self, audio: &[u8], persona_id: Option<i64>) -> PipelineResult {
        let invocation_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "conversation",
            %invocation_id,
            persona_id = ?persona_id,
            audio_bytes = audio.len()
        );
        self.run_stages(audio, persona_id).instrument(span).await
    }

    async fn run_stages(&self, audio: &[u8], persona_id: Option<i64>) -> PipelineResult {
        let recognizer = self.recognizer.clone();
        let input = audio.to_vec();
        let recognized =
            isolated(Stage::Recognition, async move { recognizer.recognize(&input).await }).await;
        let transcript = match recognized {
            Ok(transcript) => transcript,
            Err(e) => return failed(Stage::Recognition, e),
        };
        tracing::info!(
            language = %transcript.language,
            chars = transcript.text.chars().count(),
            "speech recognized"
        );

        let persona = match persona_id {
            Some(id) => match self.resolve_persona(id).await {
                Ok(persona) => {
                    tracing::info!(character = %persona.name, "persona resolved");
                    Some(persona)
                }
                Err(e) => return failed(Stage::PersonaLookup, e),
            },
            None => None,
        };

        // The reply is voiced in the language the input was recognized in.
        let language = transcript.language.clone();
        let request = GenerationRequest {
            transcript,
            persona,
        };
        let generator = self.generator.clone();
        let generated =
            isolated(Stage::Generation, async move { generator.respond(&request).await }).await;
        let reply = match generated {
            Ok(reply) => reply,
            Err(e) => return failed(Stage::Generation, e),
        };
        tracing::info!(chars = reply.chars().count(), "reply generated");

        let synthesizer = self.synthesizer.clone();
        let synthesized = isolated(Stage::Synthesis, async move {
            synthesizer.synthesize(&reply, &language).await
        })
        .await;
        let audio = match synthesized {
            Ok(audio) => audio,
            Err(e) => return failed(Stage::Synthesis, e),
        };
        tracing::info!(bytes = audio.len(), "reply synthesized");

        PipelineResult::Success { audio }
    }

    /// Fetches the persona on the blocking pool. Every invocation re-reads
    /// the store.
    async fn resolve_persona(&self, id: i64) -> Result<Persona, VoiceError> {
        let store = self.characters.clone();
        let found = tokio::task::spawn_blocking(move || store.get(id))
            .await
            .map_err(|e| VoiceError::PersonaLookup(format!("lookup task failed: {}", e)))?
            .map_err(|e| VoiceError::PersonaLookup(e.to_string()))?;

        found.ok_or_else(|| VoiceError::PersonaLookup(format!("character not found: {}", id)))
    }
}

/// Runs one stage on its own task so a panicking backend surfaces as a
/// failure of that stage instead of unwinding through `run`.
async fn isolated<T, F>(stage: Stage, stage_future: F) -> Result<T, VoiceError>
where
    F: Future<Output = Result<T, VoiceError>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(stage_future.in_current_span()).await {
        Ok(result) => result,
        Err(e) => Err(stage_error(stage, format!("stage task failed: {}", e))),
    }
}

fn stage_error(stage: Stage, message: String) -> VoiceError {
    match stage {
        Stage::Recognition => VoiceError::Recognition(message),
        Stage::PersonaLookup => VoiceError::PersonaLookup(message),
        Stage::Generation => VoiceError::Generation(message),
        Stage::Synthesis => VoiceError::Synthesis(message),
    }
}

fn failed(stage: Stage, error: VoiceError) -> PipelineResult {
    tracing::warn!(stage = %stage, error = %error, "conversation stage failed");
    PipelineResult::failure(stage, error.to_string())
}
