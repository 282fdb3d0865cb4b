//! Parley server library logic.

pub mod api;
pub mod api_characters;
pub mod api_conversation;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use config::Config;
use parley_types::CharacterStore;
use parley_voice::{
    AzureRecognitionBackend, AzureSynthesisBackend, ConversationPipeline, GeminiBackend,
    ResponseGenerator, SpeechRecognizer, SpeechSynthesizer, VoiceError, VoiceMap,
    MAX_RECOGNITION_INPUT_BYTES,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Default request body limit for JSON routes.
pub const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Body limit for audio upload routes: the largest accepted recording plus
/// room for the multipart envelope.
pub const MAX_UPLOAD_BODY_BYTES: usize = MAX_RECOGNITION_INPUT_BYTES + 64 * 1024;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The conversation pipeline, shared by every upload request.
    pub pipeline: Arc<ConversationPipeline>,
    /// Persona storage, also read by the pipeline for persona lookups.
    pub characters: Arc<dyn CharacterStore>,
}

/// Builds the production pipeline from configuration.
///
/// # Errors
///
/// Returns `VoiceError::Config` if a backend is missing credentials or its
/// HTTP client cannot be built.
pub fn build_pipeline(
    config: &Config,
    characters: Arc<dyn CharacterStore>,
) -> Result<ConversationPipeline, VoiceError> {
    let recognizer = SpeechRecognizer::new(
        Arc::new(AzureRecognitionBackend::new(&config.speech)?),
        config.speech.candidate_languages.clone(),
    );
    let generator = ResponseGenerator::new(Arc::new(GeminiBackend::new(&config.llm)?));
    let voices = VoiceMap::default()
        .with_default_voice(config.speech.default_voice.clone())
        .with_voices(config.speech.voices.clone());
    let synthesizer = SpeechSynthesizer::new(
        Arc::new(AzureSynthesisBackend::new(&config.speech)?),
        voices,
    );

    Ok(ConversationPipeline::new(
        recognizer,
        generator,
        synthesizer,
        characters,
    ))
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let uploads = Router::new()
        .route("/v1/upload", post(api_conversation::upload_handler))
        .route(
            "/v1/character/{character_id}/upload",
            post(api_conversation::character_upload_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES));

    Router::new()
        .route("/health", get(health))
        .route(
            "/v1/characters",
            get(api_characters::list_characters_handler)
                .post(api_characters::add_character_handler),
        )
        .route(
            "/v1/characters/{character_id}",
            get(api_characters::get_character_handler),
        )
        .merge(uploads)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
