#![allow(dead_code)]

use async_trait::async_trait;
use parley_db::{create_pool, run_migrations, DbRuntimeSettings, SqliteCharacterStore};
use parley_server::{app, AppState};
use parley_types::{CharacterStore, Transcript};
use parley_voice::{
    ConversationPipeline, GenerationBackend, RecognitionBackend, ResponseGenerator,
    SpeechRecognizer, SpeechSynthesizer, SynthesisBackend, SynthesisOutcome, SynthesisRequest,
    VoiceError, VoiceMap,
};
use std::sync::{Arc, Mutex};

pub const BOUNDARY: &str = "parley-test-boundary";

/// Scripted backend behavior for one test.
#[derive(Clone)]
pub struct Script {
    pub transcript: Result<Transcript, String>,
    pub reply: String,
    pub outcome: SynthesisOutcome,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            transcript: Ok(Transcript::new("hello", "en-US")),
            reply: "hi there".to_string(),
            outcome: SynthesisOutcome::Completed {
                audio: b"RIFF-reply".to_vec(),
            },
        }
    }
}

/// What the fake backends were asked to do.
#[derive(Default)]
pub struct Calls {
    pub audio: Mutex<Vec<Vec<u8>>>,
    pub prompts: Mutex<Vec<String>>,
    pub voices: Mutex<Vec<String>>,
}

struct Fake {
    script: Script,
    calls: Arc<Calls>,
}

#[async_trait]
impl RecognitionBackend for Fake {
    async fn recognize(
        &self,
        audio: &[u8],
        _candidate_languages: &[String],
    ) -> Result<Transcript, VoiceError> {
        self.calls.audio.lock().unwrap().push(audio.to_vec());
        self.script
            .transcript
            .clone()
            .map_err(VoiceError::Recognition)
    }
}

#[async_trait]
impl GenerationBackend for Fake {
    async fn generate(&self, contents: &str) -> Result<String, VoiceError> {
        self.calls.prompts.lock().unwrap().push(contents.to_string());
        Ok(self.script.reply.clone())
    }
}

#[async_trait]
impl SynthesisBackend for Fake {
    async fn synthesize(
        &self,
        _request: &SynthesisRequest,
        voice: &str,
    ) -> Result<SynthesisOutcome, VoiceError> {
        self.calls.voices.lock().unwrap().push(voice.to_string());
        Ok(self.script.outcome.clone())
    }
}

pub struct TestApp {
    pub router: axum::Router,
    pub characters: Arc<dyn CharacterStore>,
    pub calls: Arc<Calls>,
    _dir: tempfile::TempDir,
}

/// Builds the router over a fresh on-disk database and scripted backends.
pub fn setup(script: Script) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("parley.db");
    let pool = create_pool(db_path.to_str().unwrap(), DbRuntimeSettings::default()).unwrap();
    run_migrations(&pool.get().unwrap()).unwrap();
    let characters: Arc<dyn CharacterStore> = Arc::new(SqliteCharacterStore::new(pool));

    let calls = Arc::new(Calls::default());
    let fake = Arc::new(Fake {
        script,
        calls: calls.clone(),
    });

    let pipeline = ConversationPipeline::new(
        SpeechRecognizer::new(fake.clone(), vec!["en-US".to_string(), "hi-IN".to_string()]),
        ResponseGenerator::new(fake.clone()),
        SpeechSynthesizer::new(fake, VoiceMap::default()),
        characters.clone(),
    );

    let router = app(AppState {
        pipeline: Arc::new(pipeline),
        characters: characters.clone(),
    });

    TestApp {
        router,
        characters,
        calls,
        _dir: dir,
    }
}

/// Encodes a multipart body with one file field.
pub fn multipart_body(field: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"speech.wav\"\r\n",
            field
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: audio/wav\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}
