use parley_types::Stage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("speech recognition failed: {0}")]
    Recognition(String),

    #[error("persona lookup failed: {0}")]
    PersonaLookup(String),

    #[error("response generation failed: {0}")]
    Generation(String),

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl VoiceError {
    /// The pipeline stage this error belongs to. Configuration errors happen
    /// before any invocation and have none.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Recognition(_) => Some(Stage::Recognition),
            Self::PersonaLookup(_) => Some(Stage::PersonaLookup),
            Self::Generation(_) => Some(Stage::Generation),
            Self::Synthesis(_) => Some(Stage::Synthesis),
            Self::Config(_) => None,
        }
    }
}
