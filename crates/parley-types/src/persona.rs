//! Persona records and the character store contract.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named character identity used to condition generated replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Store-assigned identifier.
    pub id: i64,
    /// Name the responder speaks as.
    pub name: String,
    /// Behavioral description, injected verbatim into the generation prompt.
    #[serde(rename = "prompt")]
    pub prompt_description: String,
    /// Profile image location (may be empty).
    #[serde(default)]
    pub profile_image_url: String,
}

/// Input for creating a persona. The id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPersona {
    pub name: String,
    #[serde(rename = "prompt")]
    pub prompt_description: String,
    #[serde(default)]
    pub profile_image_url: String,
}

/// Errors raised by a [`CharacterStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No connection to the underlying storage could be obtained.
    #[error("character store unavailable: {0}")]
    Unavailable(String),

    /// A query or write against the storage failed.
    #[error("character store query failed: {0}")]
    Query(String),
}

/// Read/write contract for persisted personas.
///
/// Implementations are synchronous; async callers run them on the blocking
/// pool. Reads must be safe to issue concurrently and a read must never
/// observe a partially written record.
pub trait CharacterStore: Send + Sync {
    /// Fetches a persona by id. `Ok(None)` means the id does not exist.
    fn get(&self, id: i64) -> Result<Option<Persona>, StoreError>;

    /// Returns every persona, ordered by id.
    fn get_all(&self) -> Result<Vec<Persona>, StoreError>;

    /// Inserts a persona and returns its newly assigned id.
    fn add(&self, persona: &NewPersona) -> Result<i64, StoreError>;
}
