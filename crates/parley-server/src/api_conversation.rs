//! Audio upload handlers that run the conversation pipeline.
//!
//! Both routes accept a multipart form with an `audio` field and answer with
//! the synthesized reply as `audio/wav`, or a JSON error tagged with the
//! failing stage.

use crate::{api::ApiError, AppState};
use axum::{
    extract::{Extension, Multipart, Path},
    http::header,
    response::{IntoResponse, Response},
};
use parley_types::PipelineResult;
use std::sync::Arc;

/// Name of the multipart field carrying the recording.
const AUDIO_FIELD: &str = "audio";

/// Reads the `audio` field, skipping any other fields.
async fn read_audio(mut multipart: Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("multipart error: {}", e)))?
    {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {}", e)))?;

        if data.is_empty() {
            return Err(ApiError::BadRequest("audio upload is empty".to_string()));
        }
        return Ok(data.to_vec());
    }

    Err(ApiError::BadRequest("no audio file provided".to_string()))
}

fn into_response(result: PipelineResult) -> Result<Response, ApiError> {
    match result {
        PipelineResult::Success { audio } => {
            Ok(([(header::CONTENT_TYPE, "audio/wav")], audio).into_response())
        }
        PipelineResult::Failure { stage, message } => Err(ApiError::Pipeline { stage, message }),
    }
}

/// Handler for `POST /v1/upload`: a generic reply to the recording.
pub async fn upload_handler(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let audio = read_audio(multipart).await?;
    into_response(state.pipeline.run(&audio, None).await)
}

/// Handler for `POST /v1/character/{character_id}/upload`: an in-character
/// reply from the stored persona.
pub async fn character_upload_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(character_id): Path<i64>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let audio = read_audio(multipart).await?;
    into_response(state.pipeline.run(&audio, Some(character_id)).await)
}
