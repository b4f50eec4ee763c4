// src/handlers/extraction.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::{
    error::AppError,
    extraction::KeySource,
    models::extraction::{UploadAnswerKeyRequest, UploadAnswerKeyResponse},
};

/// Forwards an answer-key image to the vision model.
///
/// * Expects `{imageData, imageMimeType}` with base64 image bytes.
/// * Returns `{answerKey}` exactly as the model produced it (after tolerant
///   parsing); the hosted workspace is not touched.
pub async fn upload_answer_key(
    State(key_source): State<Arc<dyn KeySource>>,
    Json(req): Json<UploadAnswerKeyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let image = req.decode()?;

    let answer_key = key_source
        .extract(&image, &req.image_mime_type)
        .await
        .map_err(|e| {
            tracing::error!("Error in proxy: {}", e);
            AppError::from(e)
        })?;

    tracing::info!("Extracted {} answer key entries", answer_key.len());

    Ok(Json(UploadAnswerKeyResponse { answer_key }))
}
