// src/handlers/key.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    extraction::KeySource,
    grading::{SharedWorkspace, letter::QuestionNumber},
    models::{
        extraction::UploadAnswerKeyRequest,
        key::{AddQuestionRequest, AnswerRequest, IngestResponse, KeySnapshot, SetRangeRequest},
    },
};

/// Returns the current answer key.
pub async fn get_key(State(workspace): State<SharedWorkspace>) -> impl IntoResponse {
    let ws = workspace.lock().await;
    Json(KeySnapshot::from(ws.store()))
}

/// Extracts a key from an image and installs it.
///
/// If the model produces nothing usable the workspace falls back to an empty
/// key so the user can type one in, and the failure is still reported.
pub async fn extract_key(
    State(workspace): State<SharedWorkspace>,
    State(key_source): State<Arc<dyn KeySource>>,
    Json(req): Json<UploadAnswerKeyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let image = req.decode()?;

    // Model calls are slow; do not hold the lock across them.
    let extracted = key_source.extract(&image, &req.image_mime_type).await;

    let mut ws = workspace.lock().await;
    match extracted {
        Ok(raw) => {
            let summary = ws.ingest(raw);
            Ok(Json(IngestResponse::new(summary, ws.store())))
        }
        Err(e) => {
            tracing::warn!("Extraction failed, falling back to an empty key: {}", e);
            ws.clear_key();
            Err(e.into())
        }
    }
}

/// Loads a JSON answer-key document (the body itself).
pub async fn import_key(
    State(workspace): State<SharedWorkspace>,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    let mut ws = workspace.lock().await;
    let summary = ws.load_document(&body)?;
    Ok(Json(IngestResponse::new(summary, ws.store())))
}

/// Downloads the key as a pretty-printed document named after its range.
pub async fn export_key(
    State(workspace): State<SharedWorkspace>,
) -> Result<impl IntoResponse, AppError> {
    let doc = workspace.lock().await.export_document()?;

    let headers = [
        (header::CONTENT_TYPE, "application/json".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", doc.file_name),
        ),
    ];
    Ok((headers, doc.contents))
}

/// Regenerates the key over `start..=end` from the last ingested source.
pub async fn set_range(
    State(workspace): State<SharedWorkspace>,
    Json(payload): Json<SetRangeRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut ws = workspace.lock().await;
    ws.set_range(payload.start, payload.end)?;
    Ok(Json(KeySnapshot::from(ws.store())))
}

pub async fn add_question(
    State(workspace): State<SharedWorkspace>,
    Json(payload): Json<AddQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut ws = workspace.lock().await;
    ws.add_question(payload.question)?;
    Ok((StatusCode::CREATED, Json(KeySnapshot::from(ws.store()))))
}

pub async fn edit_answer(
    State(workspace): State<SharedWorkspace>,
    Path(question): Path<QuestionNumber>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut ws = workspace.lock().await;
    ws.edit_answer(question, &payload.answer)?;
    Ok(Json(KeySnapshot::from(ws.store())))
}

pub async fn remove_question(
    State(workspace): State<SharedWorkspace>,
    Path(question): Path<QuestionNumber>,
) -> Result<impl IntoResponse, AppError> {
    let mut ws = workspace.lock().await;
    ws.remove_question(question)?;
    Ok(Json(KeySnapshot::from(ws.store())))
}
