// src/handlers/session.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    grading::{SharedWorkspace, letter::QuestionNumber},
    models::{
        key::AnswerRequest,
        session::{DurationRequest, SessionSnapshot},
    },
};

pub async fn get_session(State(workspace): State<SharedWorkspace>) -> impl IntoResponse {
    let ws = workspace.lock().await;
    Json(SessionSnapshot::from(ws.session()))
}

/// Starts or resumes the countdown.
pub async fn start(State(workspace): State<SharedWorkspace>) -> Result<impl IntoResponse, AppError> {
    let mut ws = workspace.lock().await;
    ws.start()?;
    Ok(Json(SessionSnapshot::from(ws.session())))
}

pub async fn pause(State(workspace): State<SharedWorkspace>) -> impl IntoResponse {
    let mut ws = workspace.lock().await;
    ws.pause();
    Json(SessionSnapshot::from(ws.session()))
}

/// Grades the attempt now, whatever time is left.
pub async fn submit(State(workspace): State<SharedWorkspace>) -> impl IntoResponse {
    let mut ws = workspace.lock().await;
    ws.submit();
    Json(SessionSnapshot::from(ws.session()))
}

pub async fn reset(State(workspace): State<SharedWorkspace>) -> impl IntoResponse {
    let mut ws = workspace.lock().await;
    ws.reset();
    Json(SessionSnapshot::from(ws.session()))
}

pub async fn set_duration(
    State(workspace): State<SharedWorkspace>,
    Json(payload): Json<DurationRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut ws = workspace.lock().await;
    ws.set_duration(payload.seconds)?;
    Ok(Json(SessionSnapshot::from(ws.session())))
}

pub async fn set_answer(
    State(workspace): State<SharedWorkspace>,
    Path(question): Path<QuestionNumber>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut ws = workspace.lock().await;
    ws.set_answer(question, &payload.answer)?;
    Ok(Json(SessionSnapshot::from(ws.session())))
}
