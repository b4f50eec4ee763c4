// src/models/session.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::grading::letter::QuestionNumber;
use crate::grading::{GradeResult, SessionState, TestSession};

/// The test session as shown to the client.
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub duration_seconds: u32,
    pub remaining_seconds: u32,
    pub answers: BTreeMap<QuestionNumber, String>,
    pub result: Option<GradeResult>,
}

impl From<&TestSession> for SessionSnapshot {
    fn from(session: &TestSession) -> Self {
        Self {
            state: session.state(),
            duration_seconds: session.duration_secs(),
            remaining_seconds: session.remaining_secs(),
            answers: session.answers().clone(),
            result: session.result().cloned(),
        }
    }
}

/// DTO for changing the test length.
#[derive(Debug, Deserialize, Validate)]
pub struct DurationRequest {
    #[validate(range(min = 1, message = "Duration must be at least one second."))]
    pub seconds: u32,
}
