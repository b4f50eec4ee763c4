// src/models/key.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::grading::answer_key::{AnswerKeyStore, IngestSummary, QuestionRange};
use crate::grading::letter::QuestionNumber;
use crate::grading::raw_key::RawKey;

/// The answer key as shown to the client.
#[derive(Debug, Serialize)]
pub struct KeySnapshot {
    pub range: Option<QuestionRange>,
    /// Question number to letter, ascending.
    pub answers: BTreeMap<QuestionNumber, String>,
    pub question_count: usize,
    pub revision: u64,
}

impl From<&AnswerKeyStore> for KeySnapshot {
    fn from(store: &AnswerKeyStore) -> Self {
        Self {
            range: store.range(),
            answers: store.key().as_map().clone(),
            question_count: store.key().len(),
            revision: store.revision(),
        }
    }
}

/// Snapshot after new source data was ingested.
///
/// `raw` echoes the source verbatim so a client can pick a different range
/// without another extraction.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub accepted: usize,
    pub discarded: usize,
    pub raw: RawKey,
    pub key: KeySnapshot,
}

impl IngestResponse {
    pub fn new(summary: IngestSummary, store: &AnswerKeyStore) -> Self {
        Self {
            accepted: summary.accepted,
            discarded: summary.discarded,
            raw: store.raw().clone(),
            key: KeySnapshot::from(store),
        }
    }
}

/// DTO for regenerating the key over a new range.
#[derive(Debug, Deserialize, Validate)]
pub struct SetRangeRequest {
    #[validate(range(min = 1, message = "Question numbers must be positive integers."))]
    pub start: QuestionNumber,
    #[validate(range(min = 1, message = "Question numbers must be positive integers."))]
    pub end: QuestionNumber,
}

/// DTO for adding a question to the key.
#[derive(Debug, Deserialize, Validate)]
pub struct AddQuestionRequest {
    #[validate(range(min = 1, message = "Invalid question number. Please enter a positive integer."))]
    pub question: QuestionNumber,
}

/// DTO for setting one answer, either in the key or in the attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct AnswerRequest {
    #[serde(default)]
    #[validate(length(max = 16))]
    pub answer: String,
}
