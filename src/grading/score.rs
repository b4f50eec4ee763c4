// src/grading/score.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::answer_key::NormalizedKey;
use super::letter::{QuestionNumber, normalize_response};

/// One incorrect or unanswered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mistake {
    pub question: QuestionNumber,
    pub given: String,
    pub expected: String,
}

/// Result of grading one attempt against the key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeResult {
    pub correct_count: usize,
    pub total_questions: usize,
    pub score_percent: f64,
    /// In ascending question order.
    pub mistakes: Vec<Mistake>,
    pub graded_at: DateTime<Utc>,
}

/// Grades `answers` against every question of `key`.
///
/// Both sides are trimmed and uppercased before an exact comparison. A blank
/// answer never matches, even when the key slot is blank too.
pub fn grade(key: &NormalizedKey, answers: &BTreeMap<QuestionNumber, String>) -> GradeResult {
    let mut correct_count = 0;
    let mut mistakes = Vec::new();

    for (question, expected) in key.iter() {
        let given = answers
            .get(&question)
            .map(|a| normalize_response(a))
            .unwrap_or_default();
        let expected = normalize_response(expected);

        if !given.is_empty() && given == expected {
            correct_count += 1;
        } else {
            mistakes.push(Mistake {
                question,
                given,
                expected,
            });
        }
    }

    let total_questions = key.len();
    let score_percent = if total_questions == 0 {
        0.0
    } else {
        (correct_count as f64 / total_questions as f64) * 100.0
    };

    GradeResult {
        correct_count,
        total_questions,
        score_percent,
        mistakes,
        graded_at: Utc::now(),
    }
}
