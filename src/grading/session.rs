// src/grading/session.rs

use std::collections::BTreeMap;

use serde::Serialize;

use super::answer_key::NormalizedKey;
use super::letter::{QuestionNumber, normalize_response};
use super::score::{GradeResult, grade};
use crate::error::GradingError;

/// Where an attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Running,
    Paused,
    Graded,
}

/// What a single [`TestSession::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The clock is not running.
    Ignored,
    /// One second elapsed; this many remain.
    Counting(u32),
    /// Time ran out on this tick and the attempt was graded.
    Expired,
}

/// A timed attempt at answering the current key.
///
/// The session keeps one answer slot per question of the key it was last
/// rebuilt for. It never reads the clock itself; something outside calls
/// [`TestSession::tick`] once per second while it runs.
#[derive(Debug, Clone)]
pub struct TestSession {
    state: SessionState,
    duration_secs: u32,
    remaining_secs: u32,
    answers: BTreeMap<QuestionNumber, String>,
    result: Option<GradeResult>,
}

impl TestSession {
    pub fn new(duration_secs: u32) -> Result<Self, GradingError> {
        validate_duration(duration_secs)?;
        Ok(Self {
            state: SessionState::Idle,
            duration_secs,
            remaining_secs: duration_secs,
            answers: BTreeMap::new(),
            result: None,
        })
    }

    /// Abandons any attempt and lays out blank answers for `key`.
    pub fn rebuild(&mut self, key: &NormalizedKey) {
        self.answers = key.questions().map(|q| (q, String::new())).collect();
        self.enter_idle();
    }

    pub fn start(&mut self, key: &NormalizedKey) -> Result<(), GradingError> {
        if key.is_empty() {
            return Err(GradingError::precondition(
                "Answer key is empty. Add questions before starting the test.",
            ));
        }

        match self.state {
            SessionState::Running => Ok(()),
            SessionState::Graded => Err(GradingError::precondition(
                "Test already graded. Reset it to start a new attempt.",
            )),
            SessionState::Idle | SessionState::Paused => {
                self.result = None;
                self.state = SessionState::Running;
                tracing::info!("Test started with {}s remaining", self.remaining_secs);
                Ok(())
            }
        }
    }

    pub fn pause(&mut self) {
        if self.state == SessionState::Running {
            self.state = SessionState::Paused;
            tracing::info!("Test paused with {}s remaining", self.remaining_secs);
        }
    }

    /// Advances the countdown by one second. Reaching zero grades the attempt.
    pub fn tick(&mut self, key: &NormalizedKey) -> TickOutcome {
        if self.state != SessionState::Running {
            return TickOutcome::Ignored;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            tracing::debug!("{}s remaining", self.remaining_secs);
            return TickOutcome::Counting(self.remaining_secs);
        }

        tracing::info!("Time is up, submitting automatically");
        self.submit(key);
        TickOutcome::Expired
    }

    /// Back to a fresh attempt over the same questions.
    pub fn reset(&mut self) {
        for answer in self.answers.values_mut() {
            answer.clear();
        }
        self.enter_idle();
        tracing::info!("Test reset");
    }

    pub fn set_answer(&mut self, question: QuestionNumber, answer: &str) -> Result<(), GradingError> {
        if self.state == SessionState::Graded {
            return Err(GradingError::precondition(
                "Test already graded. Reset it to change answers.",
            ));
        }
        let slot = self
            .answers
            .get_mut(&question)
            .ok_or(GradingError::UnknownQuestion(question))?;
        *slot = normalize_response(answer);
        Ok(())
    }

    /// Grades the current answers against `key` and stops the clock.
    ///
    /// Allowed in any state; grading again replaces the previous result.
    pub fn submit(&mut self, key: &NormalizedKey) -> &GradeResult {
        let result = grade(key, &self.answers);
        tracing::info!(
            "Test submitted: {}/{} correct",
            result.correct_count,
            result.total_questions
        );
        self.state = SessionState::Graded;
        self.result.insert(result)
    }

    /// Changes the length of future attempts and refills the clock.
    ///
    /// Rejected while an attempt is under way (running or paused).
    pub fn set_duration(&mut self, seconds: u32) -> Result<(), GradingError> {
        validate_duration(seconds)?;
        match self.state {
            SessionState::Running | SessionState::Paused => Err(GradingError::precondition(
                "Duration cannot change during an attempt. Reset the test first.",
            )),
            SessionState::Idle | SessionState::Graded => {
                self.duration_secs = seconds;
                self.remaining_secs = seconds;
                Ok(())
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn answers(&self) -> &BTreeMap<QuestionNumber, String> {
        &self.answers
    }

    pub fn result(&self) -> Option<&GradeResult> {
        self.result.as_ref()
    }

    fn enter_idle(&mut self) {
        self.state = SessionState::Idle;
        self.remaining_secs = self.duration_secs;
        self.result = None;
    }
}

fn validate_duration(seconds: u32) -> Result<(), GradingError> {
    if seconds == 0 {
        return Err(GradingError::precondition(
            "Duration must be at least one second",
        ));
    }
    Ok(())
}
