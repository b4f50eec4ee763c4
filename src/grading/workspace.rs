// src/grading/workspace.rs

use std::sync::Arc;

use tokio::sync::Mutex;

use super::answer_key::{AnswerKeyStore, IngestSummary, NormalizedKey};
use super::document::KeyDocument;
use super::letter::QuestionNumber;
use super::raw_key::RawKey;
use super::score::GradeResult;
use super::session::{SessionState, TestSession, TickOutcome};
use crate::error::GradingError;

/// The workspace as shared between request handlers and the ticker.
pub type SharedWorkspace = Arc<Mutex<Workspace>>;

/// The single active answer key together with the attempt built on it.
///
/// Every key operation goes through here so the session can be rebuilt as
/// soon as the store installs a new key.
#[derive(Debug)]
pub struct Workspace {
    store: AnswerKeyStore,
    session: TestSession,
    synced_revision: u64,
}

impl Workspace {
    pub fn new(duration_secs: u32) -> Result<Self, GradingError> {
        let store = AnswerKeyStore::new();
        let mut session = TestSession::new(duration_secs)?;
        session.rebuild(store.key());
        Ok(Self {
            synced_revision: store.revision(),
            store,
            session,
        })
    }

    pub fn shared(self) -> SharedWorkspace {
        Arc::new(Mutex::new(self))
    }

    pub fn store(&self) -> &AnswerKeyStore {
        &self.store
    }

    pub fn session(&self) -> &TestSession {
        &self.session
    }

    // ----- answer key -----

    pub fn ingest(&mut self, raw: RawKey) -> IngestSummary {
        let summary = self.store.ingest(raw);
        self.sync();
        summary
    }

    pub fn clear_key(&mut self) {
        self.store.clear();
        self.sync();
    }

    pub fn load_document(&mut self, text: &str) -> Result<IngestSummary, GradingError> {
        let summary = self.store.load_document(text)?;
        self.sync();
        Ok(summary)
    }

    pub fn export_document(&self) -> Result<KeyDocument, GradingError> {
        self.store.export_document()
    }

    pub fn set_range(
        &mut self,
        start: QuestionNumber,
        end: QuestionNumber,
    ) -> Result<&NormalizedKey, GradingError> {
        self.store.set_range(start, end)?;
        self.sync();
        Ok(self.store.key())
    }

    /// Edits the key in place. A graded attempt is re-graded against the edit.
    pub fn edit_answer(&mut self, question: QuestionNumber, letter: &str) -> Result<(), GradingError> {
        self.store.edit_answer(question, letter)?;
        if self.session.state() == SessionState::Graded {
            self.session.submit(self.store.key());
        }
        Ok(())
    }

    pub fn add_question(&mut self, question: QuestionNumber) -> Result<(), GradingError> {
        self.store.add_question(question)?;
        self.sync();
        Ok(())
    }

    pub fn remove_question(&mut self, question: QuestionNumber) -> Result<(), GradingError> {
        self.store.remove_question(question)?;
        self.sync();
        Ok(())
    }

    // ----- test session -----

    pub fn start(&mut self) -> Result<(), GradingError> {
        self.session.start(self.store.key())
    }

    pub fn pause(&mut self) {
        self.session.pause();
    }

    pub fn tick(&mut self) -> TickOutcome {
        self.session.tick(self.store.key())
    }

    pub fn submit(&mut self) -> &GradeResult {
        self.session.submit(self.store.key())
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn set_answer(&mut self, question: QuestionNumber, answer: &str) -> Result<(), GradingError> {
        self.session.set_answer(question, answer)
    }

    pub fn set_duration(&mut self, seconds: u32) -> Result<(), GradingError> {
        self.session.set_duration(seconds)
    }

    fn sync(&mut self) {
        if self.store.revision() != self.synced_revision {
            tracing::debug!("Answer key changed, abandoning current attempt");
            self.session.rebuild(self.store.key());
            self.synced_revision = self.store.revision();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(doc: &str) -> Workspace {
        let mut ws = Workspace::new(60).unwrap();
        ws.load_document(doc).unwrap();
        ws
    }

    #[test]
    fn test_answers_follow_key_domain() {
        let mut ws = loaded(r#"{"1": "A", "2": "B"}"#);
        ws.set_answer(2, "B").unwrap();

        ws.add_question(3).unwrap();
        assert_eq!(ws.session().answers().keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(ws.session().answers().values().all(String::is_empty));

        ws.remove_question(1).unwrap();
        assert_eq!(ws.session().answers().keys().copied().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_new_key_abandons_attempt() {
        let mut ws = loaded(r#"{"1": "A", "2": "B"}"#);
        ws.start().unwrap();
        ws.tick();
        ws.set_answer(1, "A").unwrap();

        ws.set_range(1, 4).unwrap();
        assert_eq!(ws.session().state(), SessionState::Idle);
        assert_eq!(ws.session().remaining_secs(), 60);
        assert_eq!(ws.session().answers().len(), 4);
        assert!(ws.session().answers().values().all(String::is_empty));
    }

    #[test]
    fn test_graded_result_dropped_on_new_key() {
        let mut ws = loaded(r#"{"1": "A"}"#);
        ws.submit();
        assert!(ws.session().result().is_some());

        ws.ingest(RawKey::from_iter([("7".to_string(), serde_json::json!("C"))]));
        assert!(ws.session().result().is_none());
        assert_eq!(ws.session().state(), SessionState::Idle);
    }

    #[test]
    fn test_key_edit_keeps_attempt() {
        let mut ws = loaded(r#"{"1": "A", "2": "B"}"#);
        ws.start().unwrap();
        ws.set_answer(1, "C").unwrap();

        ws.edit_answer(1, "C").unwrap();
        assert_eq!(ws.session().state(), SessionState::Running);
        assert_eq!(ws.submit().correct_count, 1);
    }

    #[test]
    fn test_key_edit_regrades_graded_attempt() {
        let mut ws = loaded(r#"{"1": "A", "2": "B"}"#);
        ws.set_answer(1, "C").unwrap();
        ws.set_answer(2, "B").unwrap();
        assert_eq!(ws.submit().correct_count, 1);

        ws.edit_answer(1, "C").unwrap();
        let result = ws.session().result().unwrap();
        assert_eq!(ws.session().state(), SessionState::Graded);
        assert_eq!(result.correct_count, 2);
        assert!(result.mistakes.is_empty());

        assert!(ws.edit_answer(1, "E").is_err());
        assert_eq!(ws.session().result().unwrap().correct_count, 2);
    }

    #[test]
    fn test_rejected_operations_leave_attempt_alone() {
        let mut ws = loaded(r#"{"1": "A", "2": "B"}"#);
        ws.start().unwrap();
        ws.set_answer(1, "A").unwrap();

        assert!(ws.set_range(3, 1).is_err());
        assert!(ws.load_document("[1, 2]").is_err());
        assert!(ws.remove_question(9).is_err());
        assert!(ws.add_question(2).is_err());

        assert_eq!(ws.session().state(), SessionState::Running);
        assert_eq!(ws.session().answers()[&1], "A");
    }

    #[test]
    fn test_reset_preserves_key() {
        let mut ws = loaded(r#"{"1": "A", "2": "B"}"#);
        ws.start().unwrap();
        ws.set_answer(1, "A").unwrap();
        ws.tick();
        let key_before = ws.store().key().clone();

        ws.reset();
        assert_eq!(ws.store().key(), &key_before);
        assert_eq!(ws.session().remaining_secs(), ws.session().duration_secs());
        assert!(ws.session().answers().values().all(String::is_empty));
    }

    #[test]
    fn test_clear_key_blocks_start() {
        let mut ws = loaded(r#"{"1": "A"}"#);
        ws.clear_key();
        assert!(ws.store().key().is_empty());
        assert!(ws.session().answers().is_empty());
        assert!(ws.start().is_err());
    }
}
