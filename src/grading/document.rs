// src/grading/document.rs

//! Answer keys as standalone JSON documents.
//!
//! A document is a flat object of question-number strings to letters, the
//! same shape the store exports.

use serde_json::Value;

use super::answer_key::{AnswerKeyStore, IngestSummary, NormalizedKey, QuestionRange};
use super::raw_key::RawKey;
use crate::error::GradingError;

/// A serialized answer key ready to be written somewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDocument {
    pub file_name: String,
    pub contents: String,
}

/// Parses and validates a document without touching any store.
pub fn parse_document(text: &str) -> Result<RawKey, GradingError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| GradingError::MalformedDocument(e.to_string()))?;

    let Value::Object(map) = value else {
        return Err(GradingError::MalformedDocument(
            "Invalid JSON structure. Expected an object.".to_string(),
        ));
    };

    let raw = RawKey::from(map);
    let Some(span) = raw.numeric_entries().span() else {
        return Err(GradingError::MalformedDocument(
            "No valid question numbers found in JSON.".to_string(),
        ));
    };
    span.check_len().map_err(|e| {
        GradingError::MalformedDocument(format!(
            "Questions {}-{} cannot be loaded. {}",
            span.start, span.end, e
        ))
    })?;

    Ok(raw)
}

/// File name that reflects the active range, e.g. `answer_key_101-140.json`.
pub fn document_file_name(range: Option<QuestionRange>) -> String {
    match range {
        Some(range) => format!("answer_key_{}-{}.json", range.start, range.end),
        None => "answer_key_na-na.json".to_string(),
    }
}

/// Pretty-printed JSON object in ascending question order.
pub fn render_document(key: &NormalizedKey) -> Result<String, GradingError> {
    // Integer map keys serialize as strings, in BTreeMap (numeric) order.
    serde_json::to_string_pretty(key.as_map())
        .map_err(|e| GradingError::precondition(format!("Failed to serialize answer key: {}", e)))
}

impl AnswerKeyStore {
    /// Loads a document as if it had come from the extractor: ingest, then
    /// the range spans the document's own keys.
    ///
    /// A rejected document leaves the store untouched.
    pub fn load_document(&mut self, text: &str) -> Result<IngestSummary, GradingError> {
        let raw = parse_document(text)?;
        Ok(self.ingest(raw))
    }

    pub fn export_document(&self) -> Result<KeyDocument, GradingError> {
        if self.key().is_empty() {
            return Err(GradingError::precondition(
                "No answer key to save. Process an image or load a key first.",
            ));
        }

        Ok(KeyDocument {
            file_name: document_file_name(self.range()),
            contents: render_document(self.key())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_document() {
        let mut store = AnswerKeyStore::new();
        let summary = store
            .load_document(r#"{"3": "c", "1": "A", "note": "ignored"}"#)
            .unwrap();

        assert_eq!(summary.range, Some(QuestionRange { start: 1, end: 3 }));
        assert_eq!(store.questions(), vec![1, 2, 3]);
        assert_eq!(store.key().get(2), Some(""));
        assert_eq!(store.key().get(3), Some("C"));
    }

    #[test]
    fn test_load_rejects_non_objects() {
        let mut store = AnswerKeyStore::new();
        store.load_document(r#"{"1": "A"}"#).unwrap();
        let revision = store.revision();

        for text in [r#"["A", "B"]"#, "42", "null", "not json", r#"{"a": "B"}"#, "{}"] {
            let err = store.load_document(text).unwrap_err();
            assert!(
                matches!(err, GradingError::MalformedDocument(_)),
                "{} should be rejected",
                text
            );
        }

        assert_eq!(store.revision(), revision);
        assert_eq!(store.questions(), vec![1]);
    }

    #[test]
    fn test_load_rejects_oversized_span() {
        let mut store = AnswerKeyStore::new();
        store.load_document(r#"{"1": "A"}"#).unwrap();
        let revision = store.revision();

        for text in [r#"{"1": "A", "20000": "B"}"#, r#"{"1": "A", "4000000000": "B"}"#] {
            let err = store.load_document(text).unwrap_err();
            assert!(
                matches!(err, GradingError::MalformedDocument(_)),
                "{} should be rejected",
                text
            );
        }

        assert_eq!(store.revision(), revision);
        assert_eq!(store.questions(), vec![1]);
    }

    #[test]
    fn test_export_orders_numerically() {
        let mut store = AnswerKeyStore::new();
        store.load_document(r#"{"9": "A", "10": "B", "11": "D"}"#).unwrap();

        let doc = store.export_document().unwrap();
        assert_eq!(doc.file_name, "answer_key_9-11.json");
        assert_eq!(
            doc.contents,
            "{\n  \"9\": \"A\",\n  \"10\": \"B\",\n  \"11\": \"D\"\n}"
        );
    }

    #[test]
    fn test_export_round_trips_through_load() {
        let mut store = AnswerKeyStore::new();
        store.load_document(r#"{"2": "B", "4": "D"}"#).unwrap();
        store.edit_answer(3, "c").unwrap();
        let doc = store.export_document().unwrap();

        let mut other = AnswerKeyStore::new();
        other.load_document(&doc.contents).unwrap();
        assert_eq!(other.key(), store.key());
    }

    #[test]
    fn test_export_empty_key_fails() {
        let store = AnswerKeyStore::new();
        assert!(matches!(
            store.export_document(),
            Err(GradingError::PreconditionViolation(_))
        ));
        assert_eq!(document_file_name(None), "answer_key_na-na.json");
    }
}
