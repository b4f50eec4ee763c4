// src/grading/raw_key.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::answer_key::QuestionRange;
use super::letter::{QuestionNumber, letter_from_value, parse_question_number};

/// An answer key exactly as an unreliable source produced it.
///
/// Keys are whatever strings the source used and values may be anything JSON
/// can hold. Nothing here is trusted until [`RawKey::numeric_entries`] has
/// filtered it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawKey(BTreeMap<String, Value>);

/// The trusted part of a [`RawKey`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumericEntries {
    /// Question number to canonical letter (or empty when the value was junk).
    pub answers: BTreeMap<QuestionNumber, String>,
    /// Entries dropped because their key is not a positive integer.
    pub discarded: usize,
}

impl NumericEntries {
    /// Smallest to largest surviving question, if any survived.
    pub fn span(&self) -> Option<QuestionRange> {
        let start = *self.answers.keys().next()?;
        let end = *self.answers.keys().next_back()?;
        Some(QuestionRange { start, end })
    }
}

impl RawKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question: impl Into<String>, answer: impl Into<Value>) {
        self.0.insert(question.into(), answer.into());
    }

    pub fn get(&self, question: &str) -> Option<&Value> {
        self.0.get(question)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keeps the entries whose key is a positive integer.
    ///
    /// Two spellings of one number ("7" and "07") collapse to a single entry:
    /// the canonical decimal spelling wins, otherwise the first in key order.
    pub fn numeric_entries(&self) -> NumericEntries {
        let mut entries = NumericEntries::default();

        for (key, value) in &self.0 {
            let Some(question) = parse_question_number(key) else {
                entries.discarded += 1;
                continue;
            };

            let canonical = key.trim() == question.to_string();
            if canonical || !entries.answers.contains_key(&question) {
                entries.answers.insert(question, letter_from_value(value));
            }
        }

        entries
    }
}

impl From<serde_json::Map<String, Value>> for RawKey {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self(map.into_iter().collect())
    }
}

impl FromIterator<(String, Value)> for RawKey {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
