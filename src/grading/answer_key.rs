// src/grading/answer_key.rs

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::letter::{QuestionNumber, canonical_letter};
use super::raw_key::RawKey;
use crate::error::GradingError;

/// Upper bound on the number of slots a single range may create.
pub const MAX_RANGE_LEN: usize = 10_000;

/// Inclusive range of question numbers, `1 <= start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRange {
    pub start: QuestionNumber,
    pub end: QuestionNumber,
}

impl QuestionRange {
    pub fn new(start: QuestionNumber, end: QuestionNumber) -> Result<Self, GradingError> {
        if start == 0 || end == 0 {
            return Err(GradingError::precondition(
                "Question numbers must be positive integers",
            ));
        }
        if start > end {
            return Err(GradingError::precondition(format!(
                "Start question {} is after end question {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    pub fn iter(&self) -> RangeInclusive<QuestionNumber> {
        self.start..=self.end
    }

    /// Rejects ranges that would create more than [`MAX_RANGE_LEN`] slots.
    pub fn check_len(&self) -> Result<(), GradingError> {
        if self.len() > MAX_RANGE_LEN {
            return Err(GradingError::precondition(format!(
                "A range may hold at most {} questions",
                MAX_RANGE_LEN
            )));
        }
        Ok(())
    }
}

/// The trusted answer key: question number to letter, empty when unknown.
///
/// Iteration is always in ascending numeric order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NormalizedKey(BTreeMap<QuestionNumber, String>);

impl NormalizedKey {
    /// Fills every slot of `range` from `source`, defaulting to empty.
    fn for_range(source: &BTreeMap<QuestionNumber, String>, range: QuestionRange) -> Self {
        Self(
            range
                .iter()
                .map(|q| (q, source.get(&q).cloned().unwrap_or_default()))
                .collect(),
        )
    }

    pub fn get(&self, question: QuestionNumber) -> Option<&str> {
        self.0.get(&question).map(String::as_str)
    }

    pub fn contains(&self, question: QuestionNumber) -> bool {
        self.0.contains_key(&question)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn questions(&self) -> impl Iterator<Item = QuestionNumber> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionNumber, &str)> {
        self.0.iter().map(|(q, a)| (*q, a.as_str()))
    }

    /// Smallest and largest question in the key.
    pub fn bounds(&self) -> Option<QuestionRange> {
        let start = *self.0.keys().next()?;
        let end = *self.0.keys().next_back()?;
        Some(QuestionRange { start, end })
    }

    pub fn as_map(&self) -> &BTreeMap<QuestionNumber, String> {
        &self.0
    }
}

/// Outcome of [`AnswerKeyStore::ingest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub accepted: usize,
    pub discarded: usize,
    pub range: Option<QuestionRange>,
}

/// Owns the answer key and reconciles unreliable sources into it.
///
/// The raw key is kept verbatim so a new range can be applied without
/// asking the source again. Every time a new key is installed `revision`
/// moves, which is how the test session learns that its attempt is stale.
#[derive(Debug, Default)]
pub struct AnswerKeyStore {
    raw: RawKey,
    source: BTreeMap<QuestionNumber, String>,
    key: NormalizedKey,
    range: Option<QuestionRange>,
    revision: u64,
}

impl AnswerKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the source data and installs a key over its inferred range.
    ///
    /// Entries whose key is not a positive integer are dropped without error.
    /// When nothing survives, or the surviving numbers span more than
    /// [`MAX_RANGE_LEN`] questions, the key is empty and the range is `None`
    /// so a range can be entered by hand.
    pub fn ingest(&mut self, raw: RawKey) -> IngestSummary {
        let entries = raw.numeric_entries();
        let range = entries.span().filter(|range| match range.check_len() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Not inferring range {}-{}: {}", range.start, range.end, e);
                false
            }
        });

        if entries.discarded > 0 {
            tracing::warn!(
                "Discarded {} answer key entries without a positive question number",
                entries.discarded
            );
        }

        self.raw = raw;
        self.source = entries.answers;
        self.key = match range {
            Some(range) => NormalizedKey::for_range(&self.source, range),
            None => NormalizedKey::default(),
        };
        self.range = range;
        self.revision += 1;

        tracing::info!(
            "Ingested answer key: {} accepted, {} discarded, range {:?}",
            self.source.len(),
            entries.discarded,
            range
        );

        IngestSummary {
            accepted: self.source.len(),
            discarded: entries.discarded,
            range,
        }
    }

    /// Drops everything, leaving an empty key open for manual editing.
    pub fn clear(&mut self) {
        self.ingest(RawKey::new());
    }

    /// Regenerates the key so it covers exactly `start..=end`.
    ///
    /// A pure function of the stored raw key and the arguments: manual edits
    /// made since the last regeneration are discarded.
    pub fn set_range(
        &mut self,
        start: QuestionNumber,
        end: QuestionNumber,
    ) -> Result<&NormalizedKey, GradingError> {
        let range = QuestionRange::new(start, end)?;
        range.check_len()?;

        self.key = NormalizedKey::for_range(&self.source, range);
        self.range = Some(range);
        self.revision += 1;
        tracing::info!("Answer key range set to {}-{}", start, end);

        Ok(&self.key)
    }

    /// Sets the expected answer for an existing question.
    ///
    /// Blank input clears the slot. Anything other than a single A-D letter
    /// is rejected and the key is left as it was.
    pub fn edit_answer(&mut self, question: QuestionNumber, letter: &str) -> Result<(), GradingError> {
        if !self.key.contains(question) {
            return Err(GradingError::UnknownQuestion(question));
        }

        let value = if letter.trim().is_empty() {
            String::new()
        } else {
            canonical_letter(letter).map(String::from).ok_or_else(|| {
                GradingError::precondition(format!(
                    "Answer for question {} must be one of A, B, C or D",
                    question
                ))
            })?
        };

        tracing::debug!("Question {} answer set to {:?}", question, value);
        self.key.0.insert(question, value);
        Ok(())
    }

    /// Adds an unused question with an empty answer, widening the range if needed.
    pub fn add_question(&mut self, question: QuestionNumber) -> Result<(), GradingError> {
        if question == 0 {
            return Err(GradingError::precondition(
                "Question numbers must be positive integers",
            ));
        }
        if self.key.contains(question) {
            return Err(GradingError::precondition(format!(
                "Question {} already exists",
                question
            )));
        }

        self.key.0.insert(question, String::new());
        self.range = self.key.bounds();
        self.revision += 1;
        tracing::debug!("Added question {}, range now {:?}", question, self.range);
        Ok(())
    }

    /// Removes a question; the range shrinks to the remaining questions.
    pub fn remove_question(&mut self, question: QuestionNumber) -> Result<(), GradingError> {
        if self.key.0.remove(&question).is_none() {
            return Err(GradingError::UnknownQuestion(question));
        }

        self.range = self.key.bounds();
        self.revision += 1;
        tracing::debug!("Removed question {}, range now {:?}", question, self.range);
        Ok(())
    }

    /// The last ingested source, exactly as it arrived.
    pub fn raw(&self) -> &RawKey {
        &self.raw
    }

    pub fn key(&self) -> &NormalizedKey {
        &self.key
    }

    pub fn range(&self) -> Option<QuestionRange> {
        self.range
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn questions(&self) -> Vec<QuestionNumber> {
        self.key.questions().collect()
    }
}
