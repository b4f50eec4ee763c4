// src/grading/letter.rs

//! Canonical forms for question numbers and answer letters.
//!
//! Question numbers always travel as integers inside the crate; string keys
//! from documents or the vision model are converted at the boundary.

use serde_json::Value;

/// A positive question number. Ordering is numeric.
pub type QuestionNumber = u32;

/// The letters an answer key may contain.
pub const ANSWER_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Parses an external question-number string.
///
/// Returns `None` for anything that is not a positive integer, so callers can
/// drop the entry silently.
pub fn parse_question_number(raw: &str) -> Option<QuestionNumber> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match trimmed.parse::<QuestionNumber>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}

/// Returns the uppercase letter if `raw` is exactly one A-D letter.
pub fn canonical_letter(raw: &str) -> Option<char> {
    let mut chars = raw.trim().chars();
    let first = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() || !ANSWER_LETTERS.contains(&first) {
        return None;
    }
    Some(first)
}

/// Reduces an untrusted raw value to a key entry: one A-D letter or empty.
pub fn letter_from_value(value: &Value) -> String {
    value
        .as_str()
        .and_then(canonical_letter)
        .map(String::from)
        .unwrap_or_default()
}

/// Normalizes free text typed by the test taker. No charset enforcement.
pub fn normalize_response(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_question_number() {
        assert_eq!(parse_question_number("101"), Some(101));
        assert_eq!(parse_question_number(" 7 "), Some(7));
        assert_eq!(parse_question_number("007"), Some(7));
        assert_eq!(parse_question_number("0"), None);
        assert_eq!(parse_question_number("-3"), None);
        assert_eq!(parse_question_number("+3"), None);
        assert_eq!(parse_question_number("12a"), None);
        assert_eq!(parse_question_number("1.5"), None);
        assert_eq!(parse_question_number(""), None);
        assert_eq!(parse_question_number("99999999999"), None);
    }

    #[test]
    fn test_canonical_letter() {
        assert_eq!(canonical_letter("b"), Some('B'));
        assert_eq!(canonical_letter(" D "), Some('D'));
        assert_eq!(canonical_letter("E"), None);
        assert_eq!(canonical_letter("AB"), None);
        assert_eq!(canonical_letter(""), None);
    }

    #[test]
    fn test_letter_from_garbage_values() {
        assert_eq!(letter_from_value(&json!("c")), "C");
        assert_eq!(letter_from_value(&json!("Z")), "");
        assert_eq!(letter_from_value(&json!(3)), "");
        assert_eq!(letter_from_value(&json!(null)), "");
        assert_eq!(letter_from_value(&json!(["A"])), "");
    }
}
